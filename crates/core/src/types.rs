/// Database primary key (PostgreSQL `BIGSERIAL`).
pub type DbId = i64;

/// Point in time, always UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
