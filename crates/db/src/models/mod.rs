pub mod session;
pub mod slot;
pub mod swap_request;
pub mod user;
