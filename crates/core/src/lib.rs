//! Domain types and the swap-negotiation state machine.
//!
//! This crate is I/O-free: it defines the slot and swap-request status
//! domains, the valid transitions between them, and the validation helpers
//! shared by the DB and API layers. The server is the sole authority for
//! these rules; clients only display current state.

pub mod error;
pub mod slot;
pub mod swap;
pub mod types;
