//! Alert snapshot persistence
//!
//! The database is a best-effort durability layer: the in-memory feed is
//! authoritative, writes are opportunistic, and a failed write never rolls
//! back an in-memory mutation.

pub mod alerts;
pub mod init;

pub use init::init_database;
