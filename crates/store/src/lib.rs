//! File-backed persistence for fines sessions.

pub mod config;
pub mod store;

pub use config::*;
pub use store::*;
