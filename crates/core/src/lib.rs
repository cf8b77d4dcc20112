//! Core fines-session logic. Keep this crate free of IO and platform concerns.

pub mod config;
pub mod events;
pub mod ledger;
pub mod money;
pub mod rng;
pub mod session;
pub mod state;
pub mod store;

pub use config::*;
pub use events::*;
pub use ledger::*;
pub use money::*;
pub use rng::*;
pub use session::*;
pub use state::*;
pub use store::*;
