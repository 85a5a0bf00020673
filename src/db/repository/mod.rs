//! Repository layer — entity-scoped database operations.
//!
//! All functions take a borrowed `rusqlite::Connection`; the process-wide
//! handle lives in `crate::store`.

mod doctor;
mod payout;
mod user;

// Re-export all public items from sub-modules
pub use doctor::*;
pub use payout::*;
pub use user::*;
