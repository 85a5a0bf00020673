pub mod doctor;
pub mod enums;
pub mod payout;
pub mod user;

pub use doctor::*;
pub use enums::*;
pub use payout::*;
pub use user::*;
