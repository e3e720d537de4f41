pub mod account;
pub mod booking;
pub mod coupon;
pub mod event;
pub mod point_ledger;

pub use account::AccountRole;
pub use point_ledger::PointReason;
