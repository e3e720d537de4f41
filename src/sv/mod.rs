pub mod booking;
pub mod coupon;
pub mod event;
pub mod identity;
pub mod points;
#[cfg(test)]
pub mod test_utils;

pub use booking::Bookings;
pub use coupon::Coupons;
pub use event::Events;
pub use identity::Identity;
pub use points::Points;
