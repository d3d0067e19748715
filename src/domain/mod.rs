pub mod rules;
pub mod types;

pub use types::{
    Announcement, Booking, BookingStatus, ClaimData, Payment, PaymentStatus, PaymentTarget,
    Priority, Role, Room, RoomStatus, User, UtilityBill,
};
