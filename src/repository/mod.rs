pub mod rooms;
pub mod users;
pub mod withdrawals;
