pub mod card;
pub mod request;
pub mod room;
pub mod user;
pub mod withdraw;
