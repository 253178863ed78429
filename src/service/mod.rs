pub mod admin;
pub mod game;
pub mod notify;
pub mod wallet;
