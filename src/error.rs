use axum::http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("User not found")]
    UserNotFound,
    #[error("Room not found")]
    RoomNotFound,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Room is full")]
    RoomIsFull,
    #[error("Already joined this room")]
    AlreadyJoined,
    #[error("Game already started")]
    GameAlreadyStarted,
    #[error("Need at least 2 players")]
    NotEnoughPlayers,
    #[error("No pending withdrawal request found")]
    NoPendingRequest,
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Room must hold at least 2 players")]
    RoomTooSmall,
    #[error("Unauthorized command")]
    Unauthorized,
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::UserNotFound => StatusCode::NOT_FOUND,
            Error::RoomNotFound => StatusCode::NOT_FOUND,
            Error::InsufficientBalance => StatusCode::BAD_REQUEST,
            Error::RoomIsFull => StatusCode::BAD_REQUEST,
            Error::AlreadyJoined => StatusCode::BAD_REQUEST,
            Error::GameAlreadyStarted => StatusCode::BAD_REQUEST,
            Error::NotEnoughPlayers => StatusCode::BAD_REQUEST,
            Error::NoPendingRequest => StatusCode::BAD_REQUEST,
            Error::InvalidAmount => StatusCode::BAD_REQUEST,
            Error::RoomTooSmall => StatusCode::BAD_REQUEST,
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn into_response_tuple(self) -> (StatusCode, String) {
        (self.status_code(), self.to_string())
    }
}
