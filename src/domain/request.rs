use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::room::{Room, RoomStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomRequest {
    pub user_id: String,
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub card: Card,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartGameRequest {
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WithdrawPayload {
    pub user_id: String,
    pub amount: i64,
    pub chat_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApproveWithdrawRequest {
    pub requested_by: String,
    pub user_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateRoomRequest {
    pub requested_by: String,
    pub name: String,
    pub bet_amount: i64,
    pub max_players: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteRoomRequest {
    pub requested_by: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WinnersQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GameState {
    pub drawn_numbers: Vec<u8>,
    pub players: Vec<PlayerState>,
    pub room: Room,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerState {
    pub username: String,
    pub has_won: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoomSummary {
    pub id: String,
    pub name: String,
    pub bet_amount: i64,
    pub max_players: usize,
    pub player_count: usize,
    pub status: RoomStatus,
}

impl From<&Room> for RoomSummary {
    fn from(room: &Room) -> Self {
        RoomSummary {
            id: room.id.clone(),
            name: room.name.clone(),
            bet_amount: room.bet_amount,
            max_players: room.max_players,
            player_count: room.players.len(),
            status: room.status,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TopWinner {
    pub username: String,
    pub win_count: u32,
    pub total_winnings: i64,
}
