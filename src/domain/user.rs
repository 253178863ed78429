use serde::{Deserialize, Serialize};

pub const DEFAULT_BALANCE: i64 = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub balance: i64,
    pub current_room: Option<String>,
    pub win_count: u32,
    pub total_winnings: i64,
}

impl User {
    pub fn new(id: String, username: String) -> Self {
        User {
            id,
            username,
            balance: DEFAULT_BALANCE,
            current_room: None,
            win_count: 0,
            total_winnings: 0,
        }
    }
}
