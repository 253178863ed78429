use chrono::{DateTime, Utc};
use eyre::{ensure, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::error::Error;

pub const MIN_PLAYERS: usize = 2;
/// One draw per card cell; the round is self-bounding.
pub const MAX_DRAWS: usize = 25;
pub const NUMBER_POOL: u8 = 75;
/// The center cell plays as a free space, so 24 marks out of 25 win.
pub const WINNING_MARKS: usize = 24;

const RAKE_NUMERATOR: i64 = 9;
const RAKE_DENOMINATOR: i64 = 10;
const MAX_DRAW_ATTEMPTS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomPlayer {
    pub user_id: String,
    pub username: String,
    pub card: Card,
    pub marked_numbers: Vec<u8>,
    pub has_won: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub bet_amount: i64,
    pub max_players: usize,
    pub players: Vec<RoomPlayer>,
    pub status: RoomStatus,
    pub drawn_numbers: Vec<u8>,
    /// User id of the round's winner, if any.
    pub winner: Option<String>,
    pub game_start_time: Option<DateTime<Utc>>,
}

impl Room {
    pub fn new(id: String, name: String, bet_amount: i64, max_players: usize) -> Self {
        Room {
            id,
            name,
            bet_amount,
            max_players,
            players: Vec::new(),
            status: RoomStatus::Waiting,
            drawn_numbers: Vec::new(),
            winner: None,
            game_start_time: None,
        }
    }

    /// Checks the join preconditions and seats the user with a fresh card.
    /// The caller debits the bet from the user under the same lock scope.
    /// The room is untouched when any precondition fails.
    ///
    /// Joining is only valid while `waiting`: a seat taken during the
    /// post-round reset window would be wiped by the reset along with the
    /// bet.
    pub fn join_player(&mut self, user_id: &str, username: &str, balance: i64) -> Result<Card> {
        ensure!(self.status == RoomStatus::Waiting, Error::GameAlreadyStarted);
        ensure!(balance >= self.bet_amount, Error::InsufficientBalance);
        ensure!(self.players.len() < self.max_players, Error::RoomIsFull);
        ensure!(
            !self.players.iter().any(|p| p.user_id == user_id),
            Error::AlreadyJoined
        );
        let card = Card::generate();
        self.players.push(RoomPlayer {
            user_id: user_id.to_string(),
            username: username.to_string(),
            card: card.clone(),
            marked_numbers: Vec::new(),
            has_won: false,
        });
        Ok(card)
    }

    pub fn start(&mut self) -> Result<()> {
        ensure!(self.status == RoomStatus::Waiting, Error::GameAlreadyStarted);
        ensure!(self.players.len() >= MIN_PLAYERS, Error::NotEnoughPlayers);
        self.status = RoomStatus::Playing;
        self.game_start_time = Some(Utc::now());
        self.drawn_numbers.clear();
        Ok(())
    }

    pub fn round_over(&self) -> bool {
        self.drawn_numbers.len() >= MAX_DRAWS || self.winner.is_some()
    }

    pub fn draw_number(&mut self) -> Option<u8> {
        self.draw_number_with(&mut rand::thread_rng())
    }

    /// Draws one number from [1, 75] not drawn before this round.
    /// Returns `None` once the draw cap is reached.
    pub fn draw_number_with<R: Rng>(&mut self, rng: &mut R) -> Option<u8> {
        if self.drawn_numbers.len() >= MAX_DRAWS {
            return None;
        }
        for _ in 0..MAX_DRAW_ATTEMPTS {
            let n = rng.gen_range(1..=NUMBER_POOL);
            if !self.drawn_numbers.contains(&n) {
                self.drawn_numbers.push(n);
                return Some(n);
            }
        }
        // Ceiling hit: pick from the numbers still left in the pool. The
        // pool cannot be empty while fewer than MAX_DRAWS are out.
        let remaining: Vec<u8> = (1..=NUMBER_POOL)
            .filter(|n| !self.drawn_numbers.contains(n))
            .collect();
        let n = remaining[rng.gen_range(0..remaining.len())];
        self.drawn_numbers.push(n);
        Some(n)
    }

    /// Recomputes every active player's marks from the drawn numbers and
    /// returns the user id of a newly detected winner, if any.
    ///
    /// The first player in join order to reach the threshold wins the
    /// round exclusively; once `winner` is set no later player can win.
    pub fn evaluate_winners(&mut self) -> Option<String> {
        let drawn = self.drawn_numbers.clone();
        let mut new_winner = None;
        for player in self.players.iter_mut() {
            if player.has_won {
                continue;
            }
            player.marked_numbers = player.card.numbers().filter(|n| drawn.contains(n)).collect();
            if new_winner.is_none()
                && self.winner.is_none()
                && player.marked_numbers.len() >= WINNING_MARKS
            {
                player.has_won = true;
                new_winner = Some(player.user_id.clone());
            }
        }
        if let Some(winner_id) = &new_winner {
            self.winner = Some(winner_id.clone());
        }
        new_winner
    }

    pub fn total_pot(&self) -> i64 {
        self.players.len() as i64 * self.bet_amount
    }

    /// The winner's share: the pot minus the 10% house rake, rounded down.
    pub fn payout(&self) -> i64 {
        self.total_pot() * RAKE_NUMERATOR / RAKE_DENOMINATOR
    }

    pub fn finish(&mut self) {
        self.status = RoomStatus::Finished;
    }

    /// Returns the room to `waiting` for the next round. The caller clears
    /// the affected users' room references.
    pub fn reset(&mut self) {
        self.status = RoomStatus::Waiting;
        self.players.clear();
        self.drawn_numbers.clear();
        self.winner = None;
        self.game_start_time = None;
    }
}
