use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use eyre::{ensure, ContextCompat, Result};
use log::{debug, error, info};
use tap::TapFallible;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use uuid::Uuid;

use crate::domain::request::{GameState, JoinRoomResponse, PlayerState, RoomSummary, TopWinner};
use crate::domain::room::{Room, RoomStatus, MIN_PLAYERS};
use crate::domain::user::User;
use crate::error::Error;
use crate::repository::rooms::RoomRepository;
use crate::repository::users::UserRepository;

/// Round timings. Production values match the original game pacing; tests
/// inject millisecond values.
#[derive(Debug, Clone)]
pub struct GameTimings {
    /// Delay between `start` and the first draw.
    pub draw_start_delay: Duration,
    /// Delay between consecutive draws.
    pub draw_interval: Duration,
    /// Delay between the round ending and the room resetting to `waiting`.
    pub reset_delay: Duration,
}

impl Default for GameTimings {
    fn default() -> Self {
        GameTimings {
            draw_start_delay: Duration::from_secs(1),
            draw_interval: Duration::from_secs(3),
            reset_delay: Duration::from_secs(30),
        }
    }
}

enum DrawOutcome {
    Continue,
    RoundOver,
    /// The room was deleted (or left `playing`) under the loop's feet;
    /// stop silently.
    RoomGone,
}

#[derive(Clone)]
pub struct GameService {
    pub room_repository: RoomRepository,
    pub user_repository: UserRepository,
    pub timings: GameTimings,
    /// One draw task per playing room, aborted on room deletion. `start`
    /// is the only place a task is spawned, so at most one chain runs per
    /// room at a time.
    draw_tasks: Arc<DashMap<String, JoinHandle<()>>>,
}

impl GameService {
    pub fn new(
        room_repository: RoomRepository,
        user_repository: UserRepository,
        timings: GameTimings,
    ) -> Self {
        GameService {
            room_repository,
            user_repository,
            timings,
            draw_tasks: Arc::new(DashMap::new()),
        }
    }

    pub fn register(&self, user_id: &str, username: &str) -> User {
        self.user_repository.upsert_with_username(user_id, username)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User> {
        self.user_repository.get(user_id).wrap_err(Error::UserNotFound)
    }

    pub fn get_room(&self, room_id: &str) -> Result<Room> {
        self.room_repository.get(room_id).wrap_err(Error::RoomNotFound)
    }

    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.room_repository
            .get_all()
            .iter()
            .map(RoomSummary::from)
            .collect()
    }

    /// Seats the user in the room and debits the bet. The check and the
    /// debit happen under the room and user locks, so concurrent joins can
    /// neither overdraw a balance nor overflow the capacity.
    pub fn join_room(&self, user_id: &str, room_id: &str) -> Result<JoinRoomResponse> {
        let mut room = self
            .room_repository
            .get_mut_lock(room_id)
            .wrap_err(Error::RoomNotFound)?;
        let mut user = self
            .user_repository
            .get_mut_lock(user_id)
            .wrap_err(Error::UserNotFound)?;
        let card = room
            .join_player(&user.id, &user.username, user.balance)
            .tap_err(|e| error!("user {} could not join room {}: {e}", user.id, room.id))?;
        user.balance -= room.bet_amount;
        user.current_room = Some(room.id.clone());
        debug!("user {} joined room {}", user.id, room.id);
        Ok(JoinRoomResponse {
            card,
            balance: user.balance,
        })
    }

    /// Transitions `waiting -> playing` and launches the draw task.
    pub fn start_game(&self, room_id: &str) -> Result<Room> {
        {
            let mut room = self
                .room_repository
                .get_mut_lock(room_id)
                .wrap_err(Error::RoomNotFound)?;
            room.start()?;
            info!("room {} started with {} players", room.id, room.players.len());
        }
        self.spawn_draw_task(room_id.to_string());
        self.room_repository.get(room_id).wrap_err(Error::RoomNotFound)
    }

    pub fn game_state(&self, room_id: &str) -> Result<GameState> {
        let room = self
            .room_repository
            .get(room_id)
            .wrap_err(Error::RoomNotFound)?;
        Ok(GameState {
            drawn_numbers: room.drawn_numbers.clone(),
            players: room
                .players
                .iter()
                .map(|p| PlayerState {
                    username: p.username.clone(),
                    has_won: p.has_won,
                })
                .collect(),
            room,
        })
    }

    pub fn create_room(&self, name: String, bet_amount: i64, max_players: usize) -> Result<Room> {
        ensure!(bet_amount > 0, Error::InvalidAmount);
        ensure!(max_players >= MIN_PLAYERS, Error::RoomTooSmall);
        let id = format!("room_{}", Uuid::new_v4().simple());
        let room = Room::new(id, name, bet_amount, max_players);
        self.room_repository.upsert(room.clone());
        info!("created room {} ({})", room.id, room.name);
        Ok(room)
    }

    /// Deletes the room and aborts its draw task. The loop independently
    /// detects the missing room on its next wake, so deletion mid-round is
    /// safe either way.
    pub fn delete_room(&self, room_id: &str) -> Result<()> {
        self.room_repository
            .remove(room_id)
            .wrap_err(Error::RoomNotFound)?;
        if let Some((_, task)) = self.draw_tasks.remove(room_id) {
            task.abort();
        }
        info!("deleted room {room_id}");
        Ok(())
    }

    pub fn top_winners(&self, limit: usize) -> Vec<TopWinner> {
        self.user_repository
            .top_winners(limit)
            .into_iter()
            .map(|u| TopWinner {
                username: u.username,
                win_count: u.win_count,
                total_winnings: u.total_winnings,
            })
            .collect()
    }

    fn spawn_draw_task(&self, room_id: String) {
        let service = self.clone();
        let id = room_id.clone();
        let handle = tokio::spawn(async move { service.run_draw_loop(&id).await });
        if let Some(old) = self.draw_tasks.insert(room_id, handle) {
            old.abort();
        }
    }

    async fn run_draw_loop(&self, room_id: &str) {
        sleep(self.timings.draw_start_delay).await;
        loop {
            match self.draw_once(room_id) {
                Ok(DrawOutcome::Continue) => sleep(self.timings.draw_interval).await,
                Ok(DrawOutcome::RoundOver) => {
                    self.finish_round(room_id);
                    return;
                }
                Ok(DrawOutcome::RoomGone) => {
                    info!("room {room_id} is gone, stopping draws");
                    // The handle may still be registered if deletion raced
                    // the spawn; drop it so the entry cannot be orphaned.
                    self.draw_tasks.remove(room_id);
                    return;
                }
                Err(e) => {
                    // Unexpected fault: end the round instead of crashing
                    // or leaving the room stuck in `playing`.
                    error!("draw failed in room {room_id}: {e:?}");
                    self.finish_round(room_id);
                    return;
                }
            }
        }
    }

    /// One iteration of the drawing process. Synchronous: the room lock is
    /// released before the loop sleeps.
    fn draw_once(&self, room_id: &str) -> Result<DrawOutcome> {
        let mut room = match self.room_repository.get_mut_lock(room_id) {
            Some(room) => room,
            None => return Ok(DrawOutcome::RoomGone),
        };
        if room.status != RoomStatus::Playing {
            return Ok(DrawOutcome::RoomGone);
        }
        if room.round_over() {
            return Ok(DrawOutcome::RoundOver);
        }
        let number = room.draw_number().wrap_err("number pool exhausted")?;
        debug!("room {} drew {number}", room.id);
        if let Some(winner_id) = room.evaluate_winners() {
            let winnings = room.payout();
            self.user_repository.apply_winnings(&winner_id, winnings);
            info!("user {winner_id} won {winnings} in room {}", room.id);
        }
        if room.round_over() {
            Ok(DrawOutcome::RoundOver)
        } else {
            Ok(DrawOutcome::Continue)
        }
    }

    fn finish_round(&self, room_id: &str) {
        match self.room_repository.get_mut_lock(room_id) {
            Some(mut room) => room.finish(),
            None => return,
        }
        self.draw_tasks.remove(room_id);
        self.schedule_reset(room_id.to_string());
    }

    fn schedule_reset(&self, room_id: String) {
        let service = self.clone();
        tokio::spawn(async move {
            sleep(service.timings.reset_delay).await;
            service.reset_room(&room_id);
        });
    }

    /// The only path back to `waiting`: clears the round state and every
    /// seated user's room reference.
    fn reset_room(&self, room_id: &str) {
        match self.room_repository.get_mut_lock(room_id) {
            Some(mut room) => room.reset(),
            None => return,
        }
        self.user_repository.clear_room(room_id);
        info!("room {room_id} reset for the next round");
    }

    #[cfg(test)]
    fn draw_task_count(&self) -> usize {
        self.draw_tasks.len()
    }
}
