use std::cmp::Reverse;
use std::sync::Arc;

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use itertools::Itertools;

use crate::domain::user::User;

/// In-memory user table keyed by the opaque chat-level user id.
#[derive(Clone, Default)]
pub struct UserRepository {
    users: Arc<DashMap<String, User>>,
}

impl UserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the user on first contact, refreshing the display name on
    /// later calls. Balance and win statistics are never reset.
    pub fn upsert_with_username(&self, id: &str, username: &str) -> User {
        let mut user = self
            .users
            .entry(id.to_string())
            .or_insert_with(|| User::new(id.to_string(), username.to_string()));
        user.username = username.to_string();
        user.clone()
    }

    pub fn get(&self, id: &str) -> Option<User> {
        self.users.get(id).map(|u| u.clone())
    }

    pub fn get_mut_lock(&self, id: &str) -> Option<RefMut<'_, String, User>> {
        self.users.get_mut(id)
    }

    /// Credits the round's winnings and bumps the win statistics.
    pub fn apply_winnings(&self, id: &str, amount: i64) {
        if let Some(mut user) = self.users.get_mut(id) {
            user.balance += amount;
            user.win_count += 1;
            user.total_winnings += amount;
        }
    }

    /// Clears `current_room` for every user seated in the given room.
    pub fn clear_room(&self, room_id: &str) {
        for mut user in self.users.iter_mut() {
            if user.current_room.as_deref() == Some(room_id) {
                user.current_room = None;
            }
        }
    }

    pub fn top_winners(&self, limit: usize) -> Vec<User> {
        self.users
            .iter()
            .filter(|u| u.win_count > 0)
            .map(|u| u.value().clone())
            .sorted_by_key(|u| Reverse(u.total_winnings))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_is_idempotent_on_id_and_refreshes_username() {
        let repository = UserRepository::new();
        let user = repository.upsert_with_username("1", "Alice");
        assert_eq!(user.balance, crate::domain::user::DEFAULT_BALANCE);

        repository.apply_winnings("1", 27);
        let user = repository.upsert_with_username("1", "Alicia");
        assert_eq!(user.username, "Alicia");
        assert_eq!(user.balance, crate::domain::user::DEFAULT_BALANCE + 27);
        assert_eq!(user.win_count, 1);
        assert_eq!(user.total_winnings, 27);
    }

    #[test]
    fn top_winners_sorted_by_total_winnings() {
        let repository = UserRepository::new();
        repository.upsert_with_username("1", "Alice");
        repository.upsert_with_username("2", "Bob");
        repository.upsert_with_username("3", "Carol");
        repository.apply_winnings("1", 10);
        repository.apply_winnings("2", 90);

        let winners = repository.top_winners(10);
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0].username, "Bob");
        assert_eq!(winners[1].username, "Alice");

        assert_eq!(repository.top_winners(1).len(), 1);
    }

    #[test]
    fn clear_room_only_touches_seated_users() {
        let repository = UserRepository::new();
        repository.upsert_with_username("1", "Alice");
        repository.upsert_with_username("2", "Bob");
        if let Some(mut user) = repository.get_mut_lock("1") {
            user.current_room = Some("room1".to_string());
        }
        if let Some(mut user) = repository.get_mut_lock("2") {
            user.current_room = Some("room2".to_string());
        }

        repository.clear_room("room1");
        assert_eq!(repository.get("1").and_then(|u| u.current_room), None);
        assert_eq!(
            repository.get("2").and_then(|u| u.current_room).as_deref(),
            Some("room2")
        );
    }
}
