use std::sync::Arc;

use dashmap::mapref::one::RefMut;
use dashmap::DashMap;

use crate::domain::room::Room;

/// In-memory room table. Mutations on a single room are serialized through
/// `get_mut_lock`; the guard must never be held across an await point.
#[derive(Clone, Default)]
pub struct RoomRepository {
    rooms: Arc<DashMap<String, Room>>,
}

impl RoomRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn get(&self, id: &str) -> Option<Room> {
        self.rooms.get(id).map(|r| r.clone())
    }

    pub fn get_mut_lock(&self, id: &str) -> Option<RefMut<'_, String, Room>> {
        self.rooms.get_mut(id)
    }

    pub fn remove(&self, id: &str) -> Option<Room> {
        self.rooms.remove(id).map(|(_, room)| room)
    }

    pub fn get_all(&self) -> Vec<Room> {
        self.rooms.iter().map(|r| r.value().clone()).collect()
    }
}
