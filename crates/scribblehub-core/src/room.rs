use std::time::Instant;

use uuid::Uuid;

use crate::drawing::DrawingLog;
use crate::game::Game;
use crate::player::{User, UserId};

/// Server-generated, UUID-grade — never collides, even across deletions.
pub type RoomId = Uuid;

/// A room: membership, the shared Drawing Log, and the Game state machine.
/// Created on `create-room`, destroyed when its last user disconnects —
/// that destruction takes the Drawing Log and Game with it, since both
/// live as plain fields here rather than anything independently owned.
#[derive(Debug, Clone)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    users: Vec<User>,
    pub drawing_log: DrawingLog,
    pub game: Game,
    pub created_at: Instant,
}

impl Room {
    pub fn new(id: RoomId, name: String) -> Self {
        Self {
            id,
            name,
            users: Vec::new(),
            drawing_log: DrawingLog::new(),
            game: Game::new(),
            created_at: Instant::now(),
        }
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn is_member(&self, id: UserId) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    /// Idempotent: joining with an id already present leaves `users`
    /// unchanged, matching `join-room` for a connection already in the room.
    pub fn add_user(&mut self, user: User) {
        if !self.is_member(user.id) {
            self.users.push(user);
        }
    }

    pub fn remove_user(&mut self, id: UserId) -> Option<User> {
        let idx = self.users.iter().position(|u| u.id == id)?;
        Some(self.users.remove(idx))
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::test_support::SeededRng;

    fn user(id: UserId, name: &str) -> User {
        let mut rng = SeededRng::new(1);
        User::new(id, name.to_string(), &mut rng)
    }

    #[test]
    fn add_user_is_idempotent_by_id() {
        let mut room = Room::new(RoomId::new_v4(), "R".into());
        let id = UserId::new_v4();
        room.add_user(user(id, "a"));
        room.add_user(user(id, "a-dup"));
        assert_eq!(room.users().len(), 1);
        assert_eq!(room.users()[0].username, "a");
    }

    #[test]
    fn remove_user_empties_room() {
        let mut room = Room::new(RoomId::new_v4(), "R".into());
        let id = UserId::new_v4();
        room.add_user(user(id, "a"));
        assert!(!room.is_empty());
        room.remove_user(id);
        assert!(room.is_empty());
    }

    #[test]
    fn unique_room_ids_never_collide_across_many_creations() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            assert!(seen.insert(RoomId::new_v4()));
        }
    }
}
