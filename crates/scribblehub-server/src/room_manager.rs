use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use scribblehub_core::net::messages::ServerEvent;
use scribblehub_core::net::protocol::encode_server_event;
use scribblehub_core::player::UserId;
use scribblehub_core::room::{Room, RoomId};

/// Per-connection outbound channel. Unbounded: emits are small, infrequent
/// JSON frames, never a hot path worth backpressuring.
pub type OutboundSender = mpsc::UnboundedSender<String>;

/// A room plus the one piece of bookkeeping the registry needs that
/// doesn't belong on the transport-agnostic [`Room`] itself: the single
/// pending timer (round-end, inter-round, or game-end delay) superseding
/// the last.
struct RoomEntry {
    room: Room,
    pending_timer: Option<JoinHandle<()>>,
}

/// A read-only summary row for the REST introspection surface.
#[derive(Debug, Clone)]
pub struct RoomSummary {
    pub id: RoomId,
    pub name: String,
    pub user_count: usize,
    pub created_at: Instant,
}

/// Owns every live room, the connection → room mapping, and every
/// connection's outbound sender. This is the "Room Registry" of the
/// spec: the one cross-room shared structure, held by `AppState` behind a
/// single `RwLock` so a write-lock acquisition for the duration of one
/// room's mutation + broadcast is the per-room serialization boundary the
/// spec calls for.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: HashMap<RoomId, RoomEntry>,
    /// Every connection currently attached to the transport, independent
    /// of room membership — a connection that fails `join-room` still
    /// needs to receive the resulting `error` event.
    senders: HashMap<UserId, OutboundSender>,
    /// connection id -> room it currently belongs to, populated once a
    /// `create-room`/`join-room` succeeds.
    locations: HashMap<UserId, RoomId>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connection(&mut self, conn_id: UserId, sender: OutboundSender) {
        self.senders.insert(conn_id, sender);
    }

    /// Drops the connection's outbound channel. Does not touch room
    /// membership — callers handle the room side via [`Self::leave`]
    /// before or after this, depending on what the disconnect path needs.
    pub fn unregister_connection(&mut self, conn_id: UserId) {
        self.senders.remove(&conn_id);
    }

    pub fn create_room(&mut self, name: String) -> RoomId {
        let id = RoomId::new_v4();
        self.rooms.insert(
            id,
            RoomEntry {
                room: Room::new(id, name),
                pending_timer: None,
            },
        );
        id
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.get(&id).map(|e| &e.room)
    }

    pub fn room_mut(&mut self, id: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(&id).map(|e| &mut e.room)
    }

    pub fn location_of(&self, conn_id: UserId) -> Option<RoomId> {
        self.locations.get(&conn_id).copied()
    }

    /// Records that `conn_id` now belongs to `room_id`. Call once
    /// `Room::add_user` has succeeded.
    pub fn join(&mut self, room_id: RoomId, conn_id: UserId) {
        self.locations.insert(conn_id, room_id);
    }

    /// Forgets `conn_id`'s room membership, returning the room it was in.
    pub fn leave(&mut self, conn_id: UserId) -> Option<RoomId> {
        self.locations.remove(&conn_id)
    }

    /// Removes an emptied room entirely: the Room, its Drawing Log and
    /// Game (both plain fields on `Room`), and its pending timer.
    pub fn destroy_room(&mut self, room_id: RoomId) {
        if let Some(entry) = self.rooms.remove(&room_id)
            && let Some(timer) = entry.pending_timer
        {
            timer.abort();
        }
    }

    /// Replaces the pending timer for a room, aborting whatever was
    /// scheduled before. Every terminal transition calls this before
    /// firing a new one, per the cancellation discipline in the spec's
    /// Timer Service section — otherwise a delayed `round-ended` could
    /// overwrite a newly started round.
    pub fn set_timer(&mut self, room_id: RoomId, handle: JoinHandle<()>) {
        if let Some(entry) = self.rooms.get_mut(&room_id) {
            if let Some(old) = entry.pending_timer.replace(handle) {
                old.abort();
            }
        } else {
            handle.abort();
        }
    }

    pub fn clear_timer(&mut self, room_id: RoomId) {
        if let Some(entry) = self.rooms.get_mut(&room_id)
            && let Some(old) = entry.pending_timer.take()
        {
            old.abort();
        }
    }

    pub fn emit_to_one(&self, conn_id: UserId, event: &ServerEvent) {
        if let Some(sender) = self.senders.get(&conn_id) {
            Self::send(sender, event);
        }
    }

    pub fn broadcast_to_room(&self, room_id: RoomId, event: &ServerEvent, exclude: Option<UserId>) {
        let Some(entry) = self.rooms.get(&room_id) else {
            return;
        };
        for user in entry.room.users() {
            if Some(user.id) == exclude {
                continue;
            }
            if let Some(sender) = self.senders.get(&user.id) {
                Self::send(sender, event);
            }
        }
    }

    fn send(sender: &OutboundSender, event: &ServerEvent) {
        match encode_server_event(event) {
            Ok(text) => {
                let _ = sender.send(text);
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outbound event");
            },
        }
    }

    pub fn list_rooms(&self) -> Vec<RoomSummary> {
        self.rooms
            .values()
            .map(|e| RoomSummary {
                id: e.room.id,
                name: e.room.name.clone(),
                user_count: e.room.user_count(),
                created_at: e.room.created_at,
            })
            .collect()
    }

    pub fn room_exists(&self, id: RoomId) -> bool {
        self.rooms.contains_key(&id)
    }

    pub fn stats(&self) -> (usize, usize) {
        let active = self.rooms.len();
        let players = self.rooms.values().map(|e| e.room.user_count()).sum();
        (active, players)
    }

    /// Evicts rooms with no members for longer than `max_idle`. Purely a
    /// resource-hygiene backstop: a room still has members right up until
    /// the last-user-leaves rule already destroys it, so this only ever
    /// catches a room whose sole remaining connection hung without
    /// producing a clean disconnect signal.
    pub fn cleanup_idle_rooms(&mut self, max_idle: Duration) -> usize {
        let stale: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, e)| e.room.is_empty() && e.room.created_at.elapsed() > max_idle)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            self.destroy_room(*id);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribblehub_core::player::{PlayerColor, User};

    #[test]
    fn create_room_then_room_exists() {
        let mut reg = RoomRegistry::new();
        let id = reg.create_room("R".into());
        assert!(reg.room_exists(id));
        assert!(!reg.room_exists(RoomId::new_v4()));
    }

    #[tokio::test]
    async fn destroying_a_room_aborts_its_pending_timer() {
        let mut reg = RoomRegistry::new();
        let id = reg.create_room("R".into());
        let handle = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
        });
        reg.set_timer(id, handle);
        reg.destroy_room(id);
        assert!(!reg.room_exists(id));
    }

    #[test]
    fn emit_to_one_requires_no_room_membership() {
        let mut reg = RoomRegistry::new();
        let conn = UserId::new_v4();
        let (tx, mut rx) = mpsc::unbounded_channel();
        reg.register_connection(conn, tx);
        reg.emit_to_one(conn, &ServerEvent::Error { error: "nope".into() });
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn idle_cleanup_only_evicts_empty_rooms_past_the_timeout() {
        let mut reg = RoomRegistry::new();
        let empty_room = reg.create_room("empty".into());
        let occupied_room = reg.create_room("occupied".into());
        let user_id = UserId::new_v4();
        reg.room_mut(occupied_room).unwrap().add_user(User {
            id: user_id,
            username: "a".into(),
            color: PlayerColor::default(),
        });

        let removed = reg.cleanup_idle_rooms(Duration::from_secs(0));
        assert_eq!(removed, 1);
        assert!(!reg.room_exists(empty_room));
        assert!(reg.room_exists(occupied_room));
    }
}
