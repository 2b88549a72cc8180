//! Live room membership index.
//!
//! Maps each room to the set of connections currently joined to it, and
//! each connection to the set of rooms it has joined. Both maps are
//! guarded by a single lock so the two stay exact inverses: a connection
//! is in `rooms[r]` if and only if `r` is in `sessions[c]`.
//!
//! Rooms are keyed by the chatroom's persisted identifier, carried as an
//! opaque string -- the registry never checks the id against the store.
//! Entries exist only while the process runs; nothing here is persisted.

use std::collections::{HashMap, HashSet};

use chatty_shared::ConnectionId;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
struct Inner {
    /// room_id -> members. Created lazily on first join, pruned when empty.
    rooms: HashMap<String, HashSet<ConnectionId>>,
    /// connection_id -> joined rooms. The exact inverse of `rooms`.
    sessions: HashMap<ConnectionId, HashSet<String>>,
}

/// Concurrency-safe bidirectional membership index.
#[derive(Default)]
pub struct RoomRegistry {
    inner: RwLock<Inner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to a room. Idempotent: joining a room twice is a
    /// no-op. Returns whether membership changed.
    pub async fn join(&self, conn: ConnectionId, room: &str) -> bool {
        let mut inner = self.inner.write().await;

        let added = inner
            .rooms
            .entry(room.to_owned())
            .or_default()
            .insert(conn);

        if added {
            inner
                .sessions
                .entry(conn)
                .or_default()
                .insert(room.to_owned());

            info!(
                room = %room,
                conn = %conn,
                members = inner.rooms[room].len(),
                "Connection joined room"
            );
        }

        added
    }

    /// Remove a connection from a room. Idempotent: leaving a room the
    /// connection never joined is a no-op. Returns whether membership
    /// changed.
    pub async fn leave(&self, conn: ConnectionId, room: &str) -> bool {
        let mut inner = self.inner.write().await;
        let removed = Self::remove_membership(&mut inner, conn, room);

        if removed {
            info!(
                room = %room,
                conn = %conn,
                members = inner.rooms.get(room).map(HashSet::len).unwrap_or(0),
                "Connection left room"
            );
        }

        removed
    }

    /// Remove a connection from every room it joined and clear its session
    /// entry. Safe to call for connections that never joined anything, and
    /// safe to call twice. Returns the number of rooms left.
    pub async fn drop_connection(&self, conn: ConnectionId) -> usize {
        let mut inner = self.inner.write().await;

        let joined: Vec<String> = inner
            .sessions
            .get(&conn)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default();

        for room in &joined {
            Self::remove_membership(&mut inner, conn, room);
        }

        if !joined.is_empty() {
            info!(conn = %conn, rooms = joined.len(), "Dropped connection from all rooms");
        }

        joined.len()
    }

    /// Point-in-time snapshot of a room's members. The returned copy is
    /// what a broadcast iterates over, so joins and leaves during delivery
    /// cannot be observed mid-iteration. No ordering is guaranteed.
    pub async fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Whether a connection is currently a member of a room.
    pub async fn is_member(&self, conn: ConnectionId, room: &str) -> bool {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .is_some_and(|members| members.contains(&conn))
    }

    /// Snapshot of the rooms a connection has joined.
    pub async fn rooms_of(&self, conn: ConnectionId) -> Vec<String> {
        self.inner
            .read()
            .await
            .sessions
            .get(&conn)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one member.
    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }

    /// Number of members currently in a room.
    pub async fn member_count(&self, room: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room)
            .map(HashSet::len)
            .unwrap_or(0)
    }

    /// Remove one (connection, room) edge from both maps, pruning empty
    /// sets. Caller holds the write lock.
    fn remove_membership(inner: &mut Inner, conn: ConnectionId, room: &str) -> bool {
        let Some(members) = inner.rooms.get_mut(room) else {
            return false;
        };
        let removed = members.remove(&conn);
        if members.is_empty() {
            inner.rooms.remove(room);
        }

        if removed {
            if let Some(rooms) = inner.sessions.get_mut(&conn) {
                rooms.remove(room);
                if rooms.is_empty() {
                    inner.sessions.remove(&conn);
                }
            }
        }

        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Assert the bidirectional invariant for one (conn, room) edge.
    async fn assert_inverse(registry: &RoomRegistry, conn: ConnectionId, room: &str) {
        let in_room = registry.is_member(conn, room).await;
        let in_session = registry.rooms_of(conn).await.contains(&room.to_owned());
        assert_eq!(in_room, in_session);
    }

    #[tokio::test]
    async fn join_is_idempotent() {
        let registry = RoomRegistry::new();
        let conn = ConnectionId::new();

        assert!(registry.join(conn, "r1").await);
        assert!(!registry.join(conn, "r1").await);

        assert_eq!(registry.member_count("r1").await, 1);
        assert_eq!(registry.rooms_of(conn).await, vec!["r1".to_owned()]);
        assert_inverse(&registry, conn, "r1").await;
    }

    #[tokio::test]
    async fn leave_is_idempotent_and_prunes_empty_rooms() {
        let registry = RoomRegistry::new();
        let conn = ConnectionId::new();

        assert!(!registry.leave(conn, "r1").await);

        registry.join(conn, "r1").await;
        assert!(registry.leave(conn, "r1").await);
        assert!(!registry.leave(conn, "r1").await);

        assert_eq!(registry.room_count().await, 0);
        assert!(registry.rooms_of(conn).await.is_empty());
        assert_inverse(&registry, conn, "r1").await;
    }

    #[tokio::test]
    async fn drop_connection_clears_every_room() {
        let registry = RoomRegistry::new();
        let conn = ConnectionId::new();
        let other = ConnectionId::new();

        registry.join(conn, "r1").await;
        registry.join(conn, "r2").await;
        registry.join(other, "r1").await;

        assert_eq!(registry.drop_connection(conn).await, 2);

        assert!(!registry.members("r1").await.contains(&conn));
        assert!(registry.members("r1").await.contains(&other));
        assert_eq!(registry.member_count("r2").await, 0);
        assert!(registry.rooms_of(conn).await.is_empty());

        // Second drop and never-joined drops are no-ops.
        assert_eq!(registry.drop_connection(conn).await, 0);
        assert_eq!(registry.drop_connection(ConnectionId::new()).await, 0);
    }

    #[tokio::test]
    async fn members_is_a_snapshot() {
        let registry = RoomRegistry::new();
        let conn = ConnectionId::new();

        registry.join(conn, "r1").await;
        let snapshot = registry.members("r1").await;

        registry.leave(conn, "r1").await;

        // The copy taken before the leave is unaffected.
        assert_eq!(snapshot, vec![conn]);
        assert!(registry.members("r1").await.is_empty());
    }

    #[tokio::test]
    async fn membership_is_per_room() {
        let registry = RoomRegistry::new();
        let a = ConnectionId::new();
        let b = ConnectionId::new();
        let c = ConnectionId::new();

        registry.join(a, "r1").await;
        registry.join(b, "r1").await;
        registry.join(c, "r2").await;

        let mut members = registry.members("r1").await;
        members.sort_by_key(|conn| conn.0);
        let mut expected = vec![a, b];
        expected.sort_by_key(|conn| conn.0);

        assert_eq!(members, expected);
        assert_eq!(registry.members("r2").await, vec![c]);
        assert!(registry.members("r3").await.is_empty());
    }
}
