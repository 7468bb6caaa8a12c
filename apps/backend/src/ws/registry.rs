//! Live connection bookkeeping.
//!
//! Three indices are kept: session -> connections, (session, player) -> the
//! player's current connection, and connection -> (session, participant) so
//! `unregister` only needs the handle. Delivery is best effort: a send on a
//! closed channel reports "not delivered" and never errors.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::ws::protocol::{Participant, RoleFilter, ServerMsg};

pub type Outbound = Arc<ServerMsg>;

/// Sending half of one live connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    tx: mpsc::UnboundedSender<Outbound>,
}

impl ConnectionHandle {
    /// New handle plus the receiver the connection drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn send(&self, msg: Outbound) -> bool {
        self.tx.send(msg).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[derive(Debug, Clone)]
struct Registered {
    participant: Participant,
    handle: ConnectionHandle,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    sessions: DashMap<i64, DashMap<Uuid, Registered>>,
    players: DashMap<(i64, i64), ConnectionHandle>,
    connections: DashMap<Uuid, (i64, Participant)>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection. A player registering again (reconnect) takes
    /// over targeted sends from the previous connection.
    pub fn register(&self, session_id: i64, participant: Participant, handle: ConnectionHandle) {
        let conn_id = handle.id();
        {
            // Insert while holding the outer entry so a concurrent unregister
            // cannot drop the per-session map between lookup and insert.
            let conns = self.sessions.entry(session_id).or_default();
            conns.insert(
                conn_id,
                Registered {
                    participant,
                    handle: handle.clone(),
                },
            );
        }
        if let Some(player_id) = participant.player_id() {
            self.players.insert((session_id, player_id), handle);
        }
        self.connections.insert(conn_id, (session_id, participant));
        debug!(session_id, conn_id = %conn_id, ?participant, "connection registered");
    }

    /// Remove a connection from every index. Idempotent.
    pub fn unregister(&self, conn_id: Uuid) {
        let Some((_, (session_id, participant))) = self.connections.remove(&conn_id) else {
            return;
        };

        if let Some(player_id) = participant.player_id() {
            // Only drop the player route if it still points at this connection.
            self.players
                .remove_if(&(session_id, player_id), |_, h| h.id() == conn_id);
        }

        if let Some(conns) = self.sessions.get(&session_id) {
            conns.remove(&conn_id);
        }
        self.sessions
            .remove_if(&session_id, |_, conns| conns.is_empty());

        debug!(session_id, conn_id = %conn_id, "connection unregistered");
    }

    /// Targeted send. Operators have no individual address, so an operator
    /// target reaches every operator connection of the session.
    pub fn send_to(&self, session_id: i64, target: Participant, msg: ServerMsg) -> bool {
        match target {
            Participant::Player { player_id } => {
                let handle = self
                    .players
                    .get(&(session_id, player_id))
                    .map(|h| h.value().clone());
                let delivered = handle.is_some_and(|h| h.send(Arc::new(msg)));
                trace!(session_id, player_id, delivered, "targeted send");
                delivered
            }
            Participant::Operator => self.broadcast(session_id, RoleFilter::Operators, msg) > 0,
        }
    }

    /// Send to every connection of the session admitted by `filter`.
    /// Returns how many connections accepted the message.
    pub fn broadcast(&self, session_id: i64, filter: RoleFilter, msg: ServerMsg) -> usize {
        // Snapshot handles first; sends happen without holding map guards.
        let targets: Vec<ConnectionHandle> = match self.sessions.get(&session_id) {
            Some(conns) => conns
                .iter()
                .filter(|e| filter.admits(&e.value().participant))
                .map(|e| e.value().handle.clone())
                .collect(),
            None => return 0,
        };

        let kind = msg.kind();
        let msg = Arc::new(msg);
        let delivered = targets.iter().filter(|h| h.send(Arc::clone(&msg))).count();
        trace!(session_id, kind, targets = targets.len(), delivered, "broadcast");
        delivered
    }

    pub fn connection_count(&self, session_id: i64) -> usize {
        self.sessions.get(&session_id).map(|c| c.len()).unwrap_or(0)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_player_connected(&self, session_id: i64, player_id: i64) -> bool {
        self.players
            .get(&(session_id, player_id))
            .is_some_and(|h| !h.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: i64) -> Participant {
        Participant::Player { player_id: id }
    }

    #[test]
    fn unregister_removes_empty_session_and_is_idempotent() {
        let reg = ConnectionRegistry::new();
        let (h, _rx) = ConnectionHandle::channel();
        let id = h.id();
        reg.register(1, player(10), h);
        assert_eq!(reg.connection_count(1), 1);

        reg.unregister(id);
        reg.unregister(id);
        assert_eq!(reg.connection_count(1), 0);
        assert_eq!(reg.session_count(), 0);
        assert!(!reg.is_player_connected(1, 10));
    }

    #[test]
    fn broadcast_respects_role_filter() {
        let reg = ConnectionRegistry::new();
        let (p, mut prx) = ConnectionHandle::channel();
        let (o, mut orx) = ConnectionHandle::channel();
        reg.register(1, player(10), p);
        reg.register(1, Participant::Operator, o);

        assert_eq!(reg.broadcast(1, RoleFilter::Operators, ServerMsg::GameFinished), 1);
        assert!(prx.try_recv().is_err());
        assert_eq!(orx.try_recv().unwrap().kind(), "GAME_FINISHED");

        assert_eq!(reg.broadcast(1, RoleFilter::All, ServerMsg::Pong), 2);
        assert_eq!(reg.broadcast(2, RoleFilter::All, ServerMsg::Pong), 0);
    }

    #[test]
    fn closed_connections_are_skipped() {
        let reg = ConnectionRegistry::new();
        let (h, rx) = ConnectionHandle::channel();
        reg.register(1, player(10), h);
        drop(rx);

        assert_eq!(reg.broadcast(1, RoleFilter::All, ServerMsg::GameFinished), 0);
        assert!(!reg.send_to(1, player(10), ServerMsg::GameFinished));
    }

    #[test]
    fn reconnect_routes_to_new_connection() {
        let reg = ConnectionRegistry::new();
        let (old, _old_rx) = ConnectionHandle::channel();
        let old_id = old.id();
        reg.register(1, player(10), old);

        let (new, mut new_rx) = ConnectionHandle::channel();
        reg.register(1, player(10), new);
        reg.unregister(old_id);

        assert!(reg.send_to(1, player(10), ServerMsg::Pong));
        assert_eq!(new_rx.try_recv().unwrap().kind(), "pong");
    }

    #[test]
    fn send_to_unknown_player_is_not_delivered() {
        let reg = ConnectionRegistry::new();
        assert!(!reg.send_to(1, player(99), ServerMsg::Pong));
        assert!(!reg.send_to(1, Participant::Operator, ServerMsg::Pong));
    }
}
