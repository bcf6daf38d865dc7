#![forbid(unsafe_code)]

//! Session ownership and lifecycle arbitration.
//!
//! At most one selection session is live at a time. The manager owns
//! it, hands out access, and enforces the replacement rule: starting a
//! new session while one is active resolves (commits) the old one
//! first, so content is never silently dropped by a new drag.
//!
//! The manager is also the journal's target for the select domain:
//! history replay swaps whole session states in and out through
//! [`restore`](SessionManager::restore).

use tracing::debug;

use glyphgrid_core::{SurfaceId, SurfaceStore};

use crate::session::{CommitOutcome, Session, SessionEvent, SessionId, SessionSnapshot};

/// Notifications the manager queues as sessions come and go.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagerEvent {
    /// A new session became active.
    SessionStarted(SessionId),
    /// Starting a new session resolved this one by committing it.
    SessionReplaced(SessionId),
    /// The active session committed to a surface.
    SessionCommitted {
        /// The session that resolved.
        id: SessionId,
        /// Surface the content was written to.
        target: SurfaceId,
    },
    /// The active session cancelled.
    SessionCancelled(SessionId),
    /// History replay installed (or cleared) a session state.
    SessionRestored(Option<SessionId>),
    /// Forwarded from the active session.
    Session {
        /// The session the event came from.
        id: SessionId,
        /// The session's own notification.
        event: SessionEvent,
    },
}

/// Owner of the (at most one) active selection session.
#[derive(Debug, Default)]
pub struct SessionManager {
    active: Option<Session>,
    next_id: u64,
    events: Vec<ManagerEvent>,
}

impl SessionManager {
    /// Create a manager with no active session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active session, if any.
    #[must_use]
    pub fn active(&self) -> Option<&Session> {
        self.active.as_ref()
    }

    /// Mutable access to the active session, if any.
    pub fn active_mut(&mut self) -> Option<&mut Session> {
        self.active.as_mut()
    }

    /// Whether a session is currently active.
    #[must_use]
    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    /// Snapshot of the active session, if any.
    #[must_use]
    pub fn snapshot_active(&self) -> Option<SessionSnapshot> {
        self.active.as_ref().map(Session::snapshot)
    }

    /// Start a fresh session over `source`, resolving any active one.
    ///
    /// An active session with content is committed (to its own source);
    /// an empty one is cancelled.
    pub fn begin_session(&mut self, store: &mut dyn SurfaceStore, source: SurfaceId) -> SessionId {
        if let Some(mut old) = self.active.take() {
            let id = old.id();
            debug!(session = %id, "replacing active session");
            old.commit(store, None);
            self.absorb(&mut old);
            self.events.push(ManagerEvent::SessionReplaced(id));
        }
        let id = SessionId::new(self.next_id);
        self.next_id += 1;
        self.active = Some(Session::new(id, source, store));
        self.events.push(ManagerEvent::SessionStarted(id));
        id
    }

    /// Commit the active session, writing to `target` or its source.
    ///
    /// Returns `None` when no session is active.
    pub fn commit_active(
        &mut self,
        store: &mut dyn SurfaceStore,
        target: Option<&SurfaceId>,
    ) -> Option<CommitOutcome> {
        let mut session = self.active.take()?;
        let id = session.id();
        let outcome = session.commit(store, target);
        self.absorb(&mut session);
        match &outcome {
            CommitOutcome::Committed(target) => self.events.push(ManagerEvent::SessionCommitted {
                id,
                target: target.clone(),
            }),
            CommitOutcome::Cancelled => self.events.push(ManagerEvent::SessionCancelled(id)),
        }
        Some(outcome)
    }

    /// Cancel the active session, discarding its content.
    ///
    /// Returns whether a session was there to cancel.
    pub fn cancel_active(&mut self, store: &mut dyn SurfaceStore) -> bool {
        let Some(mut session) = self.active.take() else {
            return false;
        };
        let id = session.id();
        session.cancel(store);
        self.absorb(&mut session);
        self.events.push(ManagerEvent::SessionCancelled(id));
        true
    }

    /// Install a session state wholesale, for history replay.
    ///
    /// Any live session is torn down without a resolution event; the
    /// snapshot (if any) is materialized with a fresh overlay. The id
    /// counter is bumped past restored ids so later sessions never
    /// collide.
    pub fn restore(&mut self, snapshot: Option<SessionSnapshot>, store: &mut dyn SurfaceStore) {
        if let Some(mut old) = self.active.take() {
            old.discard(store);
            self.absorb(&mut old);
        }
        let restored_id = snapshot.as_ref().map(|s| s.id);
        if let Some(snapshot) = snapshot {
            self.next_id = self.next_id.max(snapshot.id.raw() + 1);
            self.active = Some(Session::from_snapshot(snapshot, store));
        }
        debug!(session = ?restored_id, "session state restored");
        self.events.push(ManagerEvent::SessionRestored(restored_id));
    }

    /// Drain queued events, forwarded session events included, in
    /// emission order.
    pub fn take_events(&mut self) -> Vec<ManagerEvent> {
        if let Some(session) = self.active.as_mut() {
            let id = session.id();
            for event in session.take_events() {
                self.events.push(ManagerEvent::Session { id, event });
            }
        }
        std::mem::take(&mut self.events)
    }

    /// Move a resolved session's remaining events into the queue.
    fn absorb(&mut self, session: &mut Session) {
        let id = session.id();
        for event in session.take_events() {
            self.events.push(ManagerEvent::Session { id, event });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::SelectedContent;
    use glyphgrid_core::testing::{MemoryStore, MemorySurface};

    fn setup() -> (SessionManager, MemoryStore, SurfaceId) {
        let mut store = MemoryStore::new();
        let layer = store.add_layer("layer", MemorySurface::new());
        (SessionManager::new(), store, layer)
    }

    #[test]
    fn test_begin_session_activates() {
        let (mut manager, mut store, layer) = setup();
        let id = manager.begin_session(&mut store, layer);
        assert!(manager.has_active());
        assert_eq!(manager.active().unwrap().id(), id);
        assert!(
            manager
                .take_events()
                .contains(&ManagerEvent::SessionStarted(id))
        );
    }

    #[test]
    fn test_begin_session_commits_previous() {
        let (mut manager, mut store, layer) = setup();
        let first = manager.begin_session(&mut store, layer.clone());
        manager
            .active_mut()
            .unwrap()
            .set_content(Some(SelectedContent::new(0, 0, "ab")));

        let second = manager.begin_session(&mut store, layer.clone());
        assert_ne!(first, second);
        // The replaced session's content landed on its source layer.
        assert_eq!(store.surface(&layer).unwrap().read_region(0, 0, 2, 1), "ab");
        assert!(
            manager
                .take_events()
                .contains(&ManagerEvent::SessionReplaced(first))
        );
    }

    #[test]
    fn test_commit_active_reports_target() {
        let (mut manager, mut store, layer) = setup();
        let id = manager.begin_session(&mut store, layer.clone());
        manager
            .active_mut()
            .unwrap()
            .set_content(Some(SelectedContent::new(0, 0, "z")));

        let outcome = manager.commit_active(&mut store, None).unwrap();
        assert_eq!(outcome, CommitOutcome::Committed(layer.clone()));
        assert!(!manager.has_active());
        assert!(manager.take_events().contains(&ManagerEvent::SessionCommitted {
            id,
            target: layer
        }));
    }

    #[test]
    fn test_commit_with_nothing_active() {
        let (mut manager, mut store, _) = setup();
        assert!(manager.commit_active(&mut store, None).is_none());
        assert!(!manager.cancel_active(&mut store));
    }

    #[test]
    fn test_restore_swaps_session_state() {
        let (mut manager, mut store, layer) = setup();
        manager.begin_session(&mut store, layer.clone());
        manager
            .active_mut()
            .unwrap()
            .set_content(Some(SelectedContent::new(1, 1, "Q")));
        let snapshot = manager.snapshot_active();

        manager.restore(None, &mut store);
        assert!(!manager.has_active());

        manager.restore(snapshot, &mut store);
        let session = manager.active().unwrap();
        assert_eq!(session.content().unwrap().data, "Q");
        let overlay = store.surface(session.overlay()).unwrap();
        assert_eq!(overlay.read_region(1, 1, 1, 1), "Q");
    }

    #[test]
    fn test_restore_bumps_id_counter() {
        let (mut manager, mut store, layer) = setup();
        let snapshot = SessionSnapshot {
            id: SessionId::new(41),
            source: layer.clone(),
            region: None,
            content: None,
        };
        manager.restore(Some(snapshot), &mut store);
        let next = manager.begin_session(&mut store, layer);
        assert!(next.raw() > 41);
    }
}
