#![forbid(unsafe_code)]

//! A single selection/transform session.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► (region drag) ──► populate ──► move / rotate ──► commit
//!  │                                            │
//!  └────────────────────── cancel ◄─────────────┘
//! ```
//!
//! A session owns a marquee region in world units and, once populated,
//! a [`SelectedContent`] block living on a transient overlay surface.
//! The session never holds a surface reference: it keeps [`SurfaceId`]
//! handles and every read or write goes through a [`SurfaceStore`]
//! passed at call time.
//!
//! # Invariants
//!
//! 1. The overlay exists exactly as long as the session does; commit
//!    and cancel both tear it down.
//! 2. Commit writes the content at its cell footprint onto the target
//!    (falling back to the source), spaces included.
//! 3. If the target surface cannot be resolved at commit time, the
//!    session degrades to a cancel instead of losing the overlay
//!    silently with content half-written.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use glyphgrid_core::{Rect, SurfaceId, SurfaceStore};

use crate::content::SelectedContent;

/// Identifier of a selection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Create a session id from a raw counter value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw counter value.
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session-{}", self.0)
    }
}

/// Notifications a session queues as it changes.
///
/// Events accumulate in the session and are drained by the manager;
/// nothing is delivered re-entrantly while a mutation is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The marquee region changed (or was cleared).
    RegionChanged(Option<Rect>),
    /// The detached content changed (populated, moved, rotated, replaced).
    ContentChanged,
    /// The session resolved by writing its content to a surface.
    Committed {
        /// Surface the content was written to.
        target: SurfaceId,
        /// The content as written.
        content: SelectedContent,
    },
    /// The session resolved by discarding its content.
    Cancelled,
}

/// How a commit resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Content was written to this surface.
    Committed(SurfaceId),
    /// No content, or no resolvable target; the session cancelled.
    Cancelled,
}

/// Serializable state of a session, for journaling.
///
/// The overlay handle is deliberately absent: overlays are transient,
/// and a restore materializes a fresh one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Session identity, preserved across restores.
    pub id: SessionId,
    /// Surface the content was (or will be) lifted from.
    pub source: SurfaceId,
    /// Marquee region in world units, if any.
    pub region: Option<Rect>,
    /// Detached content, if populated.
    pub content: Option<SelectedContent>,
}

/// One live selection/transform session.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    source: SurfaceId,
    overlay: SurfaceId,
    region: Option<Rect>,
    content: Option<SelectedContent>,
    events: Vec<SessionEvent>,
}

impl Session {
    /// Start a fresh, empty session over `source`.
    ///
    /// Allocates the transient overlay immediately.
    pub fn new(id: SessionId, source: SurfaceId, store: &mut dyn SurfaceStore) -> Self {
        let overlay = store.add_overlay();
        debug!(session = %id, source = %source, overlay = %overlay, "session started");
        Self {
            id,
            source,
            overlay,
            region: None,
            content: None,
            events: Vec::new(),
        }
    }

    /// Rebuild a session from a snapshot, materializing a new overlay
    /// and redrawing any content onto it.
    pub fn from_snapshot(snapshot: SessionSnapshot, store: &mut dyn SurfaceStore) -> Self {
        let mut session = Self::new(snapshot.id, snapshot.source, store);
        session.region = snapshot.region;
        session.content = snapshot.content;
        if let Some(content) = &session.content
            && let Some(overlay) = store.surface_mut(&session.overlay)
        {
            overlay.set_to_region(content.region.x, content.region.y, &content.data);
        }
        session
    }

    /// Session identity.
    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    /// Surface the content was (or will be) lifted from.
    #[must_use]
    pub const fn source(&self) -> &SurfaceId {
        &self.source
    }

    /// Handle of the transient overlay the content is drawn on.
    #[must_use]
    pub const fn overlay(&self) -> &SurfaceId {
        &self.overlay
    }

    /// Current marquee region, if any.
    #[must_use]
    pub const fn region(&self) -> Option<Rect> {
        self.region
    }

    /// Detached content, if populated.
    #[must_use]
    pub const fn content(&self) -> Option<&SelectedContent> {
        self.content.as_ref()
    }

    /// Whether the session holds detached content.
    ///
    /// A session without content is empty: it never reaches the
    /// journal, and resolving it is always a plain cancel.
    #[must_use]
    pub const fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Replace the marquee region.
    ///
    /// Anchor-relative drags produce negative spans; the stored value
    /// is always normalized, so readers never see a negative extent.
    pub fn set_region(&mut self, region: Option<Rect>) {
        let region = region.map(|r| r.normalized());
        self.region = region;
        self.events.push(SessionEvent::RegionChanged(region));
    }

    /// Replace the detached content.
    ///
    /// Callers are responsible for keeping the overlay drawing in sync;
    /// the session only tracks the value.
    pub fn set_content(&mut self, content: Option<SelectedContent>) {
        self.content = content;
        self.events.push(SessionEvent::ContentChanged);
    }

    /// Capture the session's serializable state.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            source: self.source.clone(),
            region: self.region,
            content: self.content.clone(),
        }
    }

    /// Resolve the session by writing its content.
    ///
    /// Writes to `target` when given, otherwise back to the source.
    /// Without content, or when the target surface does not resolve,
    /// this degrades to [`cancel`](Self::cancel).
    pub fn commit(&mut self, store: &mut dyn SurfaceStore, target: Option<&SurfaceId>) -> CommitOutcome {
        let Some(content) = self.content.take() else {
            self.cancel(store);
            return CommitOutcome::Cancelled;
        };
        let target_id = target.unwrap_or(&self.source).clone();
        let Some(surface) = store.surface_mut(&target_id) else {
            warn!(session = %self.id, target = %target_id, "commit target missing, cancelling");
            self.cancel(store);
            return CommitOutcome::Cancelled;
        };
        surface.set_to_region(content.region.x, content.region.y, &content.data);
        store.remove_overlay(&self.overlay);
        self.region = None;
        debug!(session = %self.id, target = %target_id, "session committed");
        self.events.push(SessionEvent::Committed {
            target: target_id.clone(),
            content,
        });
        CommitOutcome::Committed(target_id)
    }

    /// Resolve the session by discarding its content.
    pub fn cancel(&mut self, store: &mut dyn SurfaceStore) {
        store.remove_overlay(&self.overlay);
        self.region = None;
        self.content = None;
        debug!(session = %self.id, "session cancelled");
        self.events.push(SessionEvent::Cancelled);
    }

    /// Tear the session down without emitting a resolution event.
    ///
    /// Used when history replay swaps session states wholesale; the
    /// replay driver reports its own events.
    pub fn discard(&mut self, store: &mut dyn SurfaceStore) {
        store.remove_overlay(&self.overlay);
        self.region = None;
        self.content = None;
    }

    /// Drain queued events in emission order.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphgrid_core::testing::{MemoryStore, MemorySurface};

    fn store_with_layer() -> (MemoryStore, SurfaceId) {
        let mut store = MemoryStore::new();
        let layer = store.add_layer("layer", MemorySurface::new());
        (store, layer)
    }

    #[test]
    fn test_new_session_allocates_overlay() {
        let (mut store, layer) = store_with_layer();
        let session = Session::new(SessionId::new(1), layer, &mut store);
        assert!(store.contains(session.overlay()));
        assert!(!session.has_content());
    }

    #[test]
    fn test_set_region_normalizes_negative_spans() {
        let (mut store, layer) = store_with_layer();
        let mut session = Session::new(SessionId::new(1), layer, &mut store);
        // An up-and-left drag: spans fold into the start coordinate.
        session.set_region(Some(Rect::new(10.0, 10.0, -4.0, -6.0)));
        assert_eq!(session.region(), Some(Rect::new(6.0, 4.0, 4.0, 6.0)));
        assert!(matches!(
            session.take_events().last(),
            Some(SessionEvent::RegionChanged(Some(r))) if r.width == 4.0
        ));
    }

    #[test]
    fn test_commit_writes_content_and_tears_down() {
        let (mut store, layer) = store_with_layer();
        let mut session = Session::new(SessionId::new(1), layer.clone(), &mut store);
        let overlay = session.overlay().clone();
        session.set_content(Some(SelectedContent::new(2, 1, "hi")));

        let outcome = session.commit(&mut store, None);
        assert_eq!(outcome, CommitOutcome::Committed(layer.clone()));
        assert!(!store.contains(&overlay));
        let surface = store.surface(&layer).unwrap();
        assert_eq!(surface.read_region(2, 1, 2, 1), "hi");

        let events = session.take_events();
        assert!(matches!(
            events.last(),
            Some(SessionEvent::Committed { target, .. }) if *target == layer
        ));
    }

    #[test]
    fn test_commit_overwrites_with_lifted_blanks() {
        let (mut store, layer) = store_with_layer();
        store
            .surface_mut(&layer)
            .unwrap()
            .set_to_region(0, 0, "xxx");
        let mut session = Session::new(SessionId::new(1), layer.clone(), &mut store);
        session.set_content(Some(SelectedContent::new(0, 0, "a c")));

        session.commit(&mut store, None);
        assert_eq!(store.surface(&layer).unwrap().read_region(0, 0, 3, 1), "a c");
    }

    #[test]
    fn test_commit_without_content_cancels() {
        let (mut store, layer) = store_with_layer();
        let mut session = Session::new(SessionId::new(1), layer, &mut store);
        let overlay = session.overlay().clone();

        assert_eq!(session.commit(&mut store, None), CommitOutcome::Cancelled);
        assert!(!store.contains(&overlay));
        assert!(matches!(
            session.take_events().last(),
            Some(SessionEvent::Cancelled)
        ));
    }

    #[test]
    fn test_commit_missing_target_degrades_to_cancel() {
        let (mut store, layer) = store_with_layer();
        let mut session = Session::new(SessionId::new(1), layer, &mut store);
        session.set_content(Some(SelectedContent::new(0, 0, "x")));

        let gone = SurfaceId::new("missing");
        assert_eq!(session.commit(&mut store, Some(&gone)), CommitOutcome::Cancelled);
        assert!(!session.has_content());
    }

    #[test]
    fn test_cancel_leaves_surfaces_untouched() {
        let (mut store, layer) = store_with_layer();
        let mut session = Session::new(SessionId::new(1), layer.clone(), &mut store);
        session.set_content(Some(SelectedContent::new(0, 0, "x")));

        session.cancel(&mut store);
        assert!(store.surface(&layer).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_restore_redraws_overlay() {
        let (mut store, layer) = store_with_layer();
        let mut session = Session::new(SessionId::new(7), layer, &mut store);
        session.set_region(Some(Rect::new(0.0, 0.0, 16.0, 16.0)));
        session.set_content(Some(SelectedContent::new(1, 1, "ab\ncd")));
        let snapshot = session.snapshot();
        session.discard(&mut store);

        let restored = Session::from_snapshot(snapshot.clone(), &mut store);
        assert_eq!(restored.id(), SessionId::new(7));
        assert_eq!(restored.snapshot(), snapshot);
        let overlay = store.surface(restored.overlay()).unwrap();
        assert_eq!(overlay.read_region(1, 1, 2, 2), "ab\ncd");
    }
}
