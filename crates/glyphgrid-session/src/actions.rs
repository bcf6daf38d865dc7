#![forbid(unsafe_code)]

//! Select-domain action kinds and their handler table.
//!
//! The journal target for this whole domain is the session manager:
//! actions carry whole [`SessionSnapshot`] states in their payloads and
//! replay swaps them in and out. Surface side effects (extraction
//! clearing the source, commit writing the target) are re-applied and
//! reverted explicitly per kind.
//!
//! # Payload shape
//!
//! Every kind uses the same [`SelectPayload`] for both `before` and
//! `after`, so decode is uniform and snapshots stay self-describing:
//!
//! | kind              | before          | after                         |
//! |-------------------|-----------------|-------------------------------|
//! | `session_extract` | session: None   | session: populated            |
//! | `session_change`  | session: prior  | session: next                 |
//! | `session_commit`  | session: prior  | session: None + committed_to  |
//! | `session_cancel`  | session: prior  | session: None                 |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use glyphgrid_core::{CellMetrics, SurfaceId, SurfaceStore};
use glyphgrid_journal::{Action, ActionKind, ApplyError, HandlerTable, TargetId};

use crate::content::SelectedContent;
use crate::manager::SessionManager;
use crate::session::SessionSnapshot;

/// The closed set of select-domain action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectKind {
    /// Content lifted off its source surface into a session.
    SessionExtract,
    /// Session state replaced (populate from paste, move, rotate).
    SessionChange,
    /// Session resolved by writing its content to a surface.
    SessionCommit,
    /// Session resolved by discarding its content.
    SessionCancel,
}

impl ActionKind for SelectKind {
    fn name(&self) -> &'static str {
        match self {
            Self::SessionExtract => "select::session_extract",
            Self::SessionChange => "select::session_change",
            Self::SessionCommit => "select::session_commit",
            Self::SessionCancel => "select::session_cancel",
        }
    }
}

/// The journal target id the session manager registers under.
#[must_use]
pub fn select_target() -> TargetId {
    TargetId::new("select:manager")
}

/// Uniform payload for all select-domain actions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SelectPayload {
    /// Full session state, `None` for "no active session".
    pub session: Option<SessionSnapshot>,
    /// For commits: the surface the content was written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub committed_to: Option<SurfaceId>,
    /// For commits: the target footprint as it read just before the
    /// write, so revert restores overwritten cells instead of blanking
    /// them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overwritten: Option<String>,
}

impl SelectPayload {
    /// Payload holding a session state.
    #[must_use]
    pub fn session(snapshot: Option<SessionSnapshot>) -> Self {
        Self {
            session: snapshot,
            committed_to: None,
            overwritten: None,
        }
    }

    /// Payload for a resolved commit.
    #[must_use]
    pub fn committed(target: SurfaceId, overwritten: Option<String>) -> Self {
        Self {
            session: None,
            committed_to: Some(target),
            overwritten,
        }
    }

    fn decode(value: &Value) -> Result<Self, ApplyError> {
        Ok(serde_json::from_value(value.clone())?)
    }
}

/// Capability bundle select-domain handlers run against.
///
/// Assembled by the caller for the duration of one journal call; the
/// journal itself never stores any of these references.
pub struct SelectCtx<'a> {
    /// Owner of the active session.
    pub manager: &'a mut SessionManager,
    /// Resolves surface handles for reads and writes.
    pub store: &'a mut dyn SurfaceStore,
    /// World size of one character cell.
    pub metrics: CellMetrics,
}

/// Handler table for [`SelectKind`].
pub struct SelectHandlers;

impl SelectHandlers {
    fn content_of(snapshot: &Option<SessionSnapshot>) -> Result<&SelectedContent, ApplyError> {
        snapshot
            .as_ref()
            .and_then(|s| s.content.as_ref())
            .ok_or_else(|| ApplyError::InvalidState("payload session has no content".into()))
    }

    fn source_of(snapshot: &Option<SessionSnapshot>) -> Result<&SurfaceId, ApplyError> {
        snapshot
            .as_ref()
            .map(|s| &s.source)
            .ok_or_else(|| ApplyError::InvalidState("payload has no session".into()))
    }
}

impl HandlerTable<SelectKind, SelectCtx<'_>> for SelectHandlers {
    fn apply(&self, action: &Action<SelectKind>, ctx: &mut SelectCtx<'_>) -> Result<(), ApplyError> {
        let before = SelectPayload::decode(&action.before)?;
        let after = SelectPayload::decode(&action.after)?;
        match action.kind {
            SelectKind::SessionExtract => {
                // Re-lift: clear the footprint off the source, then
                // install the populated session state.
                let content = Self::content_of(&after.session)?;
                let source = Self::source_of(&after.session)?;
                let surface = ctx
                    .store
                    .surface_mut(source)
                    .ok_or_else(|| ApplyError::TargetNotFound(TargetId::new(source.as_str())))?;
                let r = content.region;
                surface.clear_region(r.x, r.y, r.width, r.height);
                ctx.manager.restore(after.session, ctx.store);
            }
            SelectKind::SessionChange => {
                ctx.manager.restore(after.session, ctx.store);
            }
            SelectKind::SessionCommit => {
                let target = after.committed_to.ok_or_else(|| {
                    ApplyError::InvalidState("commit action without a target".into())
                })?;
                ctx.manager.restore(before.session, ctx.store);
                ctx.manager.commit_active(ctx.store, Some(&target));
            }
            SelectKind::SessionCancel => {
                ctx.manager.restore(None, ctx.store);
            }
        }
        Ok(())
    }

    fn revert(&self, action: &Action<SelectKind>, ctx: &mut SelectCtx<'_>) -> Result<(), ApplyError> {
        let before = SelectPayload::decode(&action.before)?;
        let after = SelectPayload::decode(&action.after)?;
        match action.kind {
            SelectKind::SessionExtract => {
                // Put the lifted characters back, then drop the session.
                let content = Self::content_of(&after.session)?;
                let source = Self::source_of(&after.session)?;
                let surface = ctx
                    .store
                    .surface_mut(source)
                    .ok_or_else(|| ApplyError::TargetNotFound(TargetId::new(source.as_str())))?;
                surface.set_to_region(content.region.x, content.region.y, &content.data);
                ctx.manager.restore(before.session, ctx.store);
            }
            SelectKind::SessionChange => {
                ctx.manager.restore(before.session, ctx.store);
            }
            SelectKind::SessionCommit => {
                // Put the target footprint back the way the commit
                // found it, then bring the session back.
                let content = Self::content_of(&before.session)?;
                let target = after.committed_to.ok_or_else(|| {
                    ApplyError::InvalidState("commit action without a target".into())
                })?;
                let surface = ctx
                    .store
                    .surface_mut(&target)
                    .ok_or_else(|| ApplyError::TargetNotFound(TargetId::new(target.as_str())))?;
                let r = content.region;
                match &after.overwritten {
                    Some(patch) => surface.set_to_region(r.x, r.y, patch),
                    None => surface.clear_region(r.x, r.y, r.width, r.height),
                }
                ctx.manager.restore(before.session, ctx.store);
            }
            SelectKind::SessionCancel => {
                ctx.manager.restore(before.session, ctx.store);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_are_stable() {
        assert_eq!(SelectKind::SessionExtract.name(), "select::session_extract");
        assert_eq!(SelectKind::SessionCommit.name(), "select::session_commit");
    }

    #[test]
    fn test_payload_serde_omits_unset_target() {
        let p = SelectPayload::session(None);
        let json = serde_json::to_string(&p).unwrap();
        assert!(!json.contains("committed_to"));
        let back: SelectPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }
}
