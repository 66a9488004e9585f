//! Workspace Binder: the external-facing seam. A workspace holds at
//! most one active template version; binding routes through the
//! ledger's `mark_applied` so rollback gating stays consistent.

use crate::engine::diff::TemplateState;
use crate::engine::error::EngineError;
use crate::engine::ledger::TemplateVersion;
use crate::engine::{audit, Engine};
use crate::types::{AdminContext, VersionId, WorkspaceId};

impl Engine {
    pub async fn bind_workspace(
        &self,
        ctx: &AdminContext,
        workspace_id: WorkspaceId,
        version_id: VersionId,
    ) -> Result<TemplateVersion, EngineError> {
        let applied = self.mark_applied(version_id, workspace_id).await?;
        audit(ctx, "workspace.bind", &workspace_id.to_string());
        Ok(applied)
    }

    /// Read-only view of the configuration a workspace currently runs.
    pub async fn get_active_snapshot(
        &self,
        workspace_id: WorkspaceId,
    ) -> Result<TemplateState, EngineError> {
        let state = self.state.read().await;
        let version_id = state
            .bindings
            .get(&workspace_id)
            .copied()
            .ok_or(EngineError::WorkspaceNotFound(workspace_id))?;
        state
            .versions
            .values()
            .flatten()
            .find(|v| v.id == version_id)
            .map(|v| v.snapshot.clone())
            .ok_or(EngineError::VersionNotFound(version_id))
    }
}
