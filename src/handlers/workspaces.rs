use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde::Deserialize;

use crate::engine::{Engine, TemplateState, TemplateVersion};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{AdminContext, VersionId, WorkspaceId};

#[derive(Debug, Deserialize)]
pub struct BindRequest {
    pub version_id: VersionId,
}

/// PUT /api/workspaces/:id/binding - Bind the workspace to a template
/// version (marks the version applied)
pub async fn bind(
    Path(workspace_id): Path<WorkspaceId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<BindRequest>,
) -> ApiResult<TemplateVersion> {
    let applied = engine
        .bind_workspace(&ctx, workspace_id, payload.version_id)
        .await?;
    Ok(ApiResponse::success(applied))
}

/// GET /api/workspaces/:id/binding - The snapshot the workspace runs
pub async fn active_snapshot(
    Path(workspace_id): Path<WorkspaceId>,
    Extension(engine): Extension<Arc<Engine>>,
) -> ApiResult<TemplateState> {
    let snapshot = engine.get_active_snapshot(workspace_id).await?;
    Ok(ApiResponse::success(snapshot))
}
