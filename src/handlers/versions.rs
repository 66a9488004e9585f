use std::sync::Arc;

use axum::extract::{Extension, Json, Path, Query};
use serde::Deserialize;

use crate::engine::{Engine, Page, TemplateState, TemplateVersion};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{AdminContext, TemplateId, VersionId};

/// GET /api/templates/:id/versions - Version history, newest first
pub async fn list(
    Path(template_id): Path<TemplateId>,
    Query(page): Query<Page>,
    Extension(engine): Extension<Arc<Engine>>,
) -> ApiResult<Vec<TemplateVersion>> {
    let history = engine.get_history(template_id, page).await?;
    Ok(ApiResponse::success(history))
}

#[derive(Debug, Default, Deserialize)]
pub struct CommitRequest {
    /// Explicit state to commit; defaults to the template's working copy.
    #[serde(default)]
    pub state: Option<TemplateState>,
}

/// POST /api/templates/:id/versions - Commit the next version
pub async fn commit(
    Path(template_id): Path<TemplateId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<CommitRequest>,
) -> ApiResult<TemplateVersion> {
    let version = engine
        .commit_version(&ctx, template_id, payload.state)
        .await?;
    Ok(ApiResponse::created(version))
}

#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    pub target_version_id: VersionId,
}

/// POST /api/templates/:id/rollback - Restore a prior snapshot as a
/// new forward commit
pub async fn rollback(
    Path(template_id): Path<TemplateId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<RollbackRequest>,
) -> ApiResult<TemplateVersion> {
    let version = engine
        .rollback(&ctx, template_id, payload.target_version_id)
        .await?;
    Ok(ApiResponse::created(version))
}
