use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use crate::engine::{Engine, NewSection, SectionNode, SectionPatch};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{AdminContext, SectionId};

/// GET /api/sections - List the feature tree as a flat node list
pub async fn list(Extension(engine): Extension<Arc<Engine>>) -> ApiResult<Vec<SectionNode>> {
    Ok(ApiResponse::success(engine.list_sections().await))
}

/// GET /api/sections/:id
pub async fn get(
    Path(id): Path<SectionId>,
    Extension(engine): Extension<Arc<Engine>>,
) -> ApiResult<SectionNode> {
    Ok(ApiResponse::success(engine.get_section(id).await?))
}

/// POST /api/sections
pub async fn create(
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<NewSection>,
) -> ApiResult<SectionNode> {
    let node = engine.create_section(&ctx, payload).await?;
    Ok(ApiResponse::created(node))
}

/// PUT /api/sections/:id - Edit or re-parent a node
pub async fn update(
    Path(id): Path<SectionId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<SectionPatch>,
) -> ApiResult<SectionNode> {
    let node = engine.update_section(&ctx, id, payload).await?;
    Ok(ApiResponse::success(node))
}

/// POST /api/sections/:id/toggle - Flip the enabled flag
pub async fn toggle(
    Path(id): Path<SectionId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
) -> ApiResult<SectionNode> {
    let node = engine.toggle_section(&ctx, id).await?;
    Ok(ApiResponse::success(node))
}

/// DELETE /api/sections/:id
pub async fn delete(
    Path(id): Path<SectionId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
) -> ApiResult<Value> {
    engine.delete_section(&ctx, id).await?;
    Ok(ApiResponse::success(json!({
        "deleted": true,
        "section": id
    })))
}
