use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde_json::{json, Value};

use crate::engine::{Engine, NewTemplate, Template, TemplatePatch};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::{AdminContext, TemplateId};

/// GET /api/templates
pub async fn list(Extension(engine): Extension<Arc<Engine>>) -> ApiResult<Vec<Template>> {
    Ok(ApiResponse::success(engine.list_templates().await))
}

/// GET /api/templates/:id
pub async fn get(
    Path(id): Path<TemplateId>,
    Extension(engine): Extension<Arc<Engine>>,
) -> ApiResult<Template> {
    Ok(ApiResponse::success(engine.get_template(id).await?))
}

/// POST /api/templates
pub async fn create(
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<NewTemplate>,
) -> ApiResult<Template> {
    let template = engine.create_template(&ctx, payload).await?;
    Ok(ApiResponse::created(template))
}

/// PUT /api/templates/:id - Edit the working copy (bindings, config,
/// flags); committed history is untouched until the next commit
pub async fn update(
    Path(id): Path<TemplateId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<TemplatePatch>,
) -> ApiResult<Template> {
    let template = engine.update_template(&ctx, id, payload).await?;
    Ok(ApiResponse::success(template))
}

/// DELETE /api/templates/:id
pub async fn delete(
    Path(id): Path<TemplateId>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
) -> ApiResult<Value> {
    engine.delete_template(&ctx, id).await?;
    Ok(ApiResponse::success(json!({
        "deleted": true,
        "template": id
    })))
}
