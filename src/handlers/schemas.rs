use std::sync::Arc;

use axum::extract::{Extension, Json, Path};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::engine::{
    Engine, FieldChange, FieldDescriptor, NewSchema, SchemaPatch, TableSchema,
};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::AdminContext;

/// GET /api/schemas - List all table schemas
pub async fn list(Extension(engine): Extension<Arc<Engine>>) -> ApiResult<Vec<TableSchema>> {
    Ok(ApiResponse::success(engine.list_schemas().await))
}

/// GET /api/schemas/:code - Get a single schema with its fields
pub async fn get(
    Path(code): Path<String>,
    Extension(engine): Extension<Arc<Engine>>,
) -> ApiResult<TableSchema> {
    Ok(ApiResponse::success(engine.get_schema(&code).await?))
}

/// POST /api/schemas - Create a schema from a full definition
pub async fn create(
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<NewSchema>,
) -> ApiResult<TableSchema> {
    let schema = engine.create_schema(&ctx, payload).await?;
    Ok(ApiResponse::created(schema))
}

/// PUT /api/schemas/:code - Edit schema header (name, category)
pub async fn update(
    Path(code): Path<String>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<SchemaPatch>,
) -> ApiResult<TableSchema> {
    let schema = engine.update_schema(&ctx, &code, payload).await?;
    Ok(ApiResponse::success(schema))
}

/// DELETE /api/schemas/:code - Delete an unused, non-system schema
pub async fn delete(
    Path(code): Path<String>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
) -> ApiResult<Value> {
    engine.delete_schema(&ctx, &code).await?;
    Ok(ApiResponse::success(json!({
        "deleted": true,
        "schema": code
    })))
}

/// GET /api/schemas/:code/fields - Ordered field descriptor list
pub async fn list_fields(
    Path(code): Path<String>,
    Extension(engine): Extension<Arc<Engine>>,
) -> ApiResult<Vec<FieldDescriptor>> {
    Ok(ApiResponse::success(engine.get_fields(&code).await?))
}

/// POST /api/schemas/:code/fields - Add one field
pub async fn create_field(
    Path(code): Path<String>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<FieldDescriptor>,
) -> ApiResult<TableSchema> {
    let schema = engine
        .change_fields(&ctx, &code, vec![FieldChange::Added { field: payload }])
        .await?;
    Ok(ApiResponse::created(schema))
}

#[derive(Debug, Deserialize)]
pub struct FieldUpdate {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

/// PUT /api/schemas/:code/fields/:name - Relabel a field in place,
/// preserving its identity
pub async fn update_field(
    Path((code, name)): Path<(String, String)>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
    Json(payload): Json<FieldUpdate>,
) -> ApiResult<TableSchema> {
    let change = FieldChange::Relabeled {
        name,
        label: payload.label,
        required: payload.required,
        choices: payload.choices,
    };
    let schema = engine.change_fields(&ctx, &code, vec![change]).await?;
    Ok(ApiResponse::success(schema))
}

/// DELETE /api/schemas/:code/fields/:name - Remove one field
pub async fn delete_field(
    Path((code, name)): Path<(String, String)>,
    Extension(engine): Extension<Arc<Engine>>,
    Extension(ctx): Extension<AdminContext>,
) -> ApiResult<TableSchema> {
    let schema = engine
        .change_fields(&ctx, &code, vec![FieldChange::Removed { name }])
        .await?;
    Ok(ApiResponse::success(schema))
}
