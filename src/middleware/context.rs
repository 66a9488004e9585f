use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ApiError;
use crate::types::AdminContext;

pub const ADMIN_ID_HEADER: &str = "x-admin-id";

/// Builds the request-scoped operator context from the `X-Admin-Id`
/// header and injects it as an extension. The session protocol itself
/// lives upstream (gateway); the engine only needs an attributable
/// identity per request.
pub async fn admin_context_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let admin_id = extract_admin_id(&headers).map_err(ApiError::unauthorized)?;

    request.extensions_mut().insert(AdminContext::new(admin_id));
    Ok(next.run(request).await)
}

fn extract_admin_id(headers: &HeaderMap) -> Result<Uuid, String> {
    let raw = headers
        .get(ADMIN_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| format!("Missing {} header", ADMIN_ID_HEADER))?;

    raw.parse::<Uuid>()
        .map_err(|_| format!("Invalid {} header: not a UUID", ADMIN_ID_HEADER))
}
