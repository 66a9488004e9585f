use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::engine::Engine;
use crate::handlers::{schemas, sections, templates, versions, workspaces};
use crate::middleware::admin_context_middleware;

pub fn app(engine: Arc<Engine>) -> Router {
    let config = crate::config::config();

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Admin API (requires X-Admin-Id)
        .merge(api_routes())
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(Extension(engine));

    if config.security.enable_cors {
        router = router.layer(cors_layer(&config.security.cors_origins));
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }
    router
}

/// CORS policy from the configured origin allowlist. A literal `*`
/// entry opts into the permissive wildcard policy.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }
    let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn api_routes() -> Router {
    Router::new()
        // Schema registry
        .route(
            "/api/schemas",
            get(schemas::list).post(schemas::create),
        )
        .route(
            "/api/schemas/:code",
            get(schemas::get)
                .put(schemas::update)
                .delete(schemas::delete),
        )
        .route(
            "/api/schemas/:code/fields",
            get(schemas::list_fields).post(schemas::create_field),
        )
        .route(
            "/api/schemas/:code/fields/:name",
            put(schemas::update_field).delete(schemas::delete_field),
        )
        // Section tree
        .route(
            "/api/sections",
            get(sections::list).post(sections::create),
        )
        .route(
            "/api/sections/:id",
            get(sections::get)
                .put(sections::update)
                .delete(sections::delete),
        )
        .route("/api/sections/:id/toggle", post(sections::toggle))
        // Template composer
        .route(
            "/api/templates",
            get(templates::list).post(templates::create),
        )
        .route(
            "/api/templates/:id",
            get(templates::get)
                .put(templates::update)
                .delete(templates::delete),
        )
        // Version ledger
        .route(
            "/api/templates/:id/versions",
            get(versions::list).post(versions::commit),
        )
        .route("/api/templates/:id/rollback", post(versions::rollback))
        // Workspace binder
        .route(
            "/api/workspaces/:id/binding",
            put(workspaces::bind).get(workspaces::active_snapshot),
        )
        .route_layer(axum::middleware::from_fn(admin_context_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Atrium API",
            "version": version,
            "description": "Workspace platform admin backend: schema registry with versioned template composition",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "schemas": "/api/schemas[/:code[/fields/:name]] (admin)",
                "sections": "/api/sections[/:id[/toggle]] (admin)",
                "templates": "/api/templates[/:id[/versions|/rollback]] (admin)",
                "workspaces": "/api/workspaces/:id/binding (admin)",
            }
        }
    }))
}

async fn health(Extension(engine): Extension<Arc<Engine>>) -> axum::response::Json<Value> {
    let now = chrono::Utc::now();
    let schemas = engine.list_schemas().await.len();
    let templates = engine.list_templates().await.len();

    axum::response::Json(json!({
        "success": true,
        "data": {
            "status": "ok",
            "timestamp": now,
            "schemas": schemas,
            "templates": templates,
        }
    }))
}
