mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

fn app() -> Router {
    atrium_api::routes::app(Arc::new(common::engine()))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-admin-id", uuid::Uuid::new_v4().to_string());
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn public_routes_need_no_auth() -> Result<()> {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["name"], json!("Atrium API"));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["status"], json!("ok"));
    Ok(())
}

#[tokio::test]
async fn cors_follows_configured_origin_allowlist() -> Result<()> {
    let app = app();

    // Development config allows the local frontend origins.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://localhost:3000")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );

    // Unlisted origins get no CORS grant.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(header::ORIGIN, "http://evil.example")
                .body(Body::empty())?,
        )
        .await?;
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());
    Ok(())
}

#[tokio::test]
async fn admin_routes_reject_missing_admin_header() -> Result<()> {
    let response = app()
        .oneshot(Request::builder().uri("/api/schemas").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = read_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["code"], json!("UNAUTHORIZED"));
    Ok(())
}

#[tokio::test]
async fn malformed_admin_header_is_unauthorized() -> Result<()> {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/schemas")
                .header("x-admin-id", "not-a-uuid")
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn schema_crud_over_http() -> Result<()> {
    let app = app();

    let payload = json!({
        "code": "clients",
        "name": "Clients",
        "category": "directory",
        "fields": [
            {"name": "name", "label": "Name", "kind": "text", "required": true},
            {"name": "inn", "label": "Tax number", "kind": "text"}
        ]
    });
    let response = app
        .clone()
        .oneshot(request("POST", "/api/schemas", Some(payload)))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["code"], json!("clients"));
    assert_eq!(body["data"]["fields"][0]["name"], json!("name"));

    // Read it back.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/schemas/clients", None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Field list endpoint preserves order.
    let response = app
        .clone()
        .oneshot(request("GET", "/api/schemas/clients/fields", None))
        .await?;
    let body = read_json(response).await;
    assert_eq!(body["data"][1]["name"], json!("inn"));

    // Relabel through the field endpoint.
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/schemas/clients/fields/inn",
            Some(json!({"required": true})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["fields"][1]["required"], json!(true));

    // Delete the unused schema after dropping its bindings.
    let response = app
        .oneshot(request("DELETE", "/api/schemas/clients", None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["data"]["deleted"], json!(true));
    Ok(())
}

#[tokio::test]
async fn unknown_schema_is_404_with_stable_code() -> Result<()> {
    let response = app()
        .oneshot(request("GET", "/api/schemas/ghost", None))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["error"], json!(true));
    assert_eq!(body["code"], json!("SCHEMA_NOT_FOUND"));
    Ok(())
}

#[tokio::test]
async fn duplicate_schema_is_409() -> Result<()> {
    let app = app();
    let payload = json!({"code": "clients", "name": "Clients", "category": "directory"});

    let response = app
        .clone()
        .oneshot(request("POST", "/api/schemas", Some(payload.clone())))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request("POST", "/api/schemas", Some(payload)))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], json!("DUPLICATE_CODE"));
    Ok(())
}

#[tokio::test]
async fn system_schema_edit_is_403() -> Result<()> {
    let app = app();

    let payload = json!({
        "code": "audit_log",
        "name": "Audit log",
        "category": "journal",
        "system": true
    });
    app.clone()
        .oneshot(request("POST", "/api/schemas", Some(payload)))
        .await?;

    let response = app
        .oneshot(request(
            "POST",
            "/api/schemas/audit_log/fields",
            Some(json!({"name": "extra", "label": "Extra", "kind": "text"})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(body["code"], json!("SYSTEM_SCHEMA_IMMUTABLE"));
    Ok(())
}

#[tokio::test]
async fn commit_bind_and_read_snapshot_over_http() -> Result<()> {
    let app = app();

    app.clone()
        .oneshot(request(
            "POST",
            "/api/schemas",
            Some(json!({"code": "clients", "name": "Clients", "category": "directory"})),
        ))
        .await?;

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/templates",
            Some(json!({
                "name": "retail",
                "kind": "client",
                "schema_bindings": ["clients"]
            })),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let template = read_json(response).await;
    let template_id = template["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/templates/{template_id}/versions"),
            Some(json!({})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let version = read_json(response).await;
    assert_eq!(version["data"]["version"], json!("1.0.0"));
    let version_id = version["data"]["id"].as_str().unwrap().to_string();

    let workspace = uuid::Uuid::new_v4();
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/workspaces/{workspace}/binding"),
            Some(json!({"version_id": version_id})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let applied = read_json(response).await;
    assert_eq!(applied["data"]["applied"], json!(true));

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/workspaces/{workspace}/binding"),
            None,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let snapshot = read_json(response).await;
    assert_eq!(snapshot["data"]["schema_bindings"], json!(["clients"]));

    // History pagination is plain query parameters.
    let response = app
        .oneshot(request(
            "GET",
            &format!("/api/templates/{template_id}/versions?limit=1&offset=0"),
            None,
        ))
        .await?;
    let history = read_json(response).await;
    assert_eq!(history["data"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn rollback_refused_over_http_when_gated() -> Result<()> {
    let app = app();

    for code in ["s1", "s2"] {
        app.clone()
            .oneshot(request(
                "POST",
                "/api/schemas",
                Some(json!({"code": code, "name": code, "category": "directory"})),
            ))
            .await?;
    }

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/templates",
            Some(json!({"name": "gated", "kind": "client", "schema_bindings": ["s1"]})),
        ))
        .await?;
    let template = read_json(response).await;
    let template_id = template["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/templates/{template_id}/versions"),
            Some(json!({})),
        ))
        .await?;
    let v1 = read_json(response).await;
    let v1_id = v1["data"]["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(request(
            "PUT",
            &format!("/api/templates/{template_id}"),
            Some(json!({"schema_bindings": ["s1", "s2"]})),
        ))
        .await?;
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/templates/{template_id}/versions"),
            Some(json!({})),
        ))
        .await?;
    let v2 = read_json(response).await;
    let v2_id = v2["data"]["id"].as_str().unwrap().to_string();

    app.clone()
        .oneshot(request(
            "PUT",
            &format!("/api/workspaces/{}/binding", uuid::Uuid::new_v4()),
            Some(json!({"version_id": v2_id})),
        ))
        .await?;

    let response = app
        .oneshot(request(
            "POST",
            &format!("/api/templates/{template_id}/rollback"),
            Some(json!({"target_version_id": v1_id})),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = read_json(response).await;
    assert_eq!(body["code"], json!("NOT_ROLLBACKABLE"));
    Ok(())
}
