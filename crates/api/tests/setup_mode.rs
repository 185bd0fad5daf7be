//! Setup mode: missing required configuration turns every route into 503.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::body_json;
use tower::ServiceExt;
use wanted_api::config::{BoardConfig, ConfigError};
use wanted_api::router::build_setup_router;

#[tokio::test]
async fn every_route_returns_setup_instructions() {
    let problem = BoardConfig::from_lookup(|_| None).unwrap_err();
    let app = build_setup_router(&problem, &common::test_config());

    for uri in ["/", "/admin", "/health", "/api/v1/entries", "/anything"] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");

        let json = body_json(response).await;
        assert_eq!(json["code"], "SETUP_REQUIRED");
        assert_eq!(json["detail"], "APP_ID must be set");
        assert!(!json["instructions"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn writes_are_refused_too() {
    let app = build_setup_router(
        &ConfigError::Missing("ADMIN_PASSWORD"),
        &common::test_config(),
    );

    let response = app
        .oneshot(
            Request::post("/api/v1/admin/session")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"password":"sheriff"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["detail"], "ADMIN_PASSWORD must be set");
}

#[tokio::test]
async fn invalid_app_id_reports_the_variable() {
    let problem = BoardConfig::from_lookup(|var| match var {
        "APP_ID" => Some("west/east".to_string()),
        "ADMIN_PASSWORD" => Some("sheriff".to_string()),
        _ => None,
    })
    .unwrap_err();
    let app = build_setup_router(&problem, &common::test_config());

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SETUP_REQUIRED");
    assert!(json["detail"].as_str().unwrap().contains("APP_ID"));
}
