mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use common::TestApp;

#[tokio::test]
async fn root_lists_the_api() -> Result<()> {
    let app = TestApp::lazy()?;
    let (status, body) = app.get("/", None).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "movilidad-api");
    assert!(body["data"]["endpoints"].as_array().unwrap().contains(&json!("/api/stats")));
    Ok(())
}

#[tokio::test]
async fn health_reports_unreachable_database() -> Result<()> {
    let app = TestApp::lazy()?;
    let (status, body) = app.get("/health", None).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "database unavailable");
    Ok(())
}

#[tokio::test]
async fn unknown_route_gets_enveloped_404() -> Result<()> {
    let app = TestApp::lazy()?;
    let (status, body) = app.get("/api/nowhere", None).await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "route not found", "error": "NOT_FOUND"}));
    Ok(())
}

#[tokio::test]
async fn download_rejects_traversal_and_missing_files() -> Result<()> {
    let app = TestApp::lazy()?;

    let (status, body) = app.get("/download/..%2F..%2Fetc%2Fpasswd", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid file name");

    let (status, _) = app.get("/download/never-uploaded.pdf", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn download_serves_attachment() -> Result<()> {
    let app = TestApp::lazy()?;
    std::fs::create_dir_all(&app.config.api.uploads_dir)?;
    std::fs::write(app.config.api.uploads_dir.join("archivo-test.pdf"), b"%PDF-1.4 test")?;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/download/archivo-test.pdf").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert!(response.headers()[header::CONTENT_DISPOSITION]
        .to_str()?
        .starts_with("attachment"));

    let bytes = response.into_body().collect().await?.to_bytes();
    assert_eq!(&bytes[..], b"%PDF-1.4 test");
    Ok(())
}

#[tokio::test]
async fn every_elevated_tier_requires_a_token() -> Result<()> {
    let app = TestApp::lazy()?;

    for (method, uri) in [
        (Method::GET, "/api/users/all"),
        (Method::GET, "/api/stats/filtered?tipo=users&agrupacion=universidad"),
        (Method::POST, "/api/stats/send-pdf"),
        (Method::GET, "/api/visitor-logs/stats"),
        (Method::DELETE, "/api/convocatorias/1"),
        (Method::POST, "/api/catalogo/universidades"),
        (Method::PATCH, "/api/applications/1/status"),
        (Method::GET, "/api/visitantes-info/my-info"),
    ] {
        let (status, body) = app.send(common::request(method.clone(), uri, None, None)).await?;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["message"], "no token provided");
    }
    Ok(())
}
