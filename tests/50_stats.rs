mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{multipart, multipart_request, TestApp};
use movilidad_api::database::repository::ApplicationRepository;
use movilidad_api::types::Role;

#[tokio::test]
async fn grouped_application_counts_sum_to_total() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let admin = app.create_user(Role::Administrador, None).await?;
    let token = app.token_for(admin.id);

    let (status, body) = app
        .get("/api/stats/filtered?tipo=applications&agrupacion=estado", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let rows = body["data"].as_array().unwrap();
    let sum: i64 = rows.iter().map(|row| row["value"].as_i64().unwrap()).sum();
    let total = ApplicationRepository::new(&app.db).count().await?;
    assert_eq!(sum, total);

    let mut labels: Vec<_> = rows.iter().map(|row| row["label"].to_string()).collect();
    let distinct = labels.len();
    labels.sort();
    labels.dedup();
    assert_eq!(labels.len(), distinct);
    Ok(())
}

#[tokio::test]
async fn invalid_grouping_and_report_type_are_rejected() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let admin = app.create_user(Role::Administrador, None).await?;
    let token = app.token_for(admin.id);

    let (status, _) = app
        .get("/api/stats/filtered?tipo=users&agrupacion=estado", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .get("/api/stats/filtered?tipo=users&agrupacion=universidad&fecha_inicio=ayer", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .get("/api/stats/report/movilidad?tipo_movilidad=visitante_nacional", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("tipo_movilidad must be"));

    let (status, _) = app
        .get("/api/stats/report/visitantes?tipo_movilidad=visitante_nacional", Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn send_pdf_relays_document_and_returns_receipt() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let admin = app.create_user(Role::Administrador, None).await?;
    let token = app.token_for(admin.id);

    let form = multipart(
        &[
            ("email", "coordinacion@uaslp.mx"),
            ("dataset", "Solicitudes"),
            ("filters", r#"{"estado": "aceptada", "beca_id": ""}"#),
        ],
        Some(("pdf", "graficas.pdf", b"%PDF-1.4 charts")),
    );
    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/stats/send-pdf", &token, form))
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["data"],
        json!({"threadId": "t-1", "estado": "En cola", "destino": "coordinacion@uaslp.mx"})
    );

    let sent = app.mail.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].attachment, b"%PDF-1.4 charts".to_vec());
    assert!(sent[0].html.contains("estado: aceptada"));
    assert!(!sent[0].html.contains("beca_id"));
    Ok(())
}

#[tokio::test]
async fn send_pdf_requires_document_and_valid_recipient() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let admin = app.create_user(Role::Administrador, None).await?;
    let token = app.token_for(admin.id);

    let form = multipart(&[("email", "coordinacion@uaslp.mx")], None);
    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/stats/send-pdf", &token, form))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["pdf"], "a PDF file is required");

    let form = multipart(&[("email", "no-at-sign")], Some(("pdf", "g.pdf", b"%PDF")));
    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/stats/send-pdf", &token, form))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid email format");
    assert!(app.mail.sent.lock().unwrap().is_empty());
    Ok(())
}
