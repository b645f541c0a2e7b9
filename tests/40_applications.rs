mod common;

use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::json;

use common::{multipart, multipart_request, TestApp};
use movilidad_api::sql_params;
use movilidad_api::types::{MobilityType, Role};

fn stored_files(app: &TestApp) -> Result<usize> {
    Ok(std::fs::read_dir(&app.config.api.uploads_dir)?.count())
}

/// Rows recorded for a session id, waiting briefly for background inserts
async fn visits_for(app: &TestApp, session: &str, expected: i64) -> Result<i64> {
    let mut count = 0;
    for _ in 0..50 {
        let (n,): (i64,) = app
            .db
            .fetch_one("SELECT COUNT(*) FROM visitor_logs WHERE session_id = $1", &sql_params![session])
            .await?;
        count = n;
        if count >= expected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    Ok(count)
}

#[tokio::test]
async fn submitted_subjects_round_trip_in_order() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let student = app.create_user(Role::Alumno, Some(MobilityType::MovilidadInternacional)).await?;
    let token = app.token_for(student.id);

    let form = multipart(
        &[
            ("nombre", "Ana"),
            ("apellidoPaterno", "Ruiz"),
            ("paisDestino", "Alemania"),
            ("materiasInteres", r#"["Calculus","Physics"]"#),
        ],
        Some(("archivo", "kardex.pdf", b"%PDF-1.4 kardex")),
    );
    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/applications/addApplication", &token, form))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["estado"], "pendiente");
    assert_eq!(body["data"]["clave"], json!(student.clave));
    assert_eq!(body["data"]["archivo"]["originalname"], "kardex.pdf");

    let stored = body["data"]["archivo"]["filename"].as_str().unwrap();
    assert!(app.config.api.uploads_dir.join(stored).exists());

    let id = body["data"]["id"].as_i64().unwrap();
    let (status, body) = app.get(&format!("/api/applications/{id}"), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["materias_interes"], json!(["Calculus", "Physics"]));
    assert_eq!(body["data"]["user_email"], json!(student.email));
    Ok(())
}

#[tokio::test]
async fn malformed_subjects_become_empty() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let student = app.create_user(Role::Alumno, None).await?;
    let token = app.token_for(student.id);

    let form = multipart(&[("nombre", "Luis"), ("materiasInteres", "[Calculus")], None);
    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/applications/addApplication", &token, form))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["materias_interes"], json!([]));
    Ok(())
}

#[tokio::test]
async fn review_outcome_is_validated_and_applied() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let student = app.create_user(Role::Alumno, None).await?;
    let reviewer = app.create_user(Role::Becarios, None).await?;
    let student_token = app.token_for(student.id);
    let reviewer_token = app.token_for(reviewer.id);

    let form = multipart(&[("nombre", "Sofía")], None);
    let (_, body) = app
        .send(multipart_request(Method::POST, "/api/applications/addApplication", &student_token, form))
        .await?;
    let id = body["data"]["id"].as_i64().unwrap();
    let uri = format!("/api/applications/{id}/status");

    let (status, _) = app
        .json(Method::PATCH, &uri, Some(&student_token), json!({"estado": "aceptada"}))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    for estado in ["pendiente", "archivada"] {
        let (status, _) = app
            .json(Method::PATCH, &uri, Some(&reviewer_token), json!({"estado": estado}))
            .await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{estado}");
    }
    let (_, body) = app.get(&format!("/api/applications/{id}"), Some(&student_token)).await?;
    assert_eq!(body["data"]["estado"], "pendiente");

    let (status, body) = app
        .json(
            Method::PATCH,
            &uri,
            Some(&reviewer_token),
            json!({"estado": "aceptada", "comentarios": "Documentación completa"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["estado"], "aceptada");
    assert_eq!(body["data"]["comentarios"], "Documentación completa");

    let (status, _) = app
        .json(
            Method::PATCH,
            "/api/applications/2147483647/status",
            Some(&reviewer_token),
            json!({"estado": "rechazada"}),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn applications_are_private_to_owner_and_staff() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let owner = app.create_user(Role::Alumno, None).await?;
    let other = app.create_user(Role::Alumno, None).await?;

    let form = multipart(&[("nombre", "Diego")], None);
    let (_, body) = app
        .send(multipart_request(Method::POST, "/api/applications/addApplication", &app.token_for(owner.id), form))
        .await?;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, _) = app
        .get(&format!("/api/applications/{id}"), Some(&app.token_for(other.id)))
        .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .get("/api/applications/user/applications", Some(&app.token_for(other.id)))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn comments_are_stored_with_the_submission() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let student = app.create_user(Role::Alumno, None).await?;

    let form = multipart(&[("nombre", "Paola"), ("comentarios", "Prefiero semestre de otoño")], None);
    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/applications/addApplication",
            &app.token_for(student.id),
            form,
        ))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["comentarios"], "Prefiero semestre de otoño");
    Ok(())
}

#[tokio::test]
async fn oversized_text_is_rejected_without_leaving_the_upload() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let student = app.create_user(Role::Alumno, None).await?;
    let nombre = "x".repeat(300);

    let form = multipart(&[("nombre", nombre.as_str())], Some(("archivo", "kardex.pdf", b"%PDF-1.4 kardex")));
    let (status, body) = app
        .send(multipart_request(
            Method::POST,
            "/api/applications/addApplication",
            &app.token_for(student.id),
            form,
        ))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "a value exceeds the maximum allowed length");
    assert_eq!(stored_files(&app)?, 0);

    let (_, body) = app
        .get("/api/applications/user/applications", Some(&app.token_for(student.id)))
        .await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn failed_convocatoria_insert_removes_its_image() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let staff = app.create_user(Role::Becarios, None).await?;
    let titulo = "t".repeat(300);

    let form = multipart(
        &[("titulo", titulo.as_str()), ("descripcion", "Demasiado largo"), ("fecha", "2025-12-01")],
        Some(("imagen", "cartel.png", b"\x89PNG")),
    );
    let (status, body) = app
        .send(multipart_request(Method::POST, "/api/convocatorias", &app.token_for(staff.id), form))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(stored_files(&app)?, 0);
    Ok(())
}

#[tokio::test]
async fn deleting_a_convocatoria_removes_its_image_when_present() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let staff = app.create_user(Role::Becarios, None).await?;
    let admin = app.create_user(Role::Administrador, None).await?;
    let admin_token = app.token_for(admin.id);

    for already_gone in [false, true] {
        let form = multipart(
            &[("titulo", "Verano de investigación"), ("descripcion", "Estancia de 8 semanas"), ("fecha", "2025-12-01")],
            Some(("imagen", "cartel.png", b"\x89PNG")),
        );
        let (status, body) = app
            .send(multipart_request(Method::POST, "/api/convocatorias", &app.token_for(staff.id), form))
            .await?;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["data"]["id"].as_i64().unwrap();
        let imagen = body["data"]["imagen"].as_str().unwrap().to_string();
        let path = app.config.api.uploads_dir.join(imagen.trim_start_matches("/uploads/"));
        assert!(path.exists());

        if already_gone {
            std::fs::remove_file(&path)?;
        }

        let uri = format!("/api/convocatorias/{id}");
        let (status, _) = app.send(common::request(Method::DELETE, &uri, Some(&app.token_for(staff.id)), None)).await?;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = app.send(common::request(Method::DELETE, &uri, Some(&admin_token), None)).await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert!(!path.exists());

        let (status, _) = app.get(&uri, None).await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
    Ok(())
}

#[tokio::test]
async fn public_announcement_reads_are_logged() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let session = format!("sesion-{}", uuid::Uuid::new_v4().simple());

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/convocatorias?pagina=1")
        .header("x-session-id", &session)
        .header("x-forwarded-for", "203.0.113.9")
        .header(header::USER_AGENT, "integration")
        .body(Body::empty())?;
    let (status, _) = app.send(request).await?;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(visits_for(&app, &session, 1).await?, 1);
    let (page, action, ip): (Option<String>, String, Option<String>) = app
        .db
        .fetch_one(
            "SELECT page_visited, action, ip_address FROM visitor_logs WHERE session_id = $1",
            &sql_params![session.as_str()],
        )
        .await?;
    assert_eq!(page.as_deref(), Some("/api/convocatorias?pagina=1"));
    assert_eq!(action, "GET");
    assert_eq!(ip.as_deref(), Some("203.0.113.9"));
    Ok(())
}

#[tokio::test]
async fn explicit_visits_drop_ids_of_deleted_users() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let visitor = app.create_user(Role::Alumno, Some(MobilityType::VisitanteNacional)).await?;
    let gone = app.create_user(Role::Alumno, None).await?;
    let gone_token = app.token_for(gone.id);
    app.db.execute("DELETE FROM users WHERE id = $1", &sql_params![gone.id]).await?;

    for (token, expected) in [(app.token_for(visitor.id), Some(visitor.id)), (gone_token, None)] {
        let session = format!("sesion-{}", uuid::Uuid::new_v4().simple());
        let (status, body) = app
            .json(
                Method::POST,
                "/api/visitor-logs/log",
                Some(&token),
                json!({"page_visited": "/convocatorias", "action": "view", "session_id": session}),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["message"], "visit recorded");

        let (user_id, action): (Option<i32>, String) = app
            .db
            .fetch_one(
                "SELECT user_id, action FROM visitor_logs WHERE session_id = $1",
                &sql_params![session.as_str()],
            )
            .await?;
        assert_eq!(user_id, expected);
        assert_eq!(action, "view");
    }
    Ok(())
}
