mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use common::{unique_clave, TestApp};
use movilidad_api::auth::Claims;
use movilidad_api::types::Role;

#[tokio::test]
async fn protected_route_without_token_is_rejected() -> Result<()> {
    let app = TestApp::lazy()?;
    let (status, body) = app.get("/api/auth/profile", None).await?;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "no token provided");
    Ok(())
}

#[tokio::test]
async fn malformed_and_foreign_tokens_are_invalid() -> Result<()> {
    let app = TestApp::lazy()?;

    let (status, body) = app.get("/api/auth/verify", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token");

    let now = chrono::Utc::now().timestamp();
    let forged = encode(
        &Header::default(),
        &Claims { id: 1, iat: now, exp: now + 3600 },
        &EncodingKey::from_secret(b"some-other-secret"),
    )?;
    let (status, body) = app.get("/api/auth/verify", Some(&forged)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid token");
    Ok(())
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() -> Result<()> {
    let app = TestApp::lazy()?;
    let now = chrono::Utc::now().timestamp();
    let expired = encode(
        &Header::default(),
        &Claims { id: 1, iat: now - 7200, exp: now - 3600 },
        &EncodingKey::from_secret(app.config.security.jwt_secret.as_bytes()),
    )?;

    let (status, body) = app.get("/api/auth/verify", Some(&expired)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "expired token");
    Ok(())
}

#[tokio::test]
async fn login_requires_identifier_and_password() -> Result<()> {
    let app = TestApp::lazy()?;
    let (status, body) = app
        .json(Method::POST, "/api/auth/login", None, json!({"email": "a@uaslp.mx"}))
        .await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "identifier and password are required");
    Ok(())
}

#[tokio::test]
async fn registration_validates_before_touching_storage() -> Result<()> {
    let app = TestApp::lazy()?;

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"nombres": "Ana", "apellidos": "Ruiz", "clave": "12345", "email": "a123456@alumnos.uaslp.mx", "password": "secret1"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field_errors"]["clave"], "clave must be exactly 6 digits");

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"nombres": "Ana", "apellidos": "Ruiz", "clave": "123456", "email": "ana@", "password": "secret1"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "invalid email format");
    Ok(())
}

#[tokio::test]
async fn register_then_login_by_email_and_clave() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let clave = unique_clave();
    let email = format!("reg-{}@uaslp.mx", uuid::Uuid::new_v4().simple());

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"nombres": "Ana", "apellidos": "Ruiz López", "clave": clave, "email": email, "password": "secret1"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"]["token"].is_string());
    assert!(body["data"]["user"].get("password").is_none());
    assert_eq!(body["data"]["user"]["rol"], "alumno");
    assert_eq!(body["data"]["user"]["apellido_materno"], "López");

    let (status, _) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"nombres": "Ana", "apellidos": "Ruiz", "clave": clave, "email": email, "password": "secret1"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);

    for identifier in [email.as_str(), clave.as_str()] {
        let (status, body) = app
            .json(
                Method::POST,
                "/api/auth/login",
                None,
                json!({"identifier": identifier, "password": "secret1"}),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{body}");

        let token = body["data"]["token"].as_str().unwrap().to_string();
        let (status, body) = app.get("/api/auth/verify", Some(&token)).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["valid"], true);
    }
    Ok(())
}

#[tokio::test]
async fn wrong_password_and_unknown_user_look_identical() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let user = app.create_user(Role::Alumno, None).await?;

    let wrong = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"identifier": user.email, "password": "not-it"}),
        )
        .await?;
    let unknown = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"identifier": "nobody-here@uaslp.mx", "password": "not-it"}),
        )
        .await?;

    assert_eq!(wrong.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    Ok(())
}

#[tokio::test]
async fn students_cannot_reach_admin_routes() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let student = app.create_user(Role::Alumno, None).await?;
    let token = app.token_for(student.id);

    let (status, body) = app.get("/api/users/all", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "insufficient permissions");

    let (status, _) = app.get("/api/stats/filter-options", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app.get(&format!("/api/users/{}", student.id), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].get("password").is_none());
    Ok(())
}

#[tokio::test]
async fn email_uniqueness_ignores_case() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let local = format!("caso-{}", uuid::Uuid::new_v4().simple());
    let lower = format!("{local}@example.org");
    let upper = lower.to_uppercase();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"nombres": "Ana", "apellidos": "Ruiz", "clave": unique_clave(), "email": upper, "password": "secret1"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["user"]["email"], json!(lower));
    let id = body["data"]["user"]["id"].clone();

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/register",
            None,
            json!({"nombres": "Otra", "apellidos": "Persona", "clave": unique_clave(), "email": lower, "password": "secret2"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email or code already exists");

    for identifier in [lower.as_str(), upper.as_str()] {
        let (status, body) = app
            .json(
                Method::POST,
                "/api/auth/login",
                None,
                json!({"identifier": identifier, "password": "secret1"}),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{identifier}: {body}");
        assert_eq!(body["data"]["user"]["id"], id);
    }
    Ok(())
}

#[tokio::test]
async fn bulk_import_keeps_going_past_bad_rows() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let admin = app.create_user(Role::Administrador, None).await?;
    let token = app.token_for(admin.id);
    let first = format!("lote-{}@uaslp.mx", uuid::Uuid::new_v4().simple());
    let last = format!("lote-{}@uaslp.mx", uuid::Uuid::new_v4().simple());

    let (status, body) = app
        .json(
            Method::POST,
            "/api/users/import",
            Some(&token),
            json!({"users": [
                {"nombres": "Luis", "email": first, "password": "123456", "rol": "becarios"},
                {"nombres": "Sin Correo", "email": "no-es-correo", "password": "123456"},
                {"nombres": "Repetido", "email": first.to_uppercase(), "password": "123456"},
                {"nombres": "Marta", "email": last, "password": "123456"}
            ]}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["successful"], 2);
    assert_eq!(body["data"]["failed"], 2);

    let errors: Vec<&str> = body["data"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].starts_with("row 2 (Sin Correo"), "{}", errors[0]);
    assert!(errors[0].ends_with("invalid email format"), "{}", errors[0]);
    assert!(errors[1].starts_with("row 3 (Repetido"), "{}", errors[1]);
    assert!(errors[1].ends_with("email or code already exists"), "{}", errors[1]);

    let (status, body) = app
        .json(
            Method::POST,
            "/api/auth/login",
            None,
            json!({"identifier": last, "password": "123456"}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["user"]["rol"], "alumno");
    Ok(())
}

#[tokio::test]
async fn user_detail_resolves_catalog_names() -> Result<()> {
    let Some(app) = TestApp::with_database().await? else {
        return Ok(());
    };
    let admin = app.create_user(Role::Administrador, None).await?;
    let student = app.create_user(Role::Alumno, None).await?;
    let admin_token = app.token_for(admin.id);
    let token = app.token_for(student.id);
    let uri = format!("/api/users/{}", student.id);

    let (status, body) = app.get(&uri, Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    for reference in ["universidad", "facultad", "carrera", "beca"] {
        assert!(body["data"][reference].is_null(), "{reference}: {body}");
    }

    let nombre = format!("Universidad {}", uuid::Uuid::new_v4().simple());
    let (status, body) = app
        .json(
            Method::POST,
            "/api/catalogo/universidades",
            Some(&admin_token),
            json!({"nombre": nombre, "pais": "México"}),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let universidad = body["data"]["id"].clone();

    let (status, body) = app
        .json(
            Method::PATCH,
            &format!("{uri}/field"),
            Some(&token),
            json!({"field": "universidad_id", "value": universidad}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, body) = app.get(&uri, Some(&token)).await?;
    assert_eq!(body["data"]["universidad_id"], universidad);
    assert_eq!(body["data"]["universidad"]["nombre"], json!(nombre));
    assert_eq!(body["data"]["universidad"]["pais"], "México");
    assert!(body["data"]["facultad"].is_null());
    assert!(body["data"]["beca"].is_null());
    Ok(())
}
