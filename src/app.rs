// app.rs - shared state and route table
//
// Access tiers are applied per method: `authed` wraps a method router in
// `jwt_auth_middleware`, `gated` additionally puts a `RoleGate` behind it.
// Tiers sharing a path are combined with `MethodRouter::merge`.

use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put, MethodRouter},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::Database;
use crate::error::ApiError;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{jwt_auth_middleware, require_role, track_visit, RoleGate};
use crate::services::{HttpMailRelay, MailError, MailTransport};
use crate::types::Role;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub mail: Arc<dyn MailTransport>,
}

impl AppState {
    /// State backed by the configured HTTP mail relay
    pub fn new(db: Database, config: AppConfig) -> Result<Self, MailError> {
        let relay = HttpMailRelay::new(&config.mail)?;
        Ok(Self::with_mail(db, config, Arc::new(relay)))
    }

    pub fn with_mail(db: Database, config: AppConfig, mail: Arc<dyn MailTransport>) -> Self {
        Self {
            db,
            config: Arc::new(config),
            mail,
        }
    }
}

fn authed(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn gated(state: &AppState, allowed: &'static [Role], route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    let gate = RoleGate::new(state.db.clone(), allowed);
    authed(state, route.route_layer(from_fn_with_state(gate, require_role)))
}

fn tracked(state: &AppState, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(state.clone(), track_visit))
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/users", user_routes(&state))
        .nest("/applications", application_routes(&state))
        .nest("/convocatorias", convocatoria_routes(&state))
        .nest("/catalogo", catalog_routes(&state))
        .nest("/filters", filter_routes())
        .nest("/visitantes-info", visitante_routes(&state))
        .nest("/visitor-logs", visitor_log_routes(&state))
        .nest("/stats", stats_routes(&state));

    let uploads = ServeDir::new(&state.config.api.uploads_dir);

    Router::new()
        .route("/", get(public::health::root))
        .route("/health", get(public::health::health))
        .route("/download/:filename", get(public::download::download))
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(panic_response))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config))
                .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes)),
        )
        .with_state(state)
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    use protected::auth as session;
    use public::auth;

    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/profile", authed(state, get(session::profile)))
        .route("/verify", authed(state, get(session::verify)))
}

fn user_routes(state: &AppState) -> Router<AppState> {
    use elevated::users as admin;
    use protected::users;

    Router::new()
        .route("/all", gated(state, Role::ADMIN, get(admin::list)))
        .route("/search", gated(state, Role::ADMIN, get(admin::search)))
        .route("/import", gated(state, Role::ADMIN, post(admin::import)))
        .route("/:id", authed(state, get(users::show)))
        .route("/:id/rol", gated(state, Role::ADMIN, patch(admin::update_role)))
        .route("/:id/field", authed(state, patch(users::update_field)))
        .route("/:id/password", authed(state, patch(users::change_password)))
}

fn application_routes(state: &AppState) -> Router<AppState> {
    use elevated::applications as review;
    use protected::applications;

    Router::new()
        .route("/addApplication", authed(state, post(applications::create)))
        .route("/all", gated(state, Role::STAFF, get(review::list)))
        .route("/admin/all", gated(state, Role::STAFF, get(review::list)))
        .route("/user/applications", authed(state, get(applications::mine)))
        .route("/:id", authed(state, get(applications::show)))
        .route("/:id/status", gated(state, Role::STAFF, patch(review::update_status)))
}

fn convocatoria_routes(state: &AppState) -> Router<AppState> {
    use elevated::convocatorias as manage;
    use public::convocatorias;

    Router::new()
        .route(
            "/",
            tracked(state, get(convocatorias::list)).merge(gated(state, Role::STAFF, post(manage::create))),
        )
        .route(
            "/:id",
            tracked(state, get(convocatorias::show))
                .merge(gated(state, Role::STAFF, put(manage::update)))
                .merge(gated(state, Role::ADMIN, delete(manage::delete))),
        )
}

fn catalog_routes(state: &AppState) -> Router<AppState> {
    use elevated::catalog as manage;
    use public::catalog;

    let admin = |route: MethodRouter<AppState>| gated(state, Role::ADMIN, route);

    Router::new()
        .route(
            "/universidades",
            get(catalog::universidades_list).merge(admin(post(manage::universidad_create))),
        )
        .route(
            "/universidades/:id",
            get(catalog::universidad_show)
                .merge(admin(put(manage::universidad_update).delete(manage::universidad_delete))),
        )
        .route("/universidades/:id/facultades", get(catalog::universidad_facultades))
        .route(
            "/facultades",
            get(catalog::facultades_list).merge(admin(post(manage::facultad_create))),
        )
        .route(
            "/facultades/:id",
            get(catalog::facultad_show).merge(admin(put(manage::facultad_update).delete(manage::facultad_delete))),
        )
        .route("/facultades/:id/carreras", get(catalog::facultad_carreras))
        .route(
            "/carreras",
            get(catalog::carreras_list).merge(admin(post(manage::carrera_create))),
        )
        .route(
            "/carreras/:id",
            get(catalog::carrera_show).merge(admin(put(manage::carrera_update).delete(manage::carrera_delete))),
        )
        .route("/carreras/:id/materias", get(catalog::carrera_materias))
        .route(
            "/materias",
            get(catalog::materias_list).merge(admin(post(manage::materia_create))),
        )
        .route(
            "/materias/:id",
            get(catalog::materia_show).merge(admin(put(manage::materia_update).delete(manage::materia_delete))),
        )
        .route("/becas", get(catalog::becas_list).merge(admin(post(manage::beca_create))))
        .route(
            "/becas/:id",
            get(catalog::beca_show).merge(admin(put(manage::beca_update).delete(manage::beca_delete))),
        )
}

fn filter_routes() -> Router<AppState> {
    use public::filters;

    Router::new()
        .route("/universidades", get(filters::universidades))
        .route("/facultades", get(filters::facultades))
        .route("/carreras", get(filters::carreras))
        .route("/becas", get(filters::becas))
}

fn visitante_routes(state: &AppState) -> Router<AppState> {
    use elevated::visitantes_info as admin;
    use protected::visitantes_info;

    Router::new()
        .route("/", authed(state, post(visitantes_info::upsert)))
        .route("/my-info", authed(state, get(visitantes_info::mine)))
        .route("/all", gated(state, Role::ADMIN, get(admin::list)))
        .route("/tipo/:tipo", gated(state, Role::ADMIN, get(admin::by_tipo)))
        .route(
            "/:user_id",
            gated(state, Role::ADMIN, get(admin::show)).merge(authed(state, delete(visitantes_info::delete))),
        )
}

fn visitor_log_routes(state: &AppState) -> Router<AppState> {
    use elevated::visitor_logs;

    Router::new()
        .route("/log", post(public::visitor_log::log_visit))
        .route("/stats", gated(state, Role::ADMIN, get(visitor_logs::stats)))
        .route("/logs", gated(state, Role::ADMIN, get(visitor_logs::logs)))
        .route("/stats/pages", gated(state, Role::ADMIN, get(visitor_logs::pages)))
        .route("/stats/period", gated(state, Role::ADMIN, get(visitor_logs::period)))
}

fn stats_routes(state: &AppState) -> Router<AppState> {
    use elevated::{send_pdf, stats};

    let admin = |route: MethodRouter<AppState>| gated(state, Role::ADMIN, route);

    Router::new()
        .route("/users/by-universidad", admin(get(stats::users_by_universidad)))
        .route("/users/by-facultad", admin(get(stats::users_by_facultad)))
        .route("/users/by-carrera", admin(get(stats::users_by_carrera)))
        .route("/users/by-tipo-movilidad", admin(get(stats::users_by_tipo_movilidad)))
        .route("/users/by-month", admin(get(stats::users_by_month)))
        .route("/applications/by-estado", admin(get(stats::applications_by_estado)))
        .route("/applications/by-ciclo", admin(get(stats::applications_by_ciclo)))
        .route("/applications/by-month", admin(get(stats::applications_by_month)))
        .route("/filtered", admin(get(stats::filtered)))
        .route("/filter-options", admin(get(stats::filter_options)))
        .route("/visitors/pages", admin(get(stats::visitor_pages)))
        .route("/visitors/period", admin(get(stats::visitor_period)))
        .route("/visitors/hourly", admin(get(stats::visitor_hourly)))
        .route("/visitors/summary", admin(get(stats::visitor_summary)))
        .route("/report/movilidad", admin(get(stats::report_movilidad)))
        .route("/report/visitantes", admin(get(stats::report_visitantes)))
        .route("/send-pdf", admin(post(send_pdf::send_pdf)))
}

/// Explicit origins from config; an empty list or `*` allows any origin
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_origins;
    let layer = CorsLayer::new().allow_methods(AnyOrigin).allow_headers(AnyOrigin);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AnyOrigin);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("route not found")
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);

    let error = ApiError::internal_server_error("internal server error");
    (StatusCode::INTERNAL_SERVER_ERROR, Json(error.to_json())).into_response()
}
