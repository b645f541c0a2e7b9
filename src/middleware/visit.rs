use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, OriginalUri, Request, State},
    http::{header::USER_AGENT, HeaderMap},
    middleware::Next,
    response::Response,
};

use super::auth::optional_user_id;
use crate::app::AppState;
use crate::database::models::NewVisit;
use crate::database::repository::VisitorLogRepository;

/// Client address, preferring the first `X-Forwarded-For` hop
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
}

/// Visit details common to middleware and explicit logging
pub fn visit_from_headers(state: &AppState, headers: &HeaderMap, peer: Option<SocketAddr>) -> NewVisit {
    NewVisit {
        user_id: optional_user_id(state, headers),
        ip_address: client_ip(headers, peer),
        user_agent: headers.get(USER_AGENT).and_then(|v| v.to_str().ok()).map(str::to_string),
        session_id: headers.get("x-session-id").and_then(|v| v.to_str().ok()).map(str::to_string),
        ..NewVisit::default()
    }
}

/// Record the request in `visitor_logs` without delaying it
pub async fn track_visit(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let peer = request.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0);
    let mut visit = visit_from_headers(&state, request.headers(), peer);
    // Nested routers see a stripped path; log the one the client asked for.
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|original| original.0.clone())
        .unwrap_or_else(|| request.uri().clone());
    visit.page_visited = Some(
        uri.path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| uri.path().to_string()),
    );
    visit.action = Some(request.method().as_str().to_string());

    let db = state.db.clone();
    tokio::spawn(async move {
        if let Err(e) = VisitorLogRepository::new(&db).log(&visit).await {
            tracing::warn!("Failed to record visit: {}", e);
        }
    });

    next.run(request).await
}
