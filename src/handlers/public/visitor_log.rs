// handlers/public/visitor_log.rs - POST /api/visitor-logs/log handler

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;

use crate::app::AppState;
use crate::database::repository::VisitorLogRepository;
use crate::middleware::visit::visit_from_headers;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Default, Deserialize)]
pub struct VisitRequest {
    pub page_visited: Option<String>,
    pub action: Option<String>,
    pub session_id: Option<String>,
}

/// POST /api/visitor-logs/log - record a page view; a bearer token, if valid, names the visitor
pub async fn log_visit(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(request): Json<VisitRequest>,
) -> ApiResult<()> {
    let mut visit = visit_from_headers(&state, &headers, connect_info.map(|info| info.0));
    visit.page_visited = request.page_visited.filter(|p| !p.trim().is_empty());
    visit.action = request.action.filter(|a| !a.trim().is_empty());
    if request.session_id.is_some() {
        visit.session_id = request.session_id;
    }

    VisitorLogRepository::new(&state.db).log(&visit).await?;
    Ok(ApiResponse::message("visit recorded"))
}
