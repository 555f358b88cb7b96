// src/api.rs
//! Read-only HTTP surface for the dashboard frontend.
//!
//! - `GET  /health`
//! - `GET  /summary`            headline numbers + insight / absence message
//! - `GET  /trends?limit=N`     latest snapshot rows (default 15)
//! - `GET  /jobs?q=...`         job list, optionally filtered by title/skills
//! - `POST /admin/reload`       drop the cached artifacts

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::dashboard::{DashboardCache, DashboardData, DEFAULT_TOP_N, NO_TREND_DATA};
use crate::posting::TrendRow;

#[derive(Clone)]
pub struct AppState {
    pub cache: DashboardCache,
}

impl AppState {
    pub fn new(cache: DashboardCache) -> Self {
        Self { cache }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/summary", get(summary))
        .route("/trends", get(trends))
        .route("/jobs", get(jobs))
        .route("/admin/reload", post(admin_reload))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Missing artifacts are an absence condition, reported as 503 with a reason.
fn unavailable(err: anyhow::Error) -> Response {
    tracing::warn!(target: "dashboard", error = %err, "dashboard data unavailable");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorBody {
            error: format!("{err:#}"),
        }),
    )
        .into_response()
}

fn with_data<T: Serialize>(state: &AppState, f: impl FnOnce(&DashboardData) -> T) -> Response {
    match state.cache.get_or_load() {
        Ok(data) => Json(f(data.as_ref())).into_response(),
        Err(e) => unavailable(e),
    }
}

async fn summary(State(state): State<AppState>) -> Response {
    with_data(&state, DashboardData::summary)
}

#[derive(Deserialize)]
struct TrendsQuery {
    limit: Option<usize>,
}

#[derive(Serialize)]
struct TrendsOut {
    date: String,
    rows: Vec<TrendRow>,
    message: Option<String>,
}

async fn trends(State(state): State<AppState>, Query(q): Query<TrendsQuery>) -> Response {
    let limit = q.limit.unwrap_or(DEFAULT_TOP_N);
    with_data(&state, |d| {
        let rows = d.top_skills(limit).to_vec();
        TrendsOut {
            date: d.latest_update(),
            message: d
                .trends
                .is_empty()
                .then(|| NO_TREND_DATA.to_string()),
            rows,
        }
    })
}

#[derive(Deserialize)]
struct JobsQuery {
    #[serde(default)]
    q: String,
}

async fn jobs(State(state): State<AppState>, Query(q): Query<JobsQuery>) -> Response {
    with_data(&state, |d| d.filter_jobs(&q.q))
}

async fn admin_reload(State(state): State<AppState>) -> &'static str {
    state.cache.invalidate();
    "reloaded"
}
