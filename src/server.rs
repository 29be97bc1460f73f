use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::catalog::{CapacityConfig, RequestError, ScheduleRequest};
use crate::config::Config;
use crate::solver::orchestrator::Scheduler;
use crate::solver::SelectionResult;

#[derive(Clone)]
struct ApiState {
    scheduler: Arc<Scheduler>,
    defaults: CapacityConfig,
}

#[derive(Debug, Serialize)]
struct ApiResponse<T: Serialize> {
    ok: bool,
    data: T,
    generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    ok: bool,
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    approximate_engine: Option<String>,
    approximate_slot_limit: usize,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal(error: impl std::fmt::Display) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: error.to_string(),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ApiErrorBody {
            ok: false,
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        ok: true,
        data,
        generated_at: Utc::now(),
    })
}

pub fn router(config: &Config) -> Router {
    let state = ApiState {
        scheduler: Arc::new(Scheduler::from_config(&config.solver)),
        defaults: config.capacity.as_capacity(),
    };
    build_router(state)
}

fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health))
        .route("/api/optimize", post(optimize))
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(config: Config, addr: SocketAddr) -> Result<()> {
    let app = router(&config);
    info!("slot-optimizer API listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        approximate_engine: state.scheduler.optimizer_name().map(str::to_string),
        approximate_slot_limit: state.scheduler.policy().approximate_slot_limit,
    })
}

async fn optimize(
    State(state): State<ApiState>,
    body: String,
) -> Result<Json<ApiResponse<SelectionResult>>, ApiError> {
    let request = ScheduleRequest::from_json(&body)?;
    let (slots, caps) = request.resolve(state.defaults)?;

    let scheduler = Arc::clone(&state.scheduler);
    let result = tokio::task::spawn_blocking(move || scheduler.solve(&slots, &caps))
        .await
        .map_err(|err| {
            warn!("solve task failed: {err}");
            ApiError::internal(err)
        })?;
    Ok(ok(result))
}
