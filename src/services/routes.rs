use crate::catalog::{self, FunctionGroup};
use crate::services::analytics::{AnalyticsService, FunctionRequest};
use crate::{AnalyticsError, Direction};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::error;

#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub message: String,
    pub data: Option<serde_json::Value>,
}

impl SimpleResponse {
    fn ok(message: impl Into<String>, data: serde_json::Value) -> Json<SimpleResponse> {
        Json(SimpleResponse {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl IntoResponse for AnalyticsError {
    fn into_response(self) -> Response {
        let status = if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!(error = %self, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = SimpleResponse {
            success: false,
            message: self.to_string(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AnalyticsError {
    fn from(rejection: JsonRejection) -> Self {
        AnalyticsError::InvalidRequest(rejection.body_text())
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateSeriesRequest {
    pub length: usize,
    #[serde(default)]
    pub direction: Direction,
    #[serde(default)]
    pub seed: Option<u64>,
}

async fn health_check() -> Json<SimpleResponse> {
    Json(SimpleResponse {
        success: true,
        message: "Time series analytics service is healthy".to_string(),
        data: None,
    })
}

async fn list_functions() -> Json<SimpleResponse> {
    let groups: Vec<serde_json::Value> = FunctionGroup::ALL
        .iter()
        .map(|group| {
            serde_json::json!({
                "group": group,
                "title": group.title(),
                "module": group.module_path(),
                "functions": catalog::catalog().iter().filter(|e| e.group == *group).collect::<Vec<_>>(),
            })
        })
        .collect();

    SimpleResponse::ok("Function catalog", serde_json::json!(groups))
}

async fn function_index() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/x-rst; charset=utf-8")], catalog::render_index())
}

async fn evaluate(
    State(service): State<Arc<AnalyticsService>>,
    payload: Result<Json<FunctionRequest>, JsonRejection>,
) -> Result<Json<SimpleResponse>, AnalyticsError> {
    let Json(request) = payload?;
    let response = service.evaluate(request)?;
    let message = format!("Evaluated {}", response.function);
    Ok(SimpleResponse::ok(message, serde_json::to_value(response)?))
}

async fn generate_series(
    State(service): State<Arc<AnalyticsService>>,
    payload: Result<Json<GenerateSeriesRequest>, JsonRejection>,
) -> Result<Json<SimpleResponse>, AnalyticsError> {
    let Json(request) = payload?;
    let series = service.generate_series(request.length, request.direction, request.seed, Utc::now().date_naive())?;
    Ok(SimpleResponse::ok("Series generated", serde_json::to_value(series)?))
}

pub fn router(service: Arc<AnalyticsService>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/functions", get(list_functions))
        .route("/functions/index.rst", get(function_index))
        .route("/evaluate", post(evaluate))
        .route("/statistics/generate-series", post(generate_series))
        .layer(CorsLayer::permissive())
        .with_state(service)
}
