// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Health and version HTTP handlers.

use adsun_server_api::{HealthResponse, VersionResponse};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{api::AppState, version};

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server and database are reachable", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Liveness plus a database round trip.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	let timestamp = chrono::Utc::now().to_rfc3339();
	match sqlx::query("SELECT 1").execute(&state.pool).await {
		Ok(_) => (
			StatusCode::OK,
			Json(HealthResponse {
				success: true,
				message: "Server is running".to_string(),
				timestamp,
				database: "ok".to_string(),
			}),
		),
		Err(e) => {
			tracing::error!(error = %e, "database health check failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(HealthResponse {
					success: false,
					message: "Database unavailable".to_string(),
					timestamp,
					database: "unavailable".to_string(),
				}),
			)
		}
	}
}

#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Build information", body = VersionResponse)
    ),
    tag = "health"
)]
/// GET /version - Package name and version.
pub async fn version() -> Json<VersionResponse> {
	Json(VersionResponse {
		success: true,
		name: version::NAME.to_string(),
		version: version::VERSION.to_string(),
	})
}
