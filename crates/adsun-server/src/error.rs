// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error type and its HTTP mapping.

use adsun_server_api::ErrorResponse;
use adsun_server_auth::PermissionError;
use adsun_server_db::DbError;
use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	#[error("{0}")]
	BadRequest(String),

	#[error("Authentication required")]
	Unauthorized,

	#[error("Permission denied")]
	Forbidden,

	#[error("Invalid credentials")]
	InvalidCredentials,

	#[error("Account is disabled")]
	AccountDisabled,

	#[error("{0}")]
	NotFound(String),

	/// Detail is logged, never sent to the client.
	#[error("Internal server error: {0}")]
	Internal(String),
}

impl ServerError {
	fn status_and_code(&self) -> (StatusCode, &'static str) {
		match self {
			ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
			ServerError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
			ServerError::Forbidden => (StatusCode::FORBIDDEN, "forbidden"),
			ServerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
			ServerError::AccountDisabled => (StatusCode::FORBIDDEN, "account_disabled"),
			ServerError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
			ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
		}
	}
}

impl From<PermissionError> for ServerError {
	fn from(err: PermissionError) -> Self {
		match err {
			PermissionError::InvalidPermissionFormat(_)
			| PermissionError::InvalidRoleName(_)
			| PermissionError::RoleNameTaken(_)
			| PermissionError::RoleInUse { .. }
			| PermissionError::UserExists(_)
			| PermissionError::InvalidUser(_) => ServerError::BadRequest(err.to_string()),
			PermissionError::RoleNotFound(_) | PermissionError::UserNotFound(_) => {
				ServerError::NotFound(err.to_string())
			}
			PermissionError::PermissionDenied(token) => {
				tracing::warn!(required = %token, "permission denied");
				ServerError::Forbidden
			}
			PermissionError::SystemRoleImmutable(role) => {
				tracing::warn!(role = %role, "attempt to modify system role");
				ServerError::Forbidden
			}
			PermissionError::InvalidCredentials => ServerError::InvalidCredentials,
			PermissionError::AccountDisabled(username) => {
				tracing::info!(username = %username, "login refused for disabled account");
				ServerError::AccountDisabled
			}
			PermissionError::Store(message) | PermissionError::PasswordHash(message) => {
				ServerError::Internal(message)
			}
		}
	}
}

impl From<DbError> for ServerError {
	fn from(err: DbError) -> Self {
		ServerError::Internal(err.to_string())
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, code) = self.status_and_code();
		let message = match &self {
			ServerError::Internal(detail) => {
				tracing::error!(error = %detail, "request failed");
				"Internal server error".to_string()
			}
			other => other.to_string(),
		};
		(status, Json(ErrorResponse::new(code, message))).into_response()
	}
}
