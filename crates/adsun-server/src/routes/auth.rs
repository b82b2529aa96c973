// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login and current-user HTTP handlers.

use adsun_server_api::{
	CurrentUserInfo, CurrentUserResponse, ErrorResponse, LoginRequest, LoginResponse, LoginUser,
};
use adsun_server_auth::{CurrentUser, PermissionSource, TokenError};
use axum::{extract::State, Json};

use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

fn source_label(source: PermissionSource) -> &'static str {
	match source {
		PermissionSource::Resolved => "resolved",
		PermissionSource::TokenSnapshot => "token_snapshot",
	}
}

fn current_user_response(user: CurrentUser) -> CurrentUserResponse {
	let is_admin = user.is_admin();
	let tokens = user.tokens().into_iter().collect();
	CurrentUserResponse {
		success: true,
		user: CurrentUserInfo {
			id: user.id.to_string(),
			username: user.username,
			role_name: user.role_name,
			is_admin,
			permission_source: source_label(user.source).to_string(),
		},
		permissions: user.permissions.to_value(),
		tokens,
	}
}

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user and effective permissions", body = CurrentUserResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// GET /api/auth/me - Current user with the effective permission tree.
#[tracing::instrument(skip(current_user), fields(user_id = %current_user.id))]
pub async fn get_current_user(RequireAuth(current_user): RequireAuth) -> Json<CurrentUserResponse> {
	Json(current_user_response(current_user))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token carrying the effective permissions", body = LoginResponse),
        (status = 400, description = "Login or password missing", body = ErrorResponse),
        (status = 401, description = "Unknown account or wrong password", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /api/auth/login - Exchange a username or email and password for a token.
#[tracing::instrument(skip(state, payload))]
pub async fn login(
	State(state): State<AppState>,
	Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
	let (Some(login), Some(password)) = (
		payload.login(),
		payload.password.as_deref().filter(|p| !p.is_empty()),
	) else {
		return Err(ServerError::BadRequest(
			"username or email and password are required".to_string(),
		));
	};

	let effective = state.permissions.authenticate(login, password).await?;
	let claims = state.tokens.claims_for(&effective.user, &effective.permissions);
	let access_token = state
		.tokens
		.issue(&claims)
		.map_err(|e: TokenError| ServerError::Internal(e.to_string()))?;

	let user = effective.user;
	Ok(Json(LoginResponse {
		success: true,
		message: "Login successful".to_string(),
		user: LoginUser {
			id: user.id.to_string(),
			username: user.username,
			email: user.email,
			role_name: user.role_name,
			permissions: effective.permissions.to_value(),
		},
		access_token,
		token_type: "Bearer".to_string(),
		expires_in: claims.exp - claims.iat,
	}))
}
