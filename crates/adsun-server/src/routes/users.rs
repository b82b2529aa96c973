// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User administration and per-user permission overrides.

use adsun_server_api::{
	CreateUserRequest, ErrorResponse, UpdatePermissionsRequest, UpdateUserRequest,
	UpdateUserStatusRequest, UserDeletedResponse, UserDetailResponse, UserListResponse,
	UserPermissionsResponse, UserStatus, UserStatusResponse, UserSuccessResponse, UserSummary,
};
use adsun_server_auth::{NewUser, PermissionTree, UserId, UserUpdate};
use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};

use super::parse_id;
use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}/permissions",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Override, role and effective trees", body = UserPermissionsResponse),
        (status = 403, description = "Missing admin_users_read", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/users/{id}/permissions
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_user_permissions(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<UserPermissionsResponse>, ServerError> {
	let id: UserId = parse_id(&id, "user")?;
	let effective = state.permissions.effective_permissions(&id).await?;
	Ok(Json(effective.into()))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/permissions",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Overrides replaced", body = UserPermissionsResponse),
        (status = 400, description = "Malformed tree", body = ErrorResponse),
        (status = 403, description = "Missing admin_users_write", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// PATCH /api/admin/users/{id}/permissions - Replace the user's override tree.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id))]
pub async fn update_user_permissions(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(payload): Json<UpdatePermissionsRequest>,
) -> Result<Json<UserPermissionsResponse>, ServerError> {
	let id: UserId = parse_id(&id, "user")?;
	let tree = PermissionTree::from_payload(&payload.permissions)?;
	let effective = state.permissions.update_user_permissions(&id, tree).await?;

	tracing::info!(target_user = %id, by = %current_user.username, "user overrides replaced via API");
	Ok(Json(effective.into()))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All accounts, newest first", body = UserListResponse),
        (status = 403, description = "Missing admin_users_read", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/users
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_users(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ServerError> {
	let users = state.permissions.list_users().await?;
	Ok(Json(UserListResponse {
		success: true,
		users: users.iter().map(UserSummary::from).collect(),
	}))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Account with override and effective trees", body = UserDetailResponse),
        (status = 403, description = "Missing admin_users_read", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/users/{id}
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<UserDetailResponse>, ServerError> {
	let id: UserId = parse_id(&id, "user")?;
	let effective = state.permissions.get_user(&id).await?;
	Ok(Json(UserDetailResponse {
		success: true,
		user: effective.into(),
	}))
}

#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserSuccessResponse),
        (status = 400, description = "Missing fields, or username or email taken", body = ErrorResponse),
        (status = 403, description = "Missing admin_users_write", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// POST /api/admin/users - Create an account. An unknown role name yields the minimal `user` role.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id, username = %payload.username))]
pub async fn create_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserSuccessResponse>), ServerError> {
	let user = state
		.permissions
		.create_user(NewUser {
			username: payload.username,
			email: payload.email,
			password: payload.password,
			role_name: payload.role_name,
			is_active: payload.is_active,
		})
		.await?;
	let effective = state.permissions.effective_for(user).await?;

	tracing::info!(new_user = %effective.user.id, by = %current_user.username, "user created via API");
	Ok((
		StatusCode::CREATED,
		Json(UserSuccessResponse {
			success: true,
			message: "User created".to_string(),
			user: effective.into(),
		}),
	))
}

#[utoipa::path(
    put,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserSuccessResponse),
        (status = 400, description = "Username or email taken, or malformed tree", body = ErrorResponse),
        (status = 403, description = "Missing admin_users_write", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// PUT /api/admin/users/{id}
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id))]
pub async fn update_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserSuccessResponse>, ServerError> {
	let id: UserId = parse_id(&id, "user")?;
	let permissions = payload
		.permissions
		.as_ref()
		.map(PermissionTree::from_payload)
		.transpose()?;

	let user = state
		.permissions
		.update_user(
			&id,
			UserUpdate {
				username: payload.username,
				email: payload.email,
				password: payload.password,
				role_name: payload.role_name,
				permissions,
				is_active: payload.is_active,
			},
		)
		.await?;
	let effective = state.permissions.effective_for(user).await?;

	tracing::info!(target_user = %id, by = %current_user.username, "user updated via API");
	Ok(Json(UserSuccessResponse {
		success: true,
		message: "User updated".to_string(),
		user: effective.into(),
	}))
}

#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}/status",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UserStatusResponse),
        (status = 400, description = "Missing active flag", body = ErrorResponse),
        (status = 403, description = "Missing admin_users_write", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// PATCH /api/admin/users/{id}/status - Activate or deactivate an account.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id))]
pub async fn update_user_status(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(payload): Json<UpdateUserStatusRequest>,
) -> Result<Json<UserStatusResponse>, ServerError> {
	let id: UserId = parse_id(&id, "user")?;
	let active = payload
		.active
		.ok_or_else(|| ServerError::BadRequest("active flag is required".to_string()))?;

	state.permissions.set_user_active(&id, active).await?;
	tracing::info!(target_user = %id, active, by = %current_user.username, "user status changed via API");

	let message = if active { "User activated" } else { "User deactivated" };
	Ok(Json(UserStatusResponse {
		success: true,
		message: message.to_string(),
		user: UserStatus {
			id: id.to_string(),
			active,
		},
	}))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = UserDeletedResponse),
        (status = 403, description = "Missing admin_users_delete", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// DELETE /api/admin/users/{id}
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn delete_user(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<UserDeletedResponse>, ServerError> {
	let id: UserId = parse_id(&id, "user")?;
	state.permissions.delete_user(&id).await?;

	tracing::info!(target_user = %id, by = %current_user.username, "user deleted via API");
	Ok(Json(UserDeletedResponse {
		success: true,
		message: "User deleted".to_string(),
	}))
}
