// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role administration HTTP handlers.

use adsun_server_api::{
	CreateRoleRequest, ErrorResponse, RoleDeletedResponse, RoleListResponse, RoleResponse,
	RoleSuccessResponse, UpdatePermissionsRequest, UpdateRoleRequest,
};
use adsun_server_auth::{NewRole, PermissionTree, RoleId, RoleUpdate};
use axum::{
	extract::{Path, State},
	http::StatusCode,
	Json,
};

use super::parse_id;
use crate::{api::AppState, auth_middleware::RequireAuth, error::ServerError};

fn role_body(role: adsun_server_auth::Role) -> Json<RoleSuccessResponse> {
	Json(RoleSuccessResponse {
		success: true,
		role: RoleResponse::from(role),
	})
}

#[utoipa::path(
    get,
    path = "/api/admin/roles",
    responses(
        (status = 200, description = "All roles", body = RoleListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Missing admin_roles_read", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/roles - List roles ordered by name.
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn list_roles(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
) -> Result<Json<RoleListResponse>, ServerError> {
	let roles = state.permissions.list_roles().await?;
	Ok(Json(RoleListResponse {
		success: true,
		roles: roles.into_iter().map(RoleResponse::from).collect(),
	}))
}

#[utoipa::path(
    get,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role", body = RoleSuccessResponse),
        (status = 400, description = "Malformed role ID", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// GET /api/admin/roles/{id}
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn get_role(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<RoleSuccessResponse>, ServerError> {
	let id: RoleId = parse_id(&id, "role")?;
	let role = state.permissions.get_role(&id).await?;
	Ok(role_body(role))
}

#[utoipa::path(
    post,
    path = "/api/admin/roles",
    request_body = CreateRoleRequest,
    responses(
        (status = 201, description = "Role created", body = RoleSuccessResponse),
        (status = 400, description = "Invalid name, duplicate name or malformed tree", body = ErrorResponse),
        (status = 403, description = "Missing admin_roles_write", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// POST /api/admin/roles - Create a role. Without a tree, defaults come from the name.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id, role = %payload.name))]
pub async fn create_role(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Json(payload): Json<CreateRoleRequest>,
) -> Result<(StatusCode, Json<RoleSuccessResponse>), ServerError> {
	let permissions = payload
		.permission_payload()
		.map(PermissionTree::from_payload)
		.transpose()?;

	let role = state
		.permissions
		.create_role(NewRole {
			name: payload.name,
			description: payload.description,
			permissions,
		})
		.await?;

	tracing::info!(role_id = %role.id, by = %current_user.username, "role created via API");
	Ok((StatusCode::CREATED, role_body(role)))
}

#[utoipa::path(
    put,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleSuccessResponse),
        (status = 400, description = "Invalid name or malformed tree", body = ErrorResponse),
        (status = 403, description = "System role or missing admin_roles_write", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// PUT /api/admin/roles/{id} - Update name, description or tree of a custom role.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id))]
pub async fn update_role(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<RoleSuccessResponse>, ServerError> {
	let id: RoleId = parse_id(&id, "role")?;
	let permissions = payload
		.permissions
		.as_ref()
		.filter(|v| !v.is_null())
		.map(PermissionTree::from_payload)
		.transpose()?;

	let role = state
		.permissions
		.update_role(
			&id,
			RoleUpdate {
				name: payload.name,
				description: payload.description,
				permissions,
			},
		)
		.await?;

	tracing::info!(role_id = %role.id, by = %current_user.username, "role updated via API");
	Ok(role_body(role))
}

#[utoipa::path(
    delete,
    path = "/api/admin/roles/{id}",
    params(("id" = String, Path, description = "Role ID")),
    responses(
        (status = 200, description = "Role deleted", body = RoleDeletedResponse),
        (status = 400, description = "Role is still assigned to users", body = ErrorResponse),
        (status = 403, description = "System role or missing admin_roles_write", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// DELETE /api/admin/roles/{id}
#[tracing::instrument(skip(state, current_user), fields(user_id = %current_user.id))]
pub async fn delete_role(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<RoleDeletedResponse>, ServerError> {
	let id: RoleId = parse_id(&id, "role")?;
	state.permissions.delete_role(&id).await?;

	tracing::info!(role_id = %id, by = %current_user.username, "role deleted via API");
	Ok(Json(RoleDeletedResponse {
		success: true,
		message: "Role deleted".to_string(),
	}))
}

#[utoipa::path(
    patch,
    path = "/api/admin/roles/{id}/permissions",
    params(("id" = String, Path, description = "Role ID")),
    request_body = UpdatePermissionsRequest,
    responses(
        (status = 200, description = "Role tree replaced", body = RoleSuccessResponse),
        (status = 400, description = "Malformed tree", body = ErrorResponse),
        (status = 403, description = "Admin role or missing admin_roles_write", body = ErrorResponse),
        (status = 404, description = "Role not found", body = ErrorResponse)
    ),
    tag = "admin"
)]
/// PATCH /api/admin/roles/{id}/permissions - Replace the whole role tree.
#[tracing::instrument(skip(state, current_user, payload), fields(user_id = %current_user.id))]
pub async fn update_role_permissions(
	RequireAuth(current_user): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	Json(payload): Json<UpdatePermissionsRequest>,
) -> Result<Json<RoleSuccessResponse>, ServerError> {
	let id: RoleId = parse_id(&id, "role")?;
	let tree = PermissionTree::from_payload(&payload.permissions)?;
	let role = state.permissions.update_role_permissions(&id, tree).await?;

	tracing::info!(role_id = %role.id, by = %current_user.username, "role permissions replaced via API");
	Ok(role_body(role))
}
