// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI document for the HTTP API.

use adsun_server_api::{
	AuthorizedMenuResponse, CreateRoleRequest, CreateUserRequest, CurrentUserInfo,
	CurrentUserResponse, ErrorResponse, HealthResponse, LoginRequest, LoginResponse, LoginUser,
	MenuNodeResponse, PermissionCatalogueEntry, PermissionCatalogueResponse,
	PermissionTemplateChild, PermissionTemplateEntry, PermissionTemplatesResponse,
	RoleDeletedResponse, RoleListResponse, RoleResponse, RoleSuccessResponse,
	UpdatePermissionsRequest, UpdateRoleRequest, UpdateUserRequest, UpdateUserStatusRequest,
	UserDeletedResponse, UserDetail, UserDetailResponse, UserListResponse, UserPermissionsResponse,
	UserStatus, UserStatusResponse, UserSuccessResponse, UserSummary, VersionResponse,
};
use axum::Json;
use utoipa::OpenApi;

use crate::routes;

#[derive(OpenApi)]
#[openapi(
	info(
		title = "Adsun back-office API",
		description = "Roles, permission trees and the authorized navigation menu"
	),
	paths(
		routes::health::health_check,
		routes::health::version,
		routes::auth::login,
		routes::auth::get_current_user,
		routes::menu::get_authorized_menu,
		routes::roles::list_roles,
		routes::roles::get_role,
		routes::roles::create_role,
		routes::roles::update_role,
		routes::roles::delete_role,
		routes::roles::update_role_permissions,
		routes::permissions::list_permissions,
		routes::permissions::list_permission_templates,
		routes::users::list_users,
		routes::users::get_user,
		routes::users::create_user,
		routes::users::update_user,
		routes::users::update_user_status,
		routes::users::delete_user,
		routes::users::get_user_permissions,
		routes::users::update_user_permissions,
	),
	components(schemas(
		ErrorResponse,
		HealthResponse,
		VersionResponse,
		CurrentUserInfo,
		CurrentUserResponse,
		LoginRequest,
		LoginUser,
		LoginResponse,
		MenuNodeResponse,
		AuthorizedMenuResponse,
		RoleResponse,
		RoleListResponse,
		RoleSuccessResponse,
		RoleDeletedResponse,
		CreateRoleRequest,
		UpdateRoleRequest,
		UpdatePermissionsRequest,
		PermissionCatalogueEntry,
		PermissionCatalogueResponse,
		PermissionTemplateChild,
		PermissionTemplateEntry,
		PermissionTemplatesResponse,
		UserPermissionsResponse,
		UserSummary,
		UserListResponse,
		UserDetail,
		UserDetailResponse,
		UserSuccessResponse,
		CreateUserRequest,
		UpdateUserRequest,
		UpdateUserStatusRequest,
		UserStatus,
		UserStatusResponse,
		UserDeletedResponse,
	)),
	tags(
		(name = "health", description = "Liveness and build information"),
		(name = "auth", description = "Login and current principal"),
		(name = "menu", description = "Permission-filtered navigation"),
		(name = "admin", description = "Role, user and override administration")
	)
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
	Json(ApiDoc::openapi())
}
