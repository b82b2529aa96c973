// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the Adsun back-office HTTP API.
//!
//! Every body carries a `success` flag and uses camelCase field names.

pub mod auth;
pub mod error;
pub mod health;
pub mod menu;
pub mod permissions;
pub mod roles;
pub mod users;

pub use auth::{CurrentUserInfo, CurrentUserResponse, LoginRequest, LoginResponse, LoginUser};
pub use error::ErrorResponse;
pub use health::{HealthResponse, VersionResponse};
pub use menu::{AuthorizedMenuResponse, MenuNodeResponse};
pub use permissions::{
	PermissionCatalogueEntry, PermissionCatalogueResponse, PermissionTemplateChild,
	PermissionTemplateEntry, PermissionTemplatesResponse,
};
pub use roles::{
	CreateRoleRequest, RoleDeletedResponse, RoleListResponse, RoleResponse, RoleSuccessResponse,
	UpdatePermissionsRequest, UpdateRoleRequest,
};
pub use users::{
	CreateUserRequest, UpdateUserRequest, UpdateUserStatusRequest, UserDeletedResponse, UserDetail,
	UserDetailResponse, UserListResponse, UserPermissionsResponse, UserStatus, UserStatusResponse,
	UserSuccessResponse, UserSummary,
};
