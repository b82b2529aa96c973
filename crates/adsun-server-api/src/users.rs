// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use adsun_server_auth::{EffectivePermissions, User};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Override tree, role tree, the merged result and its grant tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserPermissionsResponse {
	pub success: bool,
	pub user_id: String,
	pub username: String,
	pub role_name: String,
	pub permissions: serde_json::Value,
	pub role_permissions: serde_json::Value,
	pub effective_permissions: serde_json::Value,
	pub tokens: Vec<String>,
}

impl From<EffectivePermissions> for UserPermissionsResponse {
	fn from(effective: EffectivePermissions) -> Self {
		Self {
			success: true,
			tokens: effective.tokens().into_iter().collect(),
			user_id: effective.user.id.to_string(),
			permissions: effective.user.permissions.to_value(),
			role_permissions: effective.role_permissions.to_value(),
			effective_permissions: effective.permissions.to_value(),
			username: effective.user.username,
			role_name: effective.user.role_name,
		}
	}
}

/// One row of the user list. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
	pub id: String,
	pub username: String,
	pub email: Option<String>,
	/// Role name.
	pub role: String,
	pub active: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub last_login: Option<DateTime<Utc>>,
}

impl From<&User> for UserSummary {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.to_string(),
			username: user.username.clone(),
			email: user.email.clone(),
			role: user.role_name.clone(),
			active: user.is_active,
			last_login: user.last_login,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserListResponse {
	pub success: bool,
	pub users: Vec<UserSummary>,
}

/// A single account for the edit form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
	pub id: String,
	pub username: String,
	pub email: Option<String>,
	pub role_name: String,
	pub role_id: Option<String>,
	/// User-specific overrides, the tree `PUT` accepts back.
	pub permissions: serde_json::Value,
	pub effective_permissions: serde_json::Value,
	pub active: bool,
}

impl From<EffectivePermissions> for UserDetail {
	fn from(effective: EffectivePermissions) -> Self {
		let user = effective.user;
		Self {
			id: user.id.to_string(),
			role_id: user.role_id.map(|id| id.to_string()),
			permissions: user.permissions.to_value(),
			effective_permissions: effective.permissions.to_value(),
			active: user.is_active,
			username: user.username,
			email: user.email,
			role_name: user.role_name,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserDetailResponse {
	pub success: bool,
	pub user: UserDetail,
}

/// Returned by create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserSuccessResponse {
	pub success: bool,
	pub message: String,
	pub user: UserDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
	#[serde(default)]
	pub username: String,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub password: String,
	/// Unknown names fall back to the minimal `user` role.
	#[serde(default)]
	pub role_name: Option<String>,
	#[serde(default)]
	pub is_active: Option<bool>,
}

/// Every field is optional; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub password: Option<String>,
	#[serde(default)]
	pub role_name: Option<String>,
	/// Replacement override tree (nested object or legacy code list).
	#[serde(default)]
	pub permissions: Option<serde_json::Value>,
	#[serde(default)]
	pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateUserStatusRequest {
	/// Required; a missing value is rejected with 400.
	#[serde(default)]
	pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserStatus {
	pub id: String,
	pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserStatusResponse {
	pub success: bool,
	pub message: String,
	pub user: UserStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UserDeletedResponse {
	pub success: bool,
	pub message: String,
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_summary_never_carries_the_hash() {
		let user = User::new("jana", "manager").with_password_hash("$argon2id$secret");
		let body = serde_json::to_value(UserSummary::from(&user)).unwrap();
		assert_eq!(body["role"], "manager");
		assert_eq!(body["active"], true);
		assert!(body.get("lastLogin").is_none());
		assert!(!body.to_string().contains("argon2"));
	}

	#[test]
	fn test_status_request_tolerates_missing_field() {
		let req: UpdateUserStatusRequest = serde_json::from_value(json!({})).unwrap();
		assert!(req.active.is_none());
		let req: UpdateUserStatusRequest = serde_json::from_value(json!({ "active": false })).unwrap();
		assert_eq!(req.active, Some(false));
	}

	#[test]
	fn test_create_request_uses_camel_case() {
		let req: CreateUserRequest = serde_json::from_value(json!({
			"username": "jana",
			"password": "x",
			"roleName": "manager",
			"isActive": false
		}))
		.unwrap();
		assert_eq!(req.role_name.as_deref(), Some("manager"));
		assert_eq!(req.is_active, Some(false));
		assert!(req.email.is_none());
	}
}
