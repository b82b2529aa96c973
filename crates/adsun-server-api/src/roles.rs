// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use adsun_server_auth::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A role in API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
	pub id: String,
	pub name: String,
	pub description: Option<String>,
	pub permissions: serde_json::Value,
	pub is_system: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<Role> for RoleResponse {
	fn from(role: Role) -> Self {
		Self {
			id: role.id.to_string(),
			permissions: role.permissions.to_value(),
			name: role.name,
			description: role.description,
			is_system: role.is_system,
			created_at: role.created_at,
			updated_at: role.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleListResponse {
	pub success: bool,
	pub roles: Vec<RoleResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleSuccessResponse {
	pub success: bool,
	pub role: RoleResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct RoleDeletedResponse {
	pub success: bool,
	pub message: String,
}

/// Request to create a role.
///
/// `permissions` wins over `defaultPermissions`; either may be a nested tree
/// or a legacy array of category codes. With neither, the tree is derived from
/// the role name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
	pub name: String,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub permissions: Option<serde_json::Value>,
	#[serde(default)]
	pub default_permissions: Option<serde_json::Value>,
}

impl CreateRoleRequest {
	/// The first permission payload present, in precedence order.
	pub fn permission_payload(&self) -> Option<&serde_json::Value> {
		self
			.permissions
			.as_ref()
			.filter(|v| !v.is_null())
			.or_else(|| self.default_permissions.as_ref().filter(|v| !v.is_null()))
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdateRoleRequest {
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub description: Option<String>,
	#[serde(default)]
	pub permissions: Option<serde_json::Value>,
}

/// Whole-tree replacement for a role or a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdatePermissionsRequest {
	#[serde(alias = "defaultPermissions")]
	pub permissions: serde_json::Value,
}

#[cfg(test)]
mod tests {
	use super::*;
	use adsun_server_auth::PermissionTree;
	use serde_json::json;

	#[test]
	fn test_role_response_uses_camel_case() {
		let tree = PermissionTree::new().with("dashboard", PermissionTree::with_actions(&["read"]));
		let role = Role::new("grafik", tree).system();
		let body = serde_json::to_value(RoleResponse::from(role)).unwrap();
		assert_eq!(body["isSystem"], true);
		assert_eq!(body["permissions"], json!({ "dashboard": { "read": true } }));
		assert!(body.get("createdAt").is_some());
	}

	#[test]
	fn test_permissions_take_precedence_over_defaults() {
		let req: CreateRoleRequest = serde_json::from_value(json!({
			"name": "grafik",
			"permissions": { "a": { "read": true } },
			"defaultPermissions": ["b"]
		}))
		.unwrap();
		assert_eq!(req.permission_payload(), Some(&json!({ "a": { "read": true } })));
	}

	#[test]
	fn test_default_permissions_used_when_permissions_null() {
		let req: CreateRoleRequest = serde_json::from_value(json!({
			"name": "grafik",
			"permissions": null,
			"defaultPermissions": ["b"]
		}))
		.unwrap();
		assert_eq!(req.permission_payload(), Some(&json!(["b"])));
	}

	#[test]
	fn test_no_payload() {
		let req: CreateRoleRequest = serde_json::from_value(json!({ "name": "grafik" })).unwrap();
		assert!(req.permission_payload().is_none());
	}

	#[test]
	fn test_update_accepts_default_permissions_key() {
		let req: UpdatePermissionsRequest =
			serde_json::from_value(json!({ "defaultPermissions": ["zakazky"] })).unwrap();
		assert_eq!(req.permissions, json!(["zakazky"]));

		let req: UpdatePermissionsRequest =
			serde_json::from_value(json!({ "permissions": { "a": { "read": true } } })).unwrap();
		assert_eq!(req.permissions, json!({ "a": { "read": true } }));
	}
}
