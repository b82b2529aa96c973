// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserInfo {
	pub id: String,
	pub username: String,
	pub role_name: String,
	pub is_admin: bool,
	/// `resolved` or `token_snapshot`.
	pub permission_source: String,
}

/// Principal, its effective tree and the flattened grant tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CurrentUserResponse {
	pub success: bool,
	pub user: CurrentUserInfo,
	pub permissions: serde_json::Value,
	pub tokens: Vec<String>,
}

/// Either `username` or `email` identifies the account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct LoginRequest {
	#[serde(default)]
	pub username: Option<String>,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default)]
	pub password: Option<String>,
}

impl LoginRequest {
	/// `email` takes precedence; blank values count as missing.
	pub fn login(&self) -> Option<&str> {
		[self.email.as_deref(), self.username.as_deref()]
			.into_iter()
			.flatten()
			.map(str::trim)
			.find(|value| !value.is_empty())
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LoginUser {
	pub id: String,
	pub username: String,
	pub email: Option<String>,
	pub role_name: String,
	/// Effective tree at login.
	pub permissions: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
	pub success: bool,
	pub message: String,
	pub user: LoginUser,
	pub access_token: String,
	/// Always `Bearer`.
	pub token_type: String,
	/// Seconds until the token expires.
	pub expires_in: i64,
}
