// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request-scoped authentication state.
//!
//! ```text
//! Authorization: Bearer <token> → verify → resolve effective tree → AuthContext
//!                                              │
//!                                              ├── per request: stores + RoleResolver + merge
//!                                              └── snapshot:    permissions carried in the token
//! ```
//!
//! Token values are never logged.

use http::header::AUTHORIZATION;
use http::HeaderMap;
use serde::Serialize;
use tracing::instrument;

use crate::decision::{evaluate, is_admin, Decision};
use crate::permission::{flatten_tokens, PermissionPath, PermissionTree};
use crate::service::EffectivePermissions;
use crate::token::TokenClaims;
use crate::types::UserId;

/// Where the effective tree of a [`CurrentUser`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionSource {
	/// Recomputed from the stores for this request.
	Resolved,
	/// Copied from the token claims.
	TokenSnapshot,
}

/// The authenticated principal with its effective permission tree.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
	pub id: UserId,
	pub username: String,
	pub role_name: String,
	pub permissions: PermissionTree,
	pub source: PermissionSource,
}

impl CurrentUser {
	pub fn from_effective(effective: EffectivePermissions) -> Self {
		Self {
			id: effective.user.id,
			username: effective.user.username,
			role_name: effective.user.role_name,
			permissions: effective.permissions,
			source: PermissionSource::Resolved,
		}
	}

	pub fn from_claims(claims: TokenClaims) -> Self {
		Self {
			id: claims.sub,
			username: claims.username,
			role_name: claims.role_name,
			permissions: claims.permissions,
			source: PermissionSource::TokenSnapshot,
		}
	}

	pub fn decide(&self, required: &PermissionPath) -> Decision {
		evaluate(&self.permissions, required, &self.role_name)
	}

	pub fn is_authorized(&self, required: &PermissionPath) -> bool {
		self.decide(required).is_granted()
	}

	pub fn is_admin(&self) -> bool {
		is_admin(&self.permissions, &self.role_name)
	}

	pub fn tokens(&self) -> std::collections::BTreeSet<String> {
		flatten_tokens(&self.permissions)
	}
}

/// Authentication state stored in request extensions.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub is_authenticated: bool,
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self::default()
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
		}
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	pub fn require_user(&self) -> Result<&CurrentUser, AuthRequired> {
		self.current_user.as_ref().ok_or(AuthRequired)
	}
}

#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("authentication required")]
pub struct AuthRequired;

/// Token from `Authorization: Bearer <token>`, if present and well formed.
#[instrument(level = "trace", skip_all)]
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
	let auth_str = headers.get(AUTHORIZATION)?.to_str().ok()?;
	auth_str
		.strip_prefix("Bearer ")
		.map(str::trim)
		.filter(|token| !token.is_empty())
		.map(str::to_string)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::user::User;
	use http::header::HeaderValue;
	use serde_json::json;

	fn headers(value: &str) -> HeaderMap {
		let mut headers = HeaderMap::new();
		headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
		headers
	}

	mod bearer {
		use super::*;

		#[test]
		fn extracts_token() {
			assert_eq!(extract_bearer_token(&headers("Bearer abc.def.ghi")).as_deref(), Some("abc.def.ghi"));
		}

		#[test]
		fn rejects_other_schemes_and_blank_tokens() {
			assert!(extract_bearer_token(&headers("Basic dXNlcjpwYXNz")).is_none());
			assert!(extract_bearer_token(&headers("Bearer    ")).is_none());
			assert!(extract_bearer_token(&headers("bearer abc")).is_none());
			assert!(extract_bearer_token(&HeaderMap::new()).is_none());
		}
	}

	mod current_user {
		use super::*;

		fn effective(role: &str, tree: serde_json::Value) -> EffectivePermissions {
			let permissions = PermissionTree::normalize(&tree).unwrap();
			EffectivePermissions {
				user: User::new("jana", role),
				role_permissions: permissions.clone(),
				permissions,
			}
		}

		#[test]
		fn decisions_use_effective_tree() {
			let user = CurrentUser::from_effective(effective("clerk", json!({ "financie": { "write": true } })));
			let read = PermissionPath::parse("financie_read").unwrap();
			assert_eq!(user.decide(&read), Decision::WriteImpliesRead);
			assert!(!user.is_admin());
			assert_eq!(user.source, PermissionSource::Resolved);
		}

		#[test]
		fn admin_role_is_admin() {
			let user = CurrentUser::from_effective(effective("admin", json!({})));
			assert!(user.is_admin());
		}

		#[test]
		fn claims_snapshot_keeps_permissions() {
			let claims = TokenClaims {
				sub: UserId::generate(),
				username: "peter".to_string(),
				role_name: "employee".to_string(),
				permissions: PermissionTree::new().with("zakazky", PermissionTree::with_actions(&["read"])),
				iat: 0,
				exp: 1,
			};
			let user = CurrentUser::from_claims(claims.clone());
			assert_eq!(user.id, claims.sub);
			assert_eq!(user.source, PermissionSource::TokenSnapshot);
			assert!(user.tokens().contains("zakazky_read"));
		}
	}

	#[test]
	fn context_requires_user() {
		assert!(AuthContext::unauthenticated().require_user().is_err());
		assert!(!AuthContext::default().is_authenticated);
	}
}
