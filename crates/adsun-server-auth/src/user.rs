// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Back-office user records and their storage interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::permission::PermissionTree;
use crate::types::{RoleId, UserId};

/// A user account as far as permissions are concerned.
///
/// `permissions` holds only the user-specific overrides; the effective tree is
/// always computed by merging it over the role tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub username: String,
	pub email: Option<String>,
	pub role_id: Option<RoleId>,
	pub role_name: String,
	pub permissions: PermissionTree,
	pub is_active: bool,
	/// Argon2 PHC string. Accounts without one cannot log in with a password.
	#[serde(skip)]
	pub password_hash: Option<String>,
	pub last_login: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	pub fn new(username: impl Into<String>, role_name: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			username: username.into(),
			email: None,
			role_id: None,
			role_name: role_name.into(),
			permissions: PermissionTree::new(),
			is_active: true,
			password_hash: None,
			last_login: None,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn with_role_id(mut self, role_id: RoleId) -> Self {
		self.role_id = Some(role_id);
		self
	}

	pub fn with_permissions(mut self, permissions: PermissionTree) -> Self {
		self.permissions = permissions;
		self
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
		self.password_hash = Some(hash.into());
		self
	}

	pub fn inactive(mut self) -> Self {
		self.is_active = false;
		self
	}
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>>;
	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;
	/// Newest first.
	async fn list_users(&self) -> Result<Vec<User>>;
	/// Fails with [`PermissionError::UserExists`] on a username or email clash.
	///
	/// [`PermissionError::UserExists`]: crate::error::PermissionError::UserExists
	async fn create_user(&self, user: &User) -> Result<()>;
	/// Persist every column of `user` except `created_at`.
	async fn update_user(&self, user: &User) -> Result<()>;
	async fn set_user_active(&self, id: &UserId, active: bool) -> Result<()>;
	async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<()>;
	/// `false` when no such user existed.
	async fn delete_user(&self, id: &UserId) -> Result<bool>;
	/// Whole-document replacement of the override tree; last writer wins.
	async fn update_user_permissions(&self, id: &UserId, permissions: &PermissionTree)
		-> Result<()>;
	/// Users referencing the role either by id or by name.
	async fn count_users_with_role(&self, role_id: &RoleId, role_name: &str) -> Result<i64>;
}
