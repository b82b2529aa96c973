// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role records and the storage interface for them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::permission::PermissionTree;
use crate::types::RoleId;

/// A named role carrying a default permission tree.
///
/// An empty `permissions` tree means "not initialized yet"; the resolver fills
/// it from name-based defaults on first read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
	pub id: RoleId,
	pub name: String,
	pub description: Option<String>,
	pub permissions: PermissionTree,
	/// System roles cannot be renamed or deleted.
	pub is_system: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Role {
	pub fn new(name: impl Into<String>, permissions: PermissionTree) -> Self {
		let now = Utc::now();
		Self {
			id: RoleId::generate(),
			name: name.into(),
			description: None,
			permissions,
			is_system: false,
			created_at: now,
			updated_at: now,
		}
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn system(mut self) -> Self {
		self.is_system = true;
		self
	}

	/// The built-in `admin` role, whose tree is never editable.
	pub fn is_protected_admin(&self) -> bool {
		self.is_system && self.name == crate::decision::ADMIN_ROLE
	}
}

#[async_trait]
pub trait RoleStore: Send + Sync {
	async fn find_role_by_id(&self, id: &RoleId) -> Result<Option<Role>>;
	/// Exact, case-sensitive name lookup.
	async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>>;
	/// All roles ordered by name.
	async fn list_roles(&self) -> Result<Vec<Role>>;
	async fn create_role(&self, role: &Role) -> Result<()>;
	/// Persist name, description and permission tree of an existing role.
	async fn update_role(&self, role: &Role) -> Result<()>;
	/// Whole-document replacement of the role tree; last writer wins.
	async fn update_role_permissions(&self, id: &RoleId, permissions: &PermissionTree)
		-> Result<()>;
	async fn delete_role(&self, id: &RoleId) -> Result<bool>;
}
