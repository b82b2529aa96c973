// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role identifier → role permission tree.
//!
//! Roles are seeded with empty trees and filled lazily: the first read of an
//! empty role synthesizes its tree from [`RoleTemplates`] and writes it back, so
//! later reads return the stored tree verbatim.

use std::sync::Arc;

use tracing::instrument;

use crate::error::{PermissionError, Result};
use crate::permission::PermissionTree;
use crate::role::{Role, RoleStore};
use crate::role_defaults::RoleTemplates;
use crate::types::RoleId;

#[derive(Clone)]
pub struct RoleResolver {
	roles: Arc<dyn RoleStore>,
	templates: Arc<dyn RoleTemplates>,
}

impl RoleResolver {
	pub fn new(roles: Arc<dyn RoleStore>, templates: Arc<dyn RoleTemplates>) -> Self {
		Self { roles, templates }
	}

	pub fn templates(&self) -> &dyn RoleTemplates {
		self.templates.as_ref()
	}

	/// Tree of the role with exactly this (case-sensitive) name.
	#[instrument(skip(self), fields(role = %role_name))]
	pub async fn resolve(&self, role_name: &str) -> Result<PermissionTree> {
		let role = self
			.roles
			.find_role_by_name(role_name)
			.await?
			.ok_or_else(|| PermissionError::RoleNotFound(role_name.to_string()))?;
		Ok(self.materialize(role).await?.permissions)
	}

	#[instrument(skip(self), fields(role_id = %role_id))]
	pub async fn resolve_by_id(&self, role_id: &RoleId) -> Result<PermissionTree> {
		let role = self
			.roles
			.find_role_by_id(role_id)
			.await?
			.ok_or_else(|| PermissionError::RoleNotFound(role_id.to_string()))?;
		Ok(self.materialize(role).await?.permissions)
	}

	/// Fill an empty role tree from defaults and persist it. Non-empty roles are
	/// returned unchanged.
	pub async fn materialize(&self, mut role: Role) -> Result<Role> {
		if !role.permissions.is_empty() {
			return Ok(role);
		}

		let defaults = self.templates.initialize_defaults(&role.name);
		self.roles.update_role_permissions(&role.id, &defaults).await?;
		tracing::info!(
			role_id = %role.id,
			role = %role.name,
			categories = defaults.len(),
			"initialized empty role permissions from defaults"
		);
		role.permissions = defaults;
		Ok(role)
	}

	/// Role tree for a principal, or the minimal tree when the role is gone.
	///
	/// The id is tried first; principals without one (or with a dangling one)
	/// are looked up by role name. Store failures still propagate.
	#[instrument(skip(self, role_id), fields(role = %role_name))]
	pub async fn resolve_or_minimal(
		&self,
		role_id: Option<&RoleId>,
		role_name: &str,
	) -> Result<PermissionTree> {
		if let Some(id) = role_id {
			match self.resolve_by_id(id).await {
				Err(PermissionError::RoleNotFound(_)) => {}
				other => return other,
			}
		}

		match self.resolve(role_name).await {
			Err(PermissionError::RoleNotFound(_)) => {
				tracing::warn!(role = %role_name, "role not found, using minimal permissions");
				Ok(self.templates.minimal())
			}
			other => other,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::permission::flatten_tokens;
	use crate::role_defaults::RoleDefaults;
	use crate::testing::{CountingTemplates, MemoryStore};
	use serde_json::json;

	fn resolver(store: &Arc<MemoryStore>) -> (RoleResolver, Arc<CountingTemplates>) {
		let templates = Arc::new(CountingTemplates::new(RoleDefaults::builtin()));
		(RoleResolver::new(store.clone(), templates.clone()), templates)
	}

	#[tokio::test]
	async fn non_empty_role_is_returned_verbatim() {
		let store = Arc::new(MemoryStore::new());
		let custom = PermissionTree::new().with("vyroba", PermissionTree::with_actions(&["read"]));
		store.insert_role(Role::new("manager", custom.clone()));
		let (resolver, templates) = resolver(&store);

		assert_eq!(resolver.resolve("manager").await.unwrap(), custom);
		assert_eq!(templates.calls(), 0);
	}

	#[tokio::test]
	async fn empty_role_is_initialized_once_and_persisted() {
		let store = Arc::new(MemoryStore::new());
		let role = Role::new("Manažér", PermissionTree::new());
		let id = role.id;
		store.insert_role(role);
		let (resolver, templates) = resolver(&store);

		let first = resolver.resolve("Manažér").await.unwrap();
		let second = resolver.resolve_by_id(&id).await.unwrap();

		assert_eq!(first, second);
		assert_eq!(templates.calls(), 1);
		assert_eq!(store.role(&id).unwrap().permissions, first);
		assert!(flatten_tokens(&first).contains("zakazky_management_approve"));
	}

	#[tokio::test]
	async fn lookup_by_name_is_case_sensitive() {
		let store = Arc::new(MemoryStore::new());
		store.insert_role(Role::new("manager", PermissionTree::new()));
		let (resolver, _) = resolver(&store);

		let err = resolver.resolve("Manager").await.unwrap_err();
		assert!(matches!(err, PermissionError::RoleNotFound(_)));
	}

	#[tokio::test]
	async fn missing_role_falls_back_to_minimal() {
		let store = Arc::new(MemoryStore::new());
		let (resolver, _) = resolver(&store);

		let tree = resolver
			.resolve_or_minimal(Some(&RoleId::generate()), "ghost")
			.await
			.unwrap();
		assert_eq!(tree.to_value(), json!({ "dashboard": { "read": true } }));
	}

	#[tokio::test]
	async fn dangling_role_id_falls_back_to_name() {
		let store = Arc::new(MemoryStore::new());
		let custom = PermissionTree::new().with("zakazky", PermissionTree::with_actions(&["read"]));
		store.insert_role(Role::new("clerk", custom.clone()));
		let (resolver, _) = resolver(&store);

		let tree = resolver
			.resolve_or_minimal(Some(&RoleId::generate()), "clerk")
			.await
			.unwrap();
		assert_eq!(tree, custom);
	}

	#[tokio::test]
	async fn store_failures_propagate() {
		let store = Arc::new(MemoryStore::new());
		store.fail_next("disk on fire");
		let (resolver, _) = resolver(&store);

		let err = resolver.resolve_or_minimal(None, "employee").await.unwrap_err();
		assert!(matches!(err, PermissionError::Store(_)));
	}
}
