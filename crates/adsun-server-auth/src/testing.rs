// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Test fixtures: proptest strategies and an in-memory store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use proptest::prelude::*;

use crate::error::{PermissionError, Result};
use crate::menu::{Category, MenuStore};
use crate::permission::{GrantNode, PermissionTree};
use crate::role::{Role, RoleStore};
use crate::role_defaults::{RoleDefaults, RoleTemplates};
use crate::types::{RoleId, UserId};
use crate::user::{User, UserStore};

pub fn arb_key() -> impl Strategy<Value = String> {
	"[a-z]{1,6}"
}

/// Arbitrary trees, including `false` leaves and empty branches.
pub fn arb_tree() -> impl Strategy<Value = PermissionTree> {
	let node = any::<bool>()
		.prop_map(GrantNode::Flag)
		.prop_recursive(3, 32, 4, |inner| {
			prop_oneof![
				any::<bool>().prop_map(GrantNode::Flag),
				prop::collection::btree_map(arb_key(), inner, 0..4)
					.prop_map(|m| GrantNode::Branch(PermissionTree(m))),
			]
		});
	prop::collection::btree_map(arb_key(), node, 0..5).prop_map(PermissionTree)
}

/// Trees that survive a flatten/unflatten round trip: only `true` leaves and
/// no empty branches.
pub fn arb_granting_tree() -> impl Strategy<Value = PermissionTree> {
	let node = Just(GrantNode::Flag(true)).prop_recursive(3, 32, 4, |inner| {
		prop_oneof![
			Just(GrantNode::Flag(true)),
			prop::collection::btree_map(arb_key(), inner, 1..4)
				.prop_map(|m| GrantNode::Branch(PermissionTree(m))),
		]
	});
	prop::collection::btree_map(arb_key(), node, 0..5).prop_map(PermissionTree)
}

/// [`RoleDefaults`] that counts how often a tree is synthesized.
pub struct CountingTemplates {
	inner: RoleDefaults,
	calls: AtomicUsize,
}

impl CountingTemplates {
	pub fn new(inner: RoleDefaults) -> Self {
		Self {
			inner,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl RoleTemplates for CountingTemplates {
	fn initialize_defaults(&self, role_name: &str) -> PermissionTree {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.inner.initialize_defaults(role_name)
	}

	fn minimal(&self) -> PermissionTree {
		self.inner.minimal()
	}
}

#[derive(Default)]
struct Tables {
	roles: BTreeMap<RoleId, Role>,
	users: BTreeMap<UserId, User>,
	categories: Vec<Category>,
	fail_next: Option<String>,
}

/// Role, user and menu store backed by maps.
#[derive(Default)]
pub struct MemoryStore {
	tables: Mutex<Tables>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_role(&self, role: Role) {
		self.lock().roles.insert(role.id, role);
	}

	pub fn insert_user(&self, user: User) {
		self.lock().users.insert(user.id, user);
	}

	pub fn role(&self, id: &RoleId) -> Option<Role> {
		self.lock().roles.get(id).cloned()
	}

	pub fn user(&self, id: &UserId) -> Option<User> {
		self.lock().users.get(id).cloned()
	}

	/// Make the next store call fail with [`PermissionError::Store`].
	pub fn fail_next(&self, message: &str) {
		self.lock().fail_next = Some(message.to_string());
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
		self.tables.lock().unwrap()
	}

	fn tables(&self) -> Result<std::sync::MutexGuard<'_, Tables>> {
		let mut tables = self.lock();
		match tables.fail_next.take() {
			Some(message) => Err(PermissionError::Store(message)),
			None => Ok(tables),
		}
	}
}

#[async_trait]
impl RoleStore for MemoryStore {
	async fn find_role_by_id(&self, id: &RoleId) -> Result<Option<Role>> {
		Ok(self.tables()?.roles.get(id).cloned())
	}

	async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>> {
		Ok(self.tables()?.roles.values().find(|r| r.name == name).cloned())
	}

	async fn list_roles(&self) -> Result<Vec<Role>> {
		let mut roles: Vec<Role> = self.tables()?.roles.values().cloned().collect();
		roles.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(roles)
	}

	async fn create_role(&self, role: &Role) -> Result<()> {
		self.tables()?.roles.insert(role.id, role.clone());
		Ok(())
	}

	async fn update_role(&self, role: &Role) -> Result<()> {
		self.tables()?.roles.insert(role.id, role.clone());
		Ok(())
	}

	async fn update_role_permissions(&self, id: &RoleId, permissions: &PermissionTree) -> Result<()> {
		if let Some(role) = self.tables()?.roles.get_mut(id) {
			role.permissions = permissions.clone();
		}
		Ok(())
	}

	async fn delete_role(&self, id: &RoleId) -> Result<bool> {
		Ok(self.tables()?.roles.remove(id).is_some())
	}
}

#[async_trait]
impl UserStore for MemoryStore {
	async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>> {
		Ok(self.tables()?.users.get(id).cloned())
	}

	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
		Ok(self.tables()?.users.values().find(|u| u.username == username).cloned())
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
		Ok(self
			.tables()?
			.users
			.values()
			.find(|u| u.email.as_deref() == Some(email))
			.cloned())
	}

	async fn list_users(&self) -> Result<Vec<User>> {
		let mut users: Vec<User> = self.tables()?.users.values().cloned().collect();
		users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
		Ok(users)
	}

	async fn create_user(&self, user: &User) -> Result<()> {
		let mut tables = self.tables()?;
		let clash = tables.users.values().any(|u| {
			u.username == user.username || (u.email.is_some() && u.email == user.email)
		});
		if clash {
			return Err(PermissionError::UserExists(user.username.clone()));
		}
		tables.users.insert(user.id, user.clone());
		Ok(())
	}

	async fn update_user(&self, user: &User) -> Result<()> {
		let mut tables = self.tables()?;
		if !tables.users.contains_key(&user.id) {
			return Err(PermissionError::UserNotFound(user.id.to_string()));
		}
		tables.users.insert(user.id, user.clone());
		Ok(())
	}

	async fn set_user_active(&self, id: &UserId, active: bool) -> Result<()> {
		match self.tables()?.users.get_mut(id) {
			Some(user) => {
				user.is_active = active;
				Ok(())
			}
			None => Err(PermissionError::UserNotFound(id.to_string())),
		}
	}

	async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<()> {
		if let Some(user) = self.tables()?.users.get_mut(id) {
			user.last_login = Some(at);
		}
		Ok(())
	}

	async fn delete_user(&self, id: &UserId) -> Result<bool> {
		Ok(self.tables()?.users.remove(id).is_some())
	}

	async fn update_user_permissions(&self, id: &UserId, permissions: &PermissionTree) -> Result<()> {
		if let Some(user) = self.tables()?.users.get_mut(id) {
			user.permissions = permissions.clone();
		}
		Ok(())
	}

	async fn count_users_with_role(&self, role_id: &RoleId, role_name: &str) -> Result<i64> {
		let count = self
			.tables()?
			.users
			.values()
			.filter(|u| u.role_id.as_ref() == Some(role_id) || u.role_name == role_name)
			.count();
		Ok(count as i64)
	}
}

#[async_trait]
impl MenuStore for MemoryStore {
	async fn list_active_categories(&self) -> Result<Vec<Category>> {
		let mut categories: Vec<Category> = self
			.tables()?
			.categories
			.iter()
			.filter(|c| c.active)
			.cloned()
			.collect();
		categories.sort_by_key(|c| c.order);
		Ok(categories)
	}

	async fn create_category(&self, category: &Category) -> Result<()> {
		self.tables()?.categories.push(category.clone());
		Ok(())
	}
}
