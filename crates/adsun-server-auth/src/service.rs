// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective permissions and the administrative operations on roles and user
//! overrides.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::instrument;

use crate::decision::{evaluate, Decision};
use crate::error::{PermissionError, Result};
use crate::password;
use crate::permission::{flatten_tokens, merge, PermissionPath, PermissionTree};
use crate::resolver::RoleResolver;
use crate::role::{Role, RoleStore};
use crate::types::{RoleId, UserId};
use crate::user::{User, UserStore};

/// A user together with the tree that applies to them.
#[derive(Debug, Clone)]
pub struct EffectivePermissions {
	pub user: User,
	/// Tree of the user's role after lazy initialization.
	pub role_permissions: PermissionTree,
	/// `merge(user.permissions, role_permissions)`.
	pub permissions: PermissionTree,
}

impl EffectivePermissions {
	pub fn tokens(&self) -> BTreeSet<String> {
		flatten_tokens(&self.permissions)
	}

	pub fn decide(&self, required: &PermissionPath) -> Decision {
		evaluate(&self.permissions, required, &self.user.role_name)
	}

	pub fn is_authorized(&self, required: &PermissionPath) -> bool {
		self.decide(required).is_granted()
	}
}

#[derive(Debug, Clone, Default)]
pub struct NewRole {
	pub name: String,
	pub description: Option<String>,
	/// `None` or an empty tree means "use the name-based defaults".
	pub permissions: Option<PermissionTree>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleUpdate {
	pub name: Option<String>,
	pub description: Option<String>,
	pub permissions: Option<PermissionTree>,
}

/// A back-office account to create. `role_name` that matches no stored role
/// falls back to [`FALLBACK_ROLE`].
#[derive(Debug, Clone, Default)]
pub struct NewUser {
	pub username: String,
	pub email: Option<String>,
	pub password: String,
	pub role_name: Option<String>,
	/// Defaults to active.
	pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
	pub username: Option<String>,
	pub email: Option<String>,
	pub password: Option<String>,
	/// Switches the role only when a role with this name exists.
	pub role_name: Option<String>,
	pub permissions: Option<PermissionTree>,
	pub is_active: Option<bool>,
}

/// Role name given to accounts created without a known role.
pub const FALLBACK_ROLE: &str = "user";

#[derive(Clone)]
pub struct PermissionService {
	roles: Arc<dyn RoleStore>,
	users: Arc<dyn UserStore>,
	resolver: RoleResolver,
}

impl PermissionService {
	pub fn new(roles: Arc<dyn RoleStore>, users: Arc<dyn UserStore>, resolver: RoleResolver) -> Self {
		Self {
			roles,
			users,
			resolver,
		}
	}

	pub fn resolver(&self) -> &RoleResolver {
		&self.resolver
	}

	#[instrument(skip(self), fields(user_id = %user_id))]
	pub async fn effective_permissions(&self, user_id: &UserId) -> Result<EffectivePermissions> {
		let user = self
			.users
			.find_user_by_id(user_id)
			.await?
			.ok_or_else(|| PermissionError::UserNotFound(user_id.to_string()))?;
		self.effective_for(user).await
	}

	pub async fn effective_for(&self, user: User) -> Result<EffectivePermissions> {
		let role_permissions = self
			.resolver
			.resolve_or_minimal(user.role_id.as_ref(), &user.role_name)
			.await?;
		let permissions = merge(&user.permissions, &role_permissions);
		tracing::debug!(
			user_id = %user.id,
			role = %user.role_name,
			overrides = user.permissions.len(),
			"computed effective permissions"
		);
		Ok(EffectivePermissions {
			user,
			role_permissions,
			permissions,
		})
	}

	/// All roles, with empty trees initialized on the way out.
	#[instrument(skip(self))]
	pub async fn list_roles(&self) -> Result<Vec<Role>> {
		let mut roles = Vec::new();
		for role in self.roles.list_roles().await? {
			roles.push(self.resolver.materialize(role).await?);
		}
		Ok(roles)
	}

	#[instrument(skip(self), fields(role_id = %id))]
	pub async fn get_role(&self, id: &RoleId) -> Result<Role> {
		let role = self.find_role(id).await?;
		self.resolver.materialize(role).await
	}

	#[instrument(skip(self, new_role), fields(role = %new_role.name))]
	pub async fn create_role(&self, new_role: NewRole) -> Result<Role> {
		let name = new_role.name.trim();
		if name.is_empty() {
			return Err(PermissionError::InvalidRoleName("name is required".to_string()));
		}
		if self.roles.find_role_by_name(name).await?.is_some() {
			return Err(PermissionError::RoleNameTaken(name.to_string()));
		}

		let permissions = match new_role.permissions {
			Some(tree) if !tree.is_empty() => tree,
			_ => self.resolver.templates().initialize_defaults(name),
		};

		let mut role = Role::new(name, permissions);
		role.description = new_role.description;
		self.roles.create_role(&role).await?;

		tracing::info!(role_id = %role.id, role = %role.name, "role created");
		Ok(role)
	}

	#[instrument(skip(self, update), fields(role_id = %id))]
	pub async fn update_role(&self, id: &RoleId, update: RoleUpdate) -> Result<Role> {
		let mut role = self.find_role(id).await?;
		if role.is_system {
			return Err(PermissionError::SystemRoleImmutable(role.name));
		}

		if let Some(name) = update.name.as_deref().map(str::trim) {
			if name.is_empty() {
				return Err(PermissionError::InvalidRoleName("name cannot be empty".to_string()));
			}
			if name != role.name {
				if let Some(other) = self.roles.find_role_by_name(name).await? {
					if other.id != role.id {
						return Err(PermissionError::RoleNameTaken(name.to_string()));
					}
				}
				role.name = name.to_string();
			}
		}
		if let Some(description) = update.description {
			role.description = Some(description);
		}
		if let Some(permissions) = update.permissions {
			role.permissions = permissions;
		}
		role.updated_at = Utc::now();

		self.roles.update_role(&role).await?;
		tracing::info!(role_id = %role.id, role = %role.name, "role updated");
		Ok(role)
	}

	#[instrument(skip(self), fields(role_id = %id))]
	pub async fn delete_role(&self, id: &RoleId) -> Result<()> {
		let role = self.find_role(id).await?;
		if role.is_system {
			return Err(PermissionError::SystemRoleImmutable(role.name));
		}

		let users = self.users.count_users_with_role(&role.id, &role.name).await?;
		if users > 0 {
			return Err(PermissionError::RoleInUse {
				role: role.name,
				users,
			});
		}

		self.roles.delete_role(&role.id).await?;
		tracing::info!(role_id = %role.id, role = %role.name, "role deleted");
		Ok(())
	}

	/// Replace a role tree. The built-in `admin` role is rejected.
	#[instrument(skip(self, permissions), fields(role_id = %id))]
	pub async fn update_role_permissions(
		&self,
		id: &RoleId,
		permissions: PermissionTree,
	) -> Result<Role> {
		let mut role = self.find_role(id).await?;
		if role.is_protected_admin() {
			tracing::warn!(role_id = %role.id, "refusing to edit admin role permissions");
			return Err(PermissionError::SystemRoleImmutable(role.name));
		}

		self.roles.update_role_permissions(&role.id, &permissions).await?;
		tracing::info!(
			role_id = %role.id,
			role = %role.name,
			grants = flatten_tokens(&permissions).len(),
			"role permissions replaced"
		);
		role.permissions = permissions;
		role.updated_at = Utc::now();
		Ok(role)
	}

	/// Replace a user's override tree and return the new effective permissions.
	#[instrument(skip(self, permissions), fields(user_id = %id))]
	pub async fn update_user_permissions(
		&self,
		id: &UserId,
		permissions: PermissionTree,
	) -> Result<EffectivePermissions> {
		let mut user = self
			.users
			.find_user_by_id(id)
			.await?
			.ok_or_else(|| PermissionError::UserNotFound(id.to_string()))?;

		self.users.update_user_permissions(&user.id, &permissions).await?;
		tracing::info!(
			user_id = %user.id,
			username = %user.username,
			overrides = permissions.len(),
			"user permissions replaced"
		);

		user.permissions = permissions;
		user.updated_at = Utc::now();
		self.effective_for(user).await
	}

	/// Check a login against the stored password hash.
	///
	/// `login` is matched against usernames first, then emails. The password is
	/// checked before the active flag so a disabled account is only reported
	/// to someone who knows its password.
	#[instrument(skip(self, password))]
	pub async fn authenticate(&self, login: &str, password: &str) -> Result<EffectivePermissions> {
		let user = match self.users.find_user_by_username(login).await? {
			Some(user) => Some(user),
			None => {
				self
					.users
					.find_user_by_email(&login.trim().to_lowercase())
					.await?
			}
		};
		let Some(mut user) = user else {
			tracing::info!("login for unknown account");
			return Err(PermissionError::InvalidCredentials);
		};

		let verified = user
			.password_hash
			.as_deref()
			.is_some_and(|hash| password::verify_password(password, hash));
		if !verified {
			tracing::info!(user_id = %user.id, "login with wrong password");
			return Err(PermissionError::InvalidCredentials);
		}
		if !user.is_active {
			tracing::info!(user_id = %user.id, "login to disabled account");
			return Err(PermissionError::AccountDisabled(user.username));
		}

		let now = Utc::now();
		self.users.record_login(&user.id, now).await?;
		user.last_login = Some(now);
		tracing::info!(user_id = %user.id, username = %user.username, "login succeeded");
		self.effective_for(user).await
	}

	#[instrument(skip(self))]
	pub async fn list_users(&self) -> Result<Vec<User>> {
		self.users.list_users().await
	}

	#[instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user(&self, id: &UserId) -> Result<EffectivePermissions> {
		self.effective_permissions(id).await
	}

	/// Create an account. The role tree is resolved at read time, so the new
	/// user starts with no overrides.
	#[instrument(skip(self, new_user), fields(username = %new_user.username))]
	pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
		let username = new_user.username.trim();
		if username.is_empty() {
			return Err(PermissionError::InvalidUser("username is required".to_string()));
		}
		if new_user.password.is_empty() {
			return Err(PermissionError::InvalidUser("password is required".to_string()));
		}
		let email = normalize_email(new_user.email);
		self.ensure_unique(None, Some(username), email.as_deref()).await?;

		let mut user = User::new(username, FALLBACK_ROLE);
		if let Some(role_name) = new_user.role_name.as_deref() {
			match self.roles.find_role_by_name(role_name).await? {
				Some(role) => {
					user.role_id = Some(role.id);
					user.role_name = role.name;
				}
				None => {
					tracing::warn!(role = %role_name, "unknown role, using fallback");
				}
			}
		}
		user.email = email;
		user.is_active = new_user.is_active.unwrap_or(true);
		user.password_hash = Some(password::hash_password(&new_user.password)?);

		self.users.create_user(&user).await?;
		tracing::info!(user_id = %user.id, username = %user.username, role = %user.role_name, "user created");
		Ok(user)
	}

	#[instrument(skip(self, update), fields(user_id = %id))]
	pub async fn update_user(&self, id: &UserId, update: UserUpdate) -> Result<User> {
		let mut user = self.find_user(id).await?;

		let username = update.username.as_deref().map(str::trim);
		if username.is_some_and(str::is_empty) {
			return Err(PermissionError::InvalidUser("username cannot be empty".to_string()));
		}
		let email = update.email.map(|e| normalize_email(Some(e)));
		self
			.ensure_unique(
				Some(&user.id),
				username.filter(|u| *u != user.username),
				email.as_ref().and_then(|e| e.as_deref()).filter(|e| user.email.as_deref() != Some(*e)),
			)
			.await?;

		if let Some(username) = username {
			user.username = username.to_string();
		}
		if let Some(email) = email {
			user.email = email;
		}
		if let Some(active) = update.is_active {
			user.is_active = active;
		}
		if let Some(password) = update.password.filter(|p| !p.is_empty()) {
			user.password_hash = Some(password::hash_password(&password)?);
		}
		if let Some(permissions) = update.permissions {
			user.permissions = permissions;
		}
		if let Some(role_name) = update.role_name.as_deref() {
			match self.roles.find_role_by_name(role_name).await? {
				Some(role) => {
					user.role_id = Some(role.id);
					user.role_name = role.name;
				}
				None => tracing::warn!(role = %role_name, "unknown role, keeping current"),
			}
		}
		user.updated_at = Utc::now();

		self.users.update_user(&user).await?;
		tracing::info!(user_id = %user.id, username = %user.username, "user updated");
		Ok(user)
	}

	#[instrument(skip(self), fields(user_id = %id))]
	pub async fn set_user_active(&self, id: &UserId, active: bool) -> Result<()> {
		self.users.set_user_active(id, active).await?;
		tracing::info!(user_id = %id, active, "user status changed");
		Ok(())
	}

	#[instrument(skip(self), fields(user_id = %id))]
	pub async fn delete_user(&self, id: &UserId) -> Result<()> {
		if !self.users.delete_user(id).await? {
			return Err(PermissionError::UserNotFound(id.to_string()));
		}
		tracing::info!(user_id = %id, "user deleted");
		Ok(())
	}

	/// Reject a username or email held by an account other than `except`.
	async fn ensure_unique(
		&self,
		except: Option<&UserId>,
		username: Option<&str>,
		email: Option<&str>,
	) -> Result<()> {
		let other = |user: &User| except != Some(&user.id);
		if let Some(username) = username {
			if self.users.find_user_by_username(username).await?.is_some_and(|u| other(&u)) {
				return Err(PermissionError::UserExists(username.to_string()));
			}
		}
		if let Some(email) = email {
			if self.users.find_user_by_email(email).await?.is_some_and(|u| other(&u)) {
				return Err(PermissionError::UserExists(email.to_string()));
			}
		}
		Ok(())
	}

	async fn find_user(&self, id: &UserId) -> Result<User> {
		self
			.users
			.find_user_by_id(id)
			.await?
			.ok_or_else(|| PermissionError::UserNotFound(id.to_string()))
	}

	async fn find_role(&self, id: &RoleId) -> Result<Role> {
		self
			.roles
			.find_role_by_id(id)
			.await?
			.ok_or_else(|| PermissionError::RoleNotFound(id.to_string()))
	}
}

/// Trimmed and lowercased; blank means no email.
fn normalize_email(email: Option<String>) -> Option<String> {
	email
		.map(|e| e.trim().to_lowercase())
		.filter(|e| !e.is_empty())
}
