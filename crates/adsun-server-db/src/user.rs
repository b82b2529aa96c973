// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository: role assignment and per-user permission overrides.

use adsun_server_auth::{PermissionError, PermissionTree, RoleId, User, UserId, UserStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{parse_id, parse_timestamp, parse_tree};

const USER_COLUMNS: &str = "id, username, email, role_id, role_name, permissions, is_active, \
	password_hash, last_login, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the username or email is already used.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id, username = %user.username))]
	pub async fn create_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, username, email, role_id, role_name, permissions, is_active,
				password_hash, last_login, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.username)
		.bind(&user.email)
		.bind(user.role_id.map(|id| id.to_string()))
		.bind(&user.role_name)
		.bind(serde_json::to_string(&user.permissions)?)
		.bind(user.is_active as i32)
		.bind(&user.password_hash)
		.bind(user.last_login.map(|at| at.to_rfc3339()))
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, &user.username))?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
			.bind(id.to_string())
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_user).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
			.bind(username)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_user).transpose()
	}

	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?"))
			.bind(email)
			.fetch_optional(&self.pool)
			.await?;

		row.as_ref().map(row_to_user).transpose()
	}

	/// All users, newest first.
	#[tracing::instrument(skip(self))]
	pub async fn list_users(&self) -> Result<Vec<User>, DbError> {
		let rows = sqlx::query(&format!(
			"SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC, username"
		))
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_user).collect()
	}

	/// Write back every mutable column of `user`.
	///
	/// # Errors
	/// `DbError::NotFound` for an unknown id, `DbError::Conflict` when the new
	/// username or email is taken.
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn update_user(&self, user: &User) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET username = ?, email = ?, role_id = ?, role_name = ?, permissions = ?,
				is_active = ?, password_hash = ?, last_login = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&user.username)
		.bind(&user.email)
		.bind(user.role_id.map(|id| id.to_string()))
		.bind(&user.role_name)
		.bind(serde_json::to_string(&user.permissions)?)
		.bind(user.is_active as i32)
		.bind(&user.password_hash)
		.bind(user.last_login.map(|at| at.to_rfc3339()))
		.bind(user.updated_at.to_rfc3339())
		.bind(user.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, &user.username))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {}", user.id)));
		}
		tracing::debug!(user_id = %user.id, "user updated");
		Ok(())
	}

	/// Replace the override tree. Concurrent writers overwrite each other.
	#[tracing::instrument(skip(self, permissions), fields(user_id = %id))]
	pub async fn update_user_permissions(
		&self,
		id: &UserId,
		permissions: &PermissionTree,
	) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE users
			SET permissions = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(serde_json::to_string(permissions)?)
		.bind(Utc::now().to_rfc3339())
		.bind(id.to_string())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {id}")));
		}
		tracing::debug!(user_id = %id, "user permissions replaced");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn set_user_active(&self, id: &UserId, active: bool) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ?")
			.bind(active as i32)
			.bind(Utc::now().to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("user {id}")));
		}
		tracing::debug!(user_id = %id, active, "user status changed");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), DbError> {
		sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
			.bind(at.to_rfc3339())
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(())
	}

	/// Returns `false` when no row was deleted.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn delete_user(&self, id: &UserId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM users WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		if deleted {
			tracing::debug!(user_id = %id, "user deleted");
		}
		Ok(deleted)
	}

	/// Users assigned to the role by reference or, for rows that predate role
	/// references, by name.
	#[tracing::instrument(skip(self), fields(role_id = %role_id))]
	pub async fn count_users_with_role(
		&self,
		role_id: &RoleId,
		role_name: &str,
	) -> Result<i64, DbError> {
		let row = sqlx::query(
			r#"
			SELECT COUNT(*) AS count
			FROM users
			WHERE role_id = ? OR role_name = ?
			"#,
		)
		.bind(role_id.to_string())
		.bind(role_name)
		.fetch_one(&self.pool)
		.await?;

		Ok(row.get("count"))
	}
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id: String = row.get("id");
	let role_id: Option<String> = row.get("role_id");
	let permissions: String = row.get("permissions");
	let is_active: i32 = row.get("is_active");
	let last_login: Option<String> = row.get("last_login");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(User {
		id: parse_id(&id, "user ID")?,
		username: row.get("username"),
		email: row.get("email"),
		role_id: role_id
			.as_deref()
			.map(|raw| parse_id(raw, "role ID"))
			.transpose()?,
		role_name: row.get("role_name"),
		permissions: parse_tree(&permissions)?,
		is_active: is_active != 0,
		password_hash: row.get("password_hash"),
		last_login: last_login
			.as_deref()
			.map(|raw| parse_timestamp(raw, "last_login"))
			.transpose()?,
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}

/// Unique violations on `users` become [`PermissionError::UserExists`] rather
/// than the role-name error the blanket conversion produces.
fn user_conflict(err: DbError) -> PermissionError {
	match err {
		DbError::Conflict(name) => PermissionError::UserExists(name),
		other => other.into(),
	}
}

#[async_trait]
impl UserStore for UserRepository {
	async fn find_user_by_id(&self, id: &UserId) -> Result<Option<User>, PermissionError> {
		Ok(self.get_user_by_id(id).await?)
	}

	async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, PermissionError> {
		Ok(self.get_user_by_username(username).await?)
	}

	async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PermissionError> {
		Ok(self.get_user_by_email(email).await?)
	}

	async fn list_users(&self) -> Result<Vec<User>, PermissionError> {
		Ok(self.list_users().await?)
	}

	async fn create_user(&self, user: &User) -> Result<(), PermissionError> {
		self.create_user(user).await.map_err(user_conflict)
	}

	async fn update_user(&self, user: &User) -> Result<(), PermissionError> {
		match self.update_user(user).await {
			Err(DbError::NotFound(_)) => Err(PermissionError::UserNotFound(user.id.to_string())),
			other => other.map_err(user_conflict),
		}
	}

	async fn update_user_permissions(
		&self,
		id: &UserId,
		permissions: &PermissionTree,
	) -> Result<(), PermissionError> {
		match self.update_user_permissions(id, permissions).await {
			Err(DbError::NotFound(_)) => Err(PermissionError::UserNotFound(id.to_string())),
			other => Ok(other?),
		}
	}

	async fn set_user_active(&self, id: &UserId, active: bool) -> Result<(), PermissionError> {
		match self.set_user_active(id, active).await {
			Err(DbError::NotFound(_)) => Err(PermissionError::UserNotFound(id.to_string())),
			other => Ok(other?),
		}
	}

	async fn record_login(&self, id: &UserId, at: DateTime<Utc>) -> Result<(), PermissionError> {
		Ok(self.record_login(id, at).await?)
	}

	async fn delete_user(&self, id: &UserId) -> Result<bool, PermissionError> {
		Ok(self.delete_user(id).await?)
	}

	async fn count_users_with_role(
		&self,
		role_id: &RoleId,
		role_name: &str,
	) -> Result<i64, PermissionError> {
		Ok(self.count_users_with_role(role_id, role_name).await?)
	}
}
