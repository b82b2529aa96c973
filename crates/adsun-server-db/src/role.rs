// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role repository for database operations.

use adsun_server_auth::{PermissionError, PermissionTree, Role, RoleId, RoleStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::{parse_id, parse_timestamp, parse_tree};

/// Repository for roles and their default permission trees.
#[derive(Clone)]
pub struct RoleRepository {
	pool: SqlitePool,
}

impl RoleRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a new role.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the name is already used.
	#[tracing::instrument(skip(self, role), fields(role_id = %role.id, name = %role.name))]
	pub async fn create_role(&self, role: &Role) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO roles (id, name, description, permissions, is_system, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(role.id.to_string())
		.bind(&role.name)
		.bind(&role.description)
		.bind(serde_json::to_string(&role.permissions)?)
		.bind(role.is_system as i32)
		.bind(role.created_at.to_rfc3339())
		.bind(role.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, &role.name))?;

		tracing::debug!(role_id = %role.id, name = %role.name, "role created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	pub async fn get_role_by_id(&self, id: &RoleId) -> Result<Option<Role>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, description, permissions, is_system, created_at, updated_at
			FROM roles
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(row_to_role).transpose()
	}

	/// Case-sensitive lookup by name.
	#[tracing::instrument(skip(self))]
	pub async fn get_role_by_name(&self, name: &str) -> Result<Option<Role>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, name, description, permissions, is_system, created_at, updated_at
			FROM roles
			WHERE name = ?
			"#,
		)
		.bind(name)
		.fetch_optional(&self.pool)
		.await?;

		row.as_ref().map(row_to_role).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn list_roles(&self) -> Result<Vec<Role>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, name, description, permissions, is_system, created_at, updated_at
			FROM roles
			ORDER BY name
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_role).collect()
	}

	/// Update name, description and permissions of an existing role.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if no role has this ID and
	/// `DbError::Conflict` if the new name is taken.
	#[tracing::instrument(skip(self, role), fields(role_id = %role.id))]
	pub async fn update_role(&self, role: &Role) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE roles
			SET name = ?, description = ?, permissions = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&role.name)
		.bind(&role.description)
		.bind(serde_json::to_string(&role.permissions)?)
		.bind(role.updated_at.to_rfc3339())
		.bind(role.id.to_string())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, &role.name))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound(format!("role {}", role.id)));
		}
		Ok(())
	}

	/// Replace the stored tree. Concurrent writers overwrite each other.
	#[tracing::instrument(skip(self, permissions), fields(role_id = %id))]
	pub async fn update_role_permissions(
		&self,
		id: &RoleId,
		permissions: &PermissionTree,
	) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE roles
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
			return Err(DbError::NotFound(format!("role {id}")));
		}
		tracing::debug!(role_id = %id, "role permissions replaced");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(role_id = %id))]
	pub async fn delete_role(&self, id: &RoleId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM roles WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}

fn row_to_role(row: &sqlx::sqlite::SqliteRow) -> Result<Role, DbError> {
	let id: String = row.get("id");
	let permissions: String = row.get("permissions");
	let is_system: i32 = row.get("is_system");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Role {
		id: parse_id(&id, "role ID")?,
		name: row.get("name"),
		description: row.get("description"),
		permissions: parse_tree(&permissions)?,
		is_system: is_system != 0,
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}

#[async_trait]
impl RoleStore for RoleRepository {
	async fn find_role_by_id(&self, id: &RoleId) -> Result<Option<Role>, PermissionError> {
		Ok(self.get_role_by_id(id).await?)
	}

	async fn find_role_by_name(&self, name: &str) -> Result<Option<Role>, PermissionError> {
		Ok(self.get_role_by_name(name).await?)
	}

	async fn list_roles(&self) -> Result<Vec<Role>, PermissionError> {
		Ok(self.list_roles().await?)
	}

	async fn create_role(&self, role: &Role) -> Result<(), PermissionError> {
		Ok(self.create_role(role).await?)
	}

	async fn update_role(&self, role: &Role) -> Result<(), PermissionError> {
		match self.update_role(role).await {
			Err(DbError::NotFound(_)) => Err(PermissionError::RoleNotFound(role.id.to_string())),
			other => Ok(other?),
		}
	}

	async fn update_role_permissions(
		&self,
		id: &RoleId,
		permissions: &PermissionTree,
	) -> Result<(), PermissionError> {
		match self.update_role_permissions(id, permissions).await {
			Err(DbError::NotFound(_)) => Err(PermissionError::RoleNotFound(id.to_string())),
			other => Ok(other?),
		}
	}

	async fn delete_role(&self, id: &RoleId) -> Result<bool, PermissionError> {
		Ok(self.delete_role(id).await?)
	}
}
