// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use adsun_server_auth::PermissionError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal: {0}")]
	Internal(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
	/// Map a unique-constraint violation to [`DbError::Conflict`] carrying the
	/// conflicting value.
	pub(crate) fn conflict_on_unique(err: sqlx::Error, value: &str) -> Self {
		match &err {
			sqlx::Error::Database(db) if db.is_unique_violation() => {
				DbError::Conflict(value.to_string())
			}
			_ => DbError::Sqlx(err),
		}
	}
}

impl From<DbError> for PermissionError {
	fn from(err: DbError) -> Self {
		match err {
			DbError::Conflict(msg) => PermissionError::RoleNameTaken(msg),
			other => PermissionError::Store(other.to_string()),
		}
	}
}
