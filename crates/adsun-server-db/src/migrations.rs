// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Schema for roles, users and the navigation menu.
//!
//! Permission trees are stored as JSON text. Every statement is idempotent so
//! the migrations run on each start.

use sqlx::sqlite::SqlitePool;

use crate::error::DbError;

const MIGRATIONS: &[(&str, &str)] = &[
	(
		"roles",
		r#"
		CREATE TABLE IF NOT EXISTS roles (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL UNIQUE,
			description TEXT,
			permissions TEXT NOT NULL DEFAULT '{}',
			is_system INTEGER NOT NULL DEFAULT 0,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	),
	(
		"users",
		r#"
		CREATE TABLE IF NOT EXISTS users (
			id TEXT PRIMARY KEY,
			username TEXT NOT NULL UNIQUE,
			email TEXT UNIQUE,
			role_id TEXT REFERENCES roles(id) ON DELETE SET NULL,
			role_name TEXT NOT NULL,
			permissions TEXT NOT NULL DEFAULT '{}',
			is_active INTEGER NOT NULL DEFAULT 1,
			password_hash TEXT,
			last_login TEXT,
			created_at TEXT NOT NULL,
			updated_at TEXT NOT NULL
		)
		"#,
	),
	(
		"idx_users_role",
		"CREATE INDEX IF NOT EXISTS idx_users_role ON users(role_id, role_name)",
	),
	(
		"categories",
		r#"
		CREATE TABLE IF NOT EXISTS categories (
			id TEXT PRIMARY KEY,
			name TEXT NOT NULL,
			icon TEXT,
			sort_order INTEGER NOT NULL DEFAULT 0,
			active INTEGER NOT NULL DEFAULT 1
		)
		"#,
	),
	(
		"subcategories",
		r#"
		CREATE TABLE IF NOT EXISTS subcategories (
			id TEXT PRIMARY KEY,
			category_id TEXT NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
			name TEXT NOT NULL,
			path TEXT,
			icon TEXT,
			sort_order INTEGER NOT NULL DEFAULT 0,
			active INTEGER NOT NULL DEFAULT 1
		)
		"#,
	),
	(
		"idx_subcategories_category",
		"CREATE INDEX IF NOT EXISTS idx_subcategories_category ON subcategories(category_id)",
	),
];

/// Create all tables and indexes that do not exist yet.
#[tracing::instrument(skip(pool))]
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
	for (name, sql) in MIGRATIONS {
		sqlx::query(sql).execute(pool).await?;
		tracing::trace!(migration = name, "applied");
	}
	tracing::info!(count = MIGRATIONS.len(), "database migrations applied");
	Ok(())
}
