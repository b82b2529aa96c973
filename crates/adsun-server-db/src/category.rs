// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Menu category repository.

use std::collections::HashMap;

use adsun_server_auth::{Category, CategoryId, MenuStore, PermissionError, Subcategory};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::row::parse_id;

#[derive(Clone)]
pub struct CategoryRepository {
	pool: SqlitePool,
}

impl CategoryRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a category together with its subcategories in one transaction.
	#[tracing::instrument(skip(self, category), fields(category_id = %category.id, name = %category.name))]
	pub async fn create_category(&self, category: &Category) -> Result<(), DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO categories (id, name, icon, sort_order, active)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(category.id.to_string())
		.bind(&category.name)
		.bind(&category.icon)
		.bind(category.order)
		.bind(category.active as i32)
		.execute(&mut *tx)
		.await?;

		for sub in &category.subcategories {
			sqlx::query(
				r#"
				INSERT INTO subcategories (id, category_id, name, path, icon, sort_order, active)
				VALUES (?, ?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(sub.id.to_string())
			.bind(category.id.to_string())
			.bind(&sub.name)
			.bind(&sub.path)
			.bind(&sub.icon)
			.bind(sub.order)
			.bind(sub.active as i32)
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;
		tracing::debug!(
			category_id = %category.id,
			subcategories = category.subcategories.len(),
			"category created"
		);
		Ok(())
	}

	/// Active categories ordered by `sort_order`, each carrying all of its
	/// subcategories (active or not) ordered the same way.
	#[tracing::instrument(skip(self))]
	pub async fn list_active_categories(&self) -> Result<Vec<Category>, DbError> {
		let category_rows = sqlx::query(
			r#"
			SELECT id, name, icon, sort_order, active
			FROM categories
			WHERE active = 1
			ORDER BY sort_order, rowid
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let sub_rows = sqlx::query(
			r#"
			SELECT s.id, s.category_id, s.name, s.path, s.icon, s.sort_order, s.active
			FROM subcategories s
			JOIN categories c ON c.id = s.category_id
			WHERE c.active = 1
			ORDER BY s.sort_order, s.rowid
			"#,
		)
		.fetch_all(&self.pool)
		.await?;

		let mut subcategories: HashMap<String, Vec<Subcategory>> = HashMap::new();
		for row in &sub_rows {
			let category_id: String = row.get("category_id");
			subcategories
				.entry(category_id)
				.or_default()
				.push(row_to_subcategory(row)?);
		}

		category_rows
			.iter()
			.map(|row| -> Result<Category, DbError> {
				let id: String = row.get("id");
				let active: i32 = row.get("active");
				Ok(Category {
					id: parse_id(&id, "category ID")?,
					name: row.get("name"),
					icon: row.get("icon"),
					order: row.get("sort_order"),
					active: active != 0,
					subcategories: subcategories.remove(&id).unwrap_or_default(),
				})
			})
			.collect()
	}

	#[tracing::instrument(skip(self))]
	pub async fn count_categories(&self) -> Result<i64, DbError> {
		let row = sqlx::query("SELECT COUNT(*) AS count FROM categories")
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get("count"))
	}

	#[tracing::instrument(skip(self), fields(category_id = %id))]
	pub async fn delete_category(&self, id: &CategoryId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM categories WHERE id = ?")
			.bind(id.to_string())
			.execute(&self.pool)
			.await?;
		Ok(result.rows_affected() > 0)
	}
}

fn row_to_subcategory(row: &sqlx::sqlite::SqliteRow) -> Result<Subcategory, DbError> {
	let id: String = row.get("id");
	let active: i32 = row.get("active");
	Ok(Subcategory {
		id: parse_id(&id, "subcategory ID")?,
		name: row.get("name"),
		path: row.get("path"),
		icon: row.get("icon"),
		order: row.get("sort_order"),
		active: active != 0,
	})
}

#[async_trait]
impl MenuStore for CategoryRepository {
	async fn list_active_categories(&self) -> Result<Vec<Category>, PermissionError> {
		Ok(self.list_active_categories().await?)
	}

	async fn create_category(&self, category: &Category) -> Result<(), PermissionError> {
		Ok(self.create_category(category).await?)
	}
}
