// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Navigation menu built from stored categories and pruned per user.

pub mod codes;
pub mod filter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::permission::PermissionPath;
use crate::types::{CategoryId, SubcategoryId};

pub use codes::{category_code, normalize_name_to_code, required_permission, subcategory_code};
pub use filter::{build_menu, filter_menu};

/// A stored top-level menu category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
	pub id: CategoryId,
	pub name: String,
	pub icon: Option<String>,
	pub order: i64,
	pub active: bool,
	pub subcategories: Vec<Subcategory>,
}

impl Category {
	pub fn new(name: impl Into<String>, order: i64) -> Self {
		Self {
			id: CategoryId::generate(),
			name: name.into(),
			icon: None,
			order,
			active: true,
			subcategories: Vec::new(),
		}
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub fn with_subcategory(mut self, subcategory: Subcategory) -> Self {
		self.subcategories.push(subcategory);
		self
	}

	pub fn inactive(mut self) -> Self {
		self.active = false;
		self
	}
}

/// A module page under a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subcategory {
	pub id: SubcategoryId,
	pub name: String,
	pub path: Option<String>,
	pub icon: Option<String>,
	pub order: i64,
	pub active: bool,
}

impl Subcategory {
	pub fn new(name: impl Into<String>, path: impl Into<String>, order: i64) -> Self {
		Self {
			id: SubcategoryId::generate(),
			name: name.into(),
			path: Some(path.into()),
			icon: None,
			order,
			active: true,
		}
	}

	pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
		self.icon = Some(icon.into());
		self
	}

	pub fn inactive(mut self) -> Self {
		self.active = false;
		self
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuNodeKind {
	Category,
	Module,
}

/// One entry of the menu sent to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuNode {
	pub id: Uuid,
	pub code: String,
	pub name: String,
	pub icon: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<String>,
	#[serde(rename = "type")]
	pub kind: MenuNodeKind,
	pub required_permission: PermissionPath,
	/// `Some` (possibly empty) for categories, `None` for modules.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub children: Option<Vec<MenuNode>>,
}

#[async_trait]
pub trait MenuStore: Send + Sync {
	/// Active categories ordered by `order`, each with all of its subcategories.
	async fn list_active_categories(&self) -> Result<Vec<Category>>;
	async fn create_category(&self, category: &Category) -> Result<()>;
}
