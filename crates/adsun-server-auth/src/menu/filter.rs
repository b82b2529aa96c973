// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Menu construction and per-user pruning.
//!
//! Visibility rules:
//!
//! - role `admin` sees the whole menu
//! - an empty tree sees nothing
//! - a category is shown iff `tree[code].read` is `true`
//! - a module under a shown category is kept when the tree has no entry for it
//!   or a `false` flag under its key (both inherit the category grant), or when
//!   its entry has `read: true`; any other explicit entry hides it
//! - a shown category keeps its place even when all of its modules are hidden

use tracing::{debug, instrument};

use super::codes::{category_code, code_or_id, required_permission, subcategory_code};
use super::{Category, MenuNode, MenuNodeKind};
use crate::decision::ADMIN_ROLE;
use crate::permission::{GrantNode, PermissionTree};

/// Turn stored categories into menu nodes.
///
/// Inactive entries are skipped and both levels are ordered by `order`; the
/// sort is stable, so equal orders keep their stored sequence. Entries whose
/// name yields no code are keyed by their id.
pub fn build_menu(categories: &[Category]) -> Vec<MenuNode> {
	let mut active: Vec<&Category> = categories.iter().filter(|c| c.active).collect();
	active.sort_by_key(|c| c.order);

	active
		.into_iter()
		.map(|category| {
			let code = code_or_id(category_code(&category.name), &category.id.into_inner());

			let mut modules: Vec<_> = category.subcategories.iter().filter(|s| s.active).collect();
			modules.sort_by_key(|s| s.order);

			let children = modules
				.into_iter()
				.map(|module| {
					let module_code = code_or_id(subcategory_code(&module.name), &module.id.into_inner());
					MenuNode {
						id: module.id.into_inner(),
						required_permission: required_permission(&code, Some(&module_code)),
						code: module_code,
						name: module.name.clone(),
						icon: module.icon.clone(),
						path: module.path.clone(),
						kind: MenuNodeKind::Module,
						children: None,
					}
				})
				.collect();

			MenuNode {
				id: category.id.into_inner(),
				required_permission: required_permission(&code, None),
				code,
				name: category.name.clone(),
				icon: category.icon.clone(),
				path: None,
				kind: MenuNodeKind::Category,
				children: Some(children),
			}
		})
		.collect()
}

/// Prune `menu` down to what the holder of `tree` may see.
#[instrument(level = "debug", skip(menu, tree), fields(role = %role_name, items = menu.len()))]
pub fn filter_menu(menu: &[MenuNode], tree: &PermissionTree, role_name: &str) -> Vec<MenuNode> {
	if role_name == ADMIN_ROLE {
		return menu.to_vec();
	}
	if tree.is_empty() {
		debug!("empty permission tree, menu hidden");
		return Vec::new();
	}

	menu
		.iter()
		.filter_map(|category| {
			let Some(grants) = tree.branch(&category.code).filter(|g| g.grants_read()) else {
				debug!(category = %category.code, "category hidden");
				return None;
			};

			let children = category.children.as_ref().map(|children| {
				children
					.iter()
					.filter(|child| module_visible(grants, &child.code))
					.cloned()
					.collect()
			});

			Some(MenuNode {
				children,
				..category.clone()
			})
		})
		.collect()
}

fn module_visible(category_grants: &PermissionTree, code: &str) -> bool {
	match category_grants.get(code) {
		None => true,
		Some(GrantNode::Branch(entry)) => entry.grants_read(),
		Some(GrantNode::Flag(false)) => true,
		Some(GrantNode::Flag(true)) => {
			debug!(module = %code, "module entry is not a grant object, hidden");
			false
		}
	}
}
