// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Effective permissions: user-specific overrides layered over the role tree.

use super::tree::{GrantNode, PermissionTree};

/// Deep-merge `user` over `role`.
///
/// Where both sides hold a subtree the merge recurses. Every other conflict is
/// won by the user side, including a flag on one side and a subtree on the
/// other. Keys present on only one side are copied unchanged.
pub fn merge(user: &PermissionTree, role: &PermissionTree) -> PermissionTree {
	let mut merged = role.clone();
	for (key, user_node) in user.iter() {
		let node = match (merged.get(key), user_node) {
			(Some(GrantNode::Branch(role_branch)), GrantNode::Branch(user_branch)) => {
				GrantNode::Branch(merge(user_branch, role_branch))
			}
			_ => user_node.clone(),
		};
		merged.insert(key.clone(), node);
	}
	merged
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::permission::{flatten, PermissionPath};
	use crate::testing::arb_tree;
	use proptest::prelude::*;
	use serde_json::json;

	fn tree(value: serde_json::Value) -> PermissionTree {
		PermissionTree::normalize(&value).unwrap()
	}

	#[test]
	fn user_false_overrides_role_true() {
		let user = tree(json!({ "admin": { "read": false } }));
		let role = tree(json!({ "admin": { "read": true, "write": true } }));

		let merged = merge(&user, &role);
		let admin = merged.branch("admin").unwrap();
		assert_eq!(admin.flag("read"), Some(false));
		assert_eq!(admin.flag("write"), Some(true));
	}

	#[test]
	fn nested_branches_merge_recursively() {
		let user = tree(json!({ "financie": { "faktury": { "approve": true } } }));
		let role = tree(json!({ "financie": { "read": true, "faktury": { "read": true } } }));

		assert_eq!(
			merge(&user, &role).to_value(),
			json!({ "financie": { "read": true, "faktury": { "read": true, "approve": true } } })
		);
	}

	#[test]
	fn user_flag_replaces_role_branch() {
		let user = tree(json!({ "vyroba": true }));
		let role = tree(json!({ "vyroba": { "read": true } }));
		assert_eq!(merge(&user, &role).to_value(), json!({ "vyroba": true }));
	}

	#[test]
	fn inputs_are_untouched() {
		let user = tree(json!({ "admin": { "read": false } }));
		let role = tree(json!({ "admin": { "read": true } }));
		let (user_before, role_before) = (user.clone(), role.clone());

		let _ = merge(&user, &role);
		assert_eq!(user, user_before);
		assert_eq!(role, role_before);
	}

	proptest! {
		#[test]
		fn empty_sides_are_identities(t in arb_tree()) {
			prop_assert_eq!(merge(&t, &PermissionTree::new()), t.clone());
			prop_assert_eq!(merge(&PermissionTree::new(), &t), t);
		}

		#[test]
		fn merge_is_idempotent(t in arb_tree()) {
			prop_assert_eq!(merge(&t, &t), t);
		}

		#[test]
		fn every_user_leaf_survives(user in arb_tree(), role in arb_tree()) {
			let merged = merge(&user, &role);
			for path in flatten(&user) {
				prop_assert!(merged.get_path(&path).is_some_and(GrantNode::is_granted));
			}
			assert_false_leaves_survive(&user, &merged, &mut Vec::new())?;
		}
	}

	fn assert_false_leaves_survive(
		user: &PermissionTree,
		merged: &PermissionTree,
		prefix: &mut Vec<String>,
	) -> Result<(), TestCaseError> {
		for (key, node) in user.iter() {
			prefix.push(key.clone());
			match node {
				GrantNode::Flag(false) => {
					let path = PermissionPath::from_segments(prefix.iter().cloned());
					prop_assert_eq!(merged.get_path(&path), Some(&GrantNode::Flag(false)));
				}
				GrantNode::Branch(child) => assert_false_leaves_survive(child, merged, prefix)?,
				GrantNode::Flag(true) => {}
			}
			prefix.pop();
		}
		Ok(())
	}
}
