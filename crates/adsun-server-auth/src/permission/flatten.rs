// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Conversion between a [`PermissionTree`] and the set of granted paths.
//!
//! `flatten` only emits `true` leaves. An explicit `false` leaves no trace in
//! the flattened set, so `unflatten(flatten(t)) == t` holds only for trees
//! without `false` leaves or empty branches.

use std::collections::BTreeSet;

use super::path::PermissionPath;
use super::tree::{GrantNode, PermissionTree};
use crate::error::Result;

/// All paths that end in a `true` grant.
pub fn flatten(tree: &PermissionTree) -> BTreeSet<PermissionPath> {
	let mut out = BTreeSet::new();
	collect(tree, &mut Vec::new(), &mut out);
	out
}

/// [`flatten`], rendered as underscore-joined tokens.
pub fn flatten_tokens(tree: &PermissionTree) -> BTreeSet<String> {
	flatten(tree).iter().map(PermissionPath::to_token).collect()
}

fn collect(tree: &PermissionTree, prefix: &mut Vec<String>, out: &mut BTreeSet<PermissionPath>) {
	for (key, node) in tree.iter() {
		prefix.push(key.clone());
		match node {
			GrantNode::Flag(true) => {
				out.insert(PermissionPath::from_segments(prefix.iter().cloned()));
			}
			GrantNode::Flag(false) => {}
			GrantNode::Branch(child) => collect(child, prefix, out),
		}
		prefix.pop();
	}
}

/// Rebuild a tree in which every given path is granted.
///
/// A shorter grant subsumes any longer path below it: the final segment always
/// overwrites whatever sits at its key with `true`, and a path that would have
/// to walk through an existing `true` flag is dropped. The result does not
/// depend on the order of `paths`.
pub fn unflatten<'a, I>(paths: I) -> PermissionTree
where
	I: IntoIterator<Item = &'a PermissionPath>,
{
	let mut root = PermissionTree::new();
	'paths: for path in paths {
		let Some((last, parents)) = path.segments().split_last() else {
			continue;
		};

		let mut cursor = &mut root;
		for segment in parents {
			let node = cursor
				.0
				.entry(segment.clone())
				.or_insert_with(|| GrantNode::Branch(PermissionTree::new()));
			cursor = match node {
				GrantNode::Branch(child) => child,
				GrantNode::Flag(_) => continue 'paths,
			};
		}

		cursor.0.insert(last.clone(), GrantNode::Flag(true));
	}
	root
}

/// [`unflatten`] from underscore-joined tokens.
pub fn unflatten_tokens<I, S>(tokens: I) -> Result<PermissionTree>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let paths = tokens
		.into_iter()
		.map(|token| PermissionPath::parse(token.as_ref()))
		.collect::<Result<Vec<_>>>()?;
	Ok(unflatten(&paths))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::arb_granting_tree;
	use proptest::prelude::*;
	use serde_json::json;

	fn tokens(tree: &PermissionTree) -> Vec<String> {
		flatten_tokens(tree).into_iter().collect()
	}

	#[test]
	fn emits_true_leaves_with_full_prefix() {
		let tree = PermissionTree::normalize(&json!({
			"admin": { "read": true, "users": { "write": true, "delete": false } },
			"dashboard": { "read": true }
		}))
		.unwrap();

		assert_eq!(
			tokens(&tree),
			vec!["admin_read", "admin_users_write", "dashboard_read"]
		);
	}

	#[test]
	fn explicit_false_is_lost() {
		let tree = PermissionTree::normalize(&json!({ "a": { "read": false } })).unwrap();
		assert!(flatten(&tree).is_empty());
		assert!(unflatten(&flatten(&tree)).is_empty());
	}

	#[test]
	fn top_level_true_flag_is_a_single_segment_token() {
		let tree = PermissionTree::new().grant("dashboard");
		assert_eq!(tokens(&tree), vec!["dashboard"]);
	}

	#[test]
	fn unflatten_builds_nested_grants() {
		let tree = unflatten_tokens(["admin_users_write", "admin_read"]).unwrap();
		assert_eq!(
			tree.to_value(),
			json!({ "admin": { "read": true, "users": { "write": true } } })
		);
	}

	#[test]
	fn shorter_grant_wins_regardless_of_order() {
		let forward = unflatten_tokens(["a", "a_b"]).unwrap();
		let backward = unflatten_tokens(["a_b", "a"]).unwrap();
		assert_eq!(forward, backward);
		assert_eq!(forward.to_value(), json!({ "a": true }));
	}

	#[test]
	fn flag_replaces_a_whole_branch() {
		let tree = unflatten_tokens(["admin_users_write", "admin_read", "admin"]).unwrap();
		assert_eq!(tree.to_value(), json!({ "admin": true }));

		let tree = unflatten_tokens(["admin_users_write", "admin_users", "admin_read"]).unwrap();
		assert_eq!(
			tree.to_value(),
			json!({ "admin": { "read": true, "users": true } })
		);
	}

	#[test]
	fn unflatten_rejects_malformed_tokens() {
		assert!(unflatten_tokens(["admin__read"]).is_err());
	}

	proptest! {
		#[test]
		fn round_trip_for_all_true_trees(tree in arb_granting_tree()) {
			prop_assert_eq!(unflatten(&flatten(&tree)), tree);
		}

		#[test]
		fn flatten_of_unflatten_is_identity_on_paths(
			segments in prop::collection::btree_set(
				prop::collection::vec("[a-z]{1,4}", 1..4),
				0..8,
			)
		) {
			let paths: BTreeSet<PermissionPath> =
				segments.into_iter().map(PermissionPath::from_segments).collect();
			let tree = unflatten(&paths);
			// Paths extending another path are absorbed by the shorter grant.
			let expected: BTreeSet<PermissionPath> = paths
				.iter()
				.filter(|p| {
					!paths.iter().any(|q| {
						q.len() < p.len() && p.segments()[..q.len()] == *q.segments()
					})
				})
				.cloned()
				.collect();
			prop_assert_eq!(flatten(&tree), expected);
		}
	}
}
