// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The nested permission data structure.
//!
//! Every level maps a key to either a boolean grant or a nested subtree. A
//! category may mix both kinds of member:
//!
//! ```text
//! admin ─┬─ read:  true
//!        ├─ write: false
//!        └─ users ─┬─ read:  true
//!                  └─ write: true
//! ```
//!
//! Whether a key holds a grant or a subtree is decided once, when a raw JSON
//! payload is normalized; code downstream matches on [`GrantNode`] instead of
//! probing value types.

use std::collections::BTreeMap;

use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use super::path::PermissionPath;
use crate::error::{PermissionError, Result};

/// Storage bookkeeping keys stripped from every level during normalization.
pub const METADATA_KEYS: &[&str] = &[
	"_id",
	"__v",
	"createdAt",
	"updatedAt",
	"created_at",
	"updated_at",
];

/// A single value in a [`PermissionTree`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GrantNode {
	Flag(bool),
	Branch(PermissionTree),
}

impl GrantNode {
	pub fn as_flag(&self) -> Option<bool> {
		match self {
			GrantNode::Flag(granted) => Some(*granted),
			GrantNode::Branch(_) => None,
		}
	}

	pub fn as_branch(&self) -> Option<&PermissionTree> {
		match self {
			GrantNode::Branch(tree) => Some(tree),
			GrantNode::Flag(_) => None,
		}
	}

	/// `true` only for an explicit `true` leaf.
	pub fn is_granted(&self) -> bool {
		matches!(self, GrantNode::Flag(true))
	}
}

/// Nested map of categories, subcategories and action grants.
///
/// Key order carries no meaning; the tree is evaluated as a set of paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PermissionTree(pub(crate) BTreeMap<String, GrantNode>);

impl PermissionTree {
	pub fn new() -> Self {
		Self(BTreeMap::new())
	}

	/// A tree granting each of `actions` at the top level.
	pub fn with_actions(actions: &[&str]) -> Self {
		actions
			.iter()
			.fold(Self::new(), |tree, action| tree.grant(action))
	}

	/// Builder: set `action` to `true`.
	pub fn grant(mut self, action: &str) -> Self {
		self.0.insert(action.to_string(), GrantNode::Flag(true));
		self
	}

	/// Builder: set `action` to an explicit `false`.
	pub fn deny(mut self, action: &str) -> Self {
		self.0.insert(action.to_string(), GrantNode::Flag(false));
		self
	}

	/// Builder: nest `child` under `key`.
	pub fn with(mut self, key: &str, child: PermissionTree) -> Self {
		self.0.insert(key.to_string(), GrantNode::Branch(child));
		self
	}

	pub fn insert(&mut self, key: impl Into<String>, node: GrantNode) -> Option<GrantNode> {
		self.0.insert(key.into(), node)
	}

	pub fn remove(&mut self, key: &str) -> Option<GrantNode> {
		self.0.remove(key)
	}

	pub fn get(&self, key: &str) -> Option<&GrantNode> {
		self.0.get(key)
	}

	pub fn branch(&self, key: &str) -> Option<&PermissionTree> {
		self.get(key).and_then(GrantNode::as_branch)
	}

	pub fn flag(&self, key: &str) -> Option<bool> {
		self.get(key).and_then(GrantNode::as_flag)
	}

	/// `read` is an explicit `true` at this level.
	pub fn grants_read(&self) -> bool {
		self.flag("read") == Some(true)
	}

	/// Walk `path` segment by segment.
	pub fn get_path(&self, path: &PermissionPath) -> Option<&GrantNode> {
		let (last, parents) = path.segments().split_last()?;
		let mut cursor = self;
		for segment in parents {
			cursor = cursor.branch(segment)?;
		}
		cursor.get(last)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &GrantNode)> {
		self.0.iter()
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// Validate and canonicalize a raw tree payload.
	///
	/// Rejects anything that is not a JSON object. Metadata keys are removed at
	/// every depth, and values that are neither booleans nor objects are dropped
	/// since they carry no grant.
	pub fn normalize(raw: &Value) -> Result<Self> {
		match raw {
			Value::Object(map) => Ok(Self::from_object(map)),
			other => Err(PermissionError::InvalidPermissionFormat(format!(
				"expected an object, found {}",
				value_kind(other)
			))),
		}
	}

	/// Accept either a nested tree or the legacy flat array of category codes.
	pub fn from_payload(raw: &Value) -> Result<Self> {
		let Value::Array(items) = raw else {
			return Self::normalize(raw);
		};

		let codes = items
			.iter()
			.map(|item| {
				item.as_str().ok_or_else(|| {
					PermissionError::InvalidPermissionFormat(format!(
						"category code list may only contain strings, found {}",
						value_kind(item)
					))
				})
			})
			.collect::<Result<Vec<_>>>()?;

		Ok(Self::from_category_codes(codes))
	}

	/// Legacy shape: each code becomes `{ read: true, write: false }`.
	pub fn from_category_codes<I, S>(codes: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		codes
			.into_iter()
			.map(|code| code.as_ref().trim().to_string())
			.filter(|code| !code.is_empty())
			.fold(Self::new(), |tree, code| {
				tree.with(&code, Self::new().grant("read").deny("write"))
			})
	}

	pub fn to_value(&self) -> Value {
		Value::Object(
			self.0
				.iter()
				.map(|(key, node)| {
					let value = match node {
						GrantNode::Flag(granted) => Value::Bool(*granted),
						GrantNode::Branch(child) => child.to_value(),
					};
					(key.clone(), value)
				})
				.collect(),
		)
	}

	fn from_object(map: &Map<String, Value>) -> Self {
		let mut tree = Self::new();
		for (key, value) in map {
			if METADATA_KEYS.contains(&key.as_str()) {
				continue;
			}
			match value {
				Value::Bool(granted) => {
					tree.0.insert(key.clone(), GrantNode::Flag(*granted));
				}
				Value::Object(child) => {
					tree
						.0
						.insert(key.clone(), GrantNode::Branch(Self::from_object(child)));
				}
				other => {
					trace!(key = %key, kind = value_kind(other), "dropping non-grant value");
				}
			}
		}
		tree
	}
}

impl<'de> Deserialize<'de> for PermissionTree {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = Value::deserialize(deserializer)?;
		Self::normalize(&raw).map_err(de::Error::custom)
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
