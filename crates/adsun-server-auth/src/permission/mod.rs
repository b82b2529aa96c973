// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The permission data model and its pure transformations.
//!
//! - [`tree`]: [`PermissionTree`] / [`GrantNode`] and payload normalization
//! - [`path`]: [`PermissionPath`], the segment form of a permission token
//! - [`flatten`]: tree ⇄ set of paths
//! - [`merge`]: user override tree + role tree → effective tree

pub mod flatten;
pub mod merge;
pub mod path;
pub mod tree;

pub use flatten::{flatten, flatten_tokens, unflatten, unflatten_tokens};
pub use merge::merge;
pub use path::PermissionPath;
pub use tree::{GrantNode, PermissionTree};
