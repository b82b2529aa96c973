// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization decisions over an effective permission tree.
//!
//! [`evaluate`] runs three tiers in order and stops at the first grant:
//!
//! 1. **Admin bypass**: role name `admin`, or `admin.read` / `admin.write` granted
//! 2. **Exact**: the required path is among the flattened grants
//! 3. **Category fallback** (paths with two or more segments): `tree[category][action]`
//!    is granted, or the action is `read` and `tree[category].write` is granted
//!
//! Explicit `false` leaves never reach tier 2 because flattening drops them;
//! only tier 3 ever looks at a stored flag directly.

use serde::Serialize;
use tracing::instrument;

use crate::error::{PermissionError, Result};
use crate::permission::{flatten, PermissionPath, PermissionTree};

/// Role name that bypasses every check.
pub const ADMIN_ROLE: &str = "admin";

/// Top-level category whose `read`/`write` grants make a tree administrative.
pub const ADMIN_CATEGORY: &str = "admin";

/// Which tier granted access, or [`Decision::Denied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	AdminBypass,
	Exact,
	CategoryGrant,
	WriteImpliesRead,
	Denied,
}

impl Decision {
	pub fn is_granted(self) -> bool {
		!matches!(self, Decision::Denied)
	}
}

/// Role `admin`, or a tree granting `admin.read` or `admin.write`.
pub fn is_admin(tree: &PermissionTree, role_name: &str) -> bool {
	if role_name == ADMIN_ROLE {
		return true;
	}
	tree
		.branch(ADMIN_CATEGORY)
		.map(|admin| admin.flag("read") == Some(true) || admin.flag("write") == Some(true))
		.unwrap_or(false)
}

#[instrument(
    level = "debug",
    skip(tree),
    fields(required = %required, role = %role_name)
)]
pub fn evaluate(tree: &PermissionTree, required: &PermissionPath, role_name: &str) -> Decision {
	let decision = decide(tree, required, role_name);
	tracing::debug!(decision = ?decision, "permission evaluated");
	decision
}

fn decide(tree: &PermissionTree, required: &PermissionPath, role_name: &str) -> Decision {
	if is_admin(tree, role_name) {
		return Decision::AdminBypass;
	}

	if flatten(tree).contains(required) {
		return Decision::Exact;
	}

	let (Some(category), Some(action)) = (required.category(), required.action()) else {
		return Decision::Denied;
	};
	let Some(grants) = tree.branch(category) else {
		return Decision::Denied;
	};

	if grants.flag(action) == Some(true) {
		return Decision::CategoryGrant;
	}
	if action == "read" && grants.flag("write") == Some(true) {
		return Decision::WriteImpliesRead;
	}

	Decision::Denied
}

pub fn is_authorized(tree: &PermissionTree, required: &PermissionPath, role_name: &str) -> bool {
	evaluate(tree, required, role_name).is_granted()
}

/// [`evaluate`], with a negative decision turned into [`PermissionError::PermissionDenied`].
pub fn authorize(
	tree: &PermissionTree,
	required: &PermissionPath,
	role_name: &str,
) -> Result<Decision> {
	match evaluate(tree, required, role_name) {
		Decision::Denied => Err(PermissionError::PermissionDenied(required.to_token())),
		granted => Ok(granted),
	}
}
