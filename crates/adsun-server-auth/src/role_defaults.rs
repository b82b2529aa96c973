// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Name-based default permission trees for roles.
//!
//! A role created without an explicit tree (or stored with an empty one) gets
//! the tree of the first tier whose patterns match its name, compared
//! case-insensitively. Unmatched names get the fallback tree.
//!
//! The table is versioned configuration. [`RoleDefaults::builtin`] is the
//! shipped table; deployments may replace it with a TOML file:
//!
//! ```toml
//! version = 2
//!
//! [fallback.dashboard]
//! read = true
//!
//! [[tiers]]
//! name = "warehouse"
//! patterns = ["skladník", "warehouse"]
//!
//! [tiers.permissions.vyroba]
//! read = true
//! sklad = { read = true, write = true }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::permission::PermissionTree;

/// Source of default trees, injected into the resolver.
pub trait RoleTemplates: Send + Sync {
	/// Defaults for a role name.
	fn initialize_defaults(&self, role_name: &str) -> PermissionTree;

	/// Tree used when the role cannot be found at all.
	fn minimal(&self) -> PermissionTree;
}

#[derive(Debug, thiserror::Error)]
pub enum RoleDefaultsError {
	#[error("failed to read role defaults at {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse role defaults: {0}")]
	Parse(#[from] toml::de::Error),

	#[error("invalid role defaults: {0}")]
	Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleTier {
	pub name: String,
	/// Role names (any case) that select this tier.
	pub patterns: Vec<String>,
	pub permissions: PermissionTree,
}

impl RoleTier {
	pub fn matches(&self, role_name: &str) -> bool {
		let wanted = role_name.to_lowercase();
		self
			.patterns
			.iter()
			.any(|pattern| pattern.to_lowercase() == wanted)
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDefaults {
	pub version: u32,
	pub tiers: Vec<RoleTier>,
	pub fallback: PermissionTree,
}

impl RoleDefaults {
	pub const BUILTIN_VERSION: u32 = 1;

	pub fn from_toml_str(content: &str) -> Result<Self, RoleDefaultsError> {
		let defaults: Self = toml::from_str(content)?;
		defaults.validate()?;
		Ok(defaults)
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, RoleDefaultsError> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| RoleDefaultsError::Io {
			path: path.to_path_buf(),
			source: e,
		})?;
		let defaults = Self::from_toml_str(&content)?;
		tracing::info!(
			path = %path.display(),
			version = defaults.version,
			tiers = defaults.tiers.len(),
			"role defaults loaded"
		);
		Ok(defaults)
	}

	fn validate(&self) -> Result<(), RoleDefaultsError> {
		if let Some(tier) = self.tiers.iter().find(|t| t.patterns.is_empty()) {
			return Err(RoleDefaultsError::Invalid(format!(
				"tier '{}' has no name patterns",
				tier.name
			)));
		}
		if self.fallback.is_empty() {
			return Err(RoleDefaultsError::Invalid(
				"fallback tree must grant something".to_string(),
			));
		}
		Ok(())
	}

	/// First tier matching `role_name`.
	pub fn tier_for(&self, role_name: &str) -> Option<&RoleTier> {
		self.tiers.iter().find(|tier| tier.matches(role_name))
	}

	/// The shipped table: administrator, manager, accountant and employee tiers.
	pub fn builtin() -> Self {
		Self {
			version: Self::BUILTIN_VERSION,
			tiers: vec![
				RoleTier {
					name: "administrator".to_string(),
					patterns: patterns(&["administrator", "admin"]),
					permissions: administrator_tree(),
				},
				RoleTier {
					name: "manager".to_string(),
					patterns: patterns(&["manažér", "manager"]),
					permissions: manager_tree(),
				},
				RoleTier {
					name: "accountant".to_string(),
					patterns: patterns(&["účtovník", "accountant"]),
					permissions: accountant_tree(),
				},
				RoleTier {
					name: "employee".to_string(),
					patterns: patterns(&["employee", "zamestnanec"]),
					permissions: employee_tree(),
				},
			],
			fallback: PermissionTree::new().with("dashboard", PermissionTree::with_actions(&["read"])),
		}
	}
}

impl Default for RoleDefaults {
	fn default() -> Self {
		Self::builtin()
	}
}

impl RoleTemplates for RoleDefaults {
	fn initialize_defaults(&self, role_name: &str) -> PermissionTree {
		match self.tier_for(role_name) {
			Some(tier) => {
				tracing::debug!(role = %role_name, tier = %tier.name, "role defaults matched tier");
				tier.permissions.clone()
			}
			None => {
				tracing::debug!(role = %role_name, "no tier matched, using fallback defaults");
				self.fallback.clone()
			}
		}
	}

	fn minimal(&self) -> PermissionTree {
		self.fallback.clone()
	}
}

fn patterns(names: &[&str]) -> Vec<String> {
	names.iter().map(|n| n.to_string()).collect()
}

fn actions(names: &[&str]) -> PermissionTree {
	PermissionTree::with_actions(names)
}

fn dashboard() -> PermissionTree {
	actions(&["read"]).with("statistics", actions(&["read"]))
}

fn administrator_tree() -> PermissionTree {
	PermissionTree::new()
		.with("dashboard", dashboard())
		.with(
			"admin",
			actions(&["read", "write"])
				.with("users", actions(&["read", "write", "delete"]))
				.with("roles", actions(&["read", "write", "delete"]))
				.with("settings", actions(&["read", "write"]))
				.with("logs", actions(&["read"]))
				.with("backups", actions(&["read", "write", "execute"])),
		)
		.with(
			"zakazky",
			actions(&["read", "write", "delete"])
				.with("create", actions(&["read", "write"]))
				.with("edit", actions(&["read", "write", "delete"]))
				.with("management", actions(&["read", "write", "delete", "approve"])),
		)
		.with(
			"vyroba",
			actions(&["read", "write", "delete"])
				.with("sklad", actions(&["read", "write", "delete"]))
				.with("planovanie", actions(&["read", "write"]))
				.with("vyrobky", actions(&["read", "write", "delete"])),
		)
		.with(
			"financie",
			actions(&["read", "write", "delete"])
				.with("faktury", actions(&["read", "write", "delete", "approve"]))
				.with("prijmy", actions(&["read", "write", "delete"]))
				.with("vydavky", actions(&["read", "write", "delete"]))
				.with("mzdy", actions(&["read", "write", "approve"])),
		)
}

fn manager_tree() -> PermissionTree {
	PermissionTree::new()
		.with("dashboard", dashboard())
		.with(
			"admin",
			actions(&["read"])
				.with("users", actions(&["read"]))
				.with("roles", actions(&["read"])),
		)
		.with(
			"zakazky",
			actions(&["read", "write"])
				.with("create", actions(&["read", "write"]))
				.with("edit", actions(&["read", "write"]))
				.with("management", actions(&["read", "write", "approve"])),
		)
		.with(
			"vyroba",
			actions(&["read", "write"])
				.with("sklad", actions(&["read"]))
				.with("planovanie", actions(&["read", "write"])),
		)
		.with(
			"financie",
			actions(&["read"]).with("faktury", actions(&["read", "approve"])),
		)
}

fn accountant_tree() -> PermissionTree {
	PermissionTree::new()
		.with("dashboard", dashboard())
		.with(
			"financie",
			actions(&["read", "write"])
				.with("faktury", actions(&["read", "write", "approve"]))
				.with("prijmy", actions(&["read", "write"]))
				.with("vydavky", actions(&["read", "write"]))
				.with("mzdy", actions(&["read", "write"])),
		)
		.with("zakazky", actions(&["read"]))
}

fn employee_tree() -> PermissionTree {
	PermissionTree::new()
		.with("dashboard", dashboard())
		.with("zakazky", actions(&["read"]))
		.with("vyroba", actions(&["read"]).with("sklad", actions(&["read"])))
}
