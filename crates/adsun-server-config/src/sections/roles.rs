// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Role defaults configuration.

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default)]
pub struct RolesConfig {
	/// TOML file replacing the built-in role defaults table.
	pub defaults_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolesConfigLayer {
	#[serde(default)]
	pub defaults_path: Option<PathBuf>,
}

impl RolesConfigLayer {
	pub fn merge(&mut self, other: RolesConfigLayer) {
		if other.defaults_path.is_some() {
			self.defaults_path = other.defaults_path;
		}
	}

	pub fn finalize(self) -> RolesConfig {
		RolesConfig {
			defaults_path: self.defaults_path,
		}
	}
}
