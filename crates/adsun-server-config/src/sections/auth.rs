// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and token configuration.

use adsun_common_config::SecretString;
use serde::Deserialize;

const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_TOKEN_TTL_SECS: u64 = 900;

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub environment: String,
	pub token_ttl_secs: u64,
	/// Recompute effective permissions on every request instead of trusting
	/// the snapshot in the token.
	pub resolve_per_request: bool,
	/// HMAC key for bearer tokens. Never read from the config file.
	pub token_secret: Option<SecretString>,
}

impl AuthConfig {
	pub fn is_production(&self) -> bool {
		self.environment.eq_ignore_ascii_case("production")
	}
}

impl Default for AuthConfig {
	fn default() -> Self {
		AuthConfigLayer::default().finalize(None)
	}
}

/// Authentication configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub token_ttl_secs: Option<u64>,
	#[serde(default)]
	pub resolve_per_request: Option<bool>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.token_ttl_secs.is_some() {
			self.token_ttl_secs = other.token_ttl_secs;
		}
		if other.resolve_per_request.is_some() {
			self.resolve_per_request = other.resolve_per_request;
		}
	}

	pub fn finalize(self, token_secret: Option<SecretString>) -> AuthConfig {
		AuthConfig {
			environment: self
				.environment
				.unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
			token_ttl_secs: self.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS),
			resolve_per_request: self.resolve_per_request.unwrap_or(true),
			token_secret,
		}
	}
}
