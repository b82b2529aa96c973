// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for the Adsun back-office server.
//!
//! Layered from built-in defaults, a TOML file and `ADSUN_SERVER_*`
//! environment variables, in increasing precedence.
//!
//! # Usage
//!
//! ```ignore
//! use adsun_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use adsun_common_config::{load_secret_env, SecretString};
use tracing::{debug, info};

/// Env var (or `_FILE` variant) holding the token signing key.
pub const TOKEN_SECRET_ENV: &str = "ADSUN_SERVER_TOKEN_SECRET";

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub logging: LoggingConfig,
	pub roles: RolesConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`ADSUN_SERVER_*`)
/// 2. Config file (`/etc/adsun/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	];
	load_from_sources(sources)
}

/// Load configuration from environment only (for testing or simple deployments).
pub fn load_config_from_env() -> Result<ServerConfig, ConfigError> {
	let sources: Vec<Box<dyn ConfigSource>> = vec![Box::new(EnvSource)];
	load_from_sources(sources)
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	let token_secret =
		load_secret_env(TOKEN_SECRET_ENV).map_err(|e| ConfigError::Secret(e.to_string()))?;
	finalize(merged, token_secret)
}

/// Finalize configuration layer into resolved config.
fn finalize(
	layer: ServerConfigLayer,
	token_secret: Option<SecretString>,
) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize(token_secret);
	let logging = layer.logging.unwrap_or_default().finalize();
	let roles = layer.roles.unwrap_or_default().finalize();

	validate_config(&auth)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		environment = %auth.environment,
		resolve_per_request = auth.resolve_per_request,
		token_secret_configured = auth.token_secret.is_some(),
		role_defaults = ?roles.defaults_path,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		logging,
		roles,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig) -> Result<(), ConfigError> {
	if auth.is_production() && auth.token_secret.is_none() {
		return Err(ConfigError::Validation(format!(
			"{TOKEN_SECRET_ENV} (or {TOKEN_SECRET_ENV}_FILE) must be set when ADSUN_SERVER_ENV=production"
		)));
	}
	if auth.token_ttl_secs == 0 {
		return Err(ConfigError::InvalidValue {
			key: "auth.token_ttl_secs".to_string(),
			message: "must be greater than zero".to_string(),
		});
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	struct FixedSource(&'static str, Precedence);

	impl ConfigSource for FixedSource {
		fn name(&self) -> &'static str {
			"fixed"
		}

		fn precedence(&self) -> Precedence {
			self.1
		}

		fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
			Ok(toml::from_str(self.0).unwrap())
		}
	}

	#[test]
	fn test_production_requires_token_secret() {
		let auth = AuthConfigLayer {
			environment: Some("production".to_string()),
			..Default::default()
		}
		.finalize(None);
		let err = validate_config(&auth).unwrap_err();
		assert!(err.to_string().contains(TOKEN_SECRET_ENV));
	}

	#[test]
	fn test_production_with_secret_is_valid() {
		let auth = AuthConfigLayer {
			environment: Some("production".to_string()),
			..Default::default()
		}
		.finalize(Some(SecretString::new("k".to_string())));
		assert!(validate_config(&auth).is_ok());
	}

	#[test]
	fn test_zero_ttl_is_rejected() {
		let auth = AuthConfigLayer {
			token_ttl_secs: Some(0),
			..Default::default()
		}
		.finalize(None);
		assert!(matches!(
			validate_config(&auth),
			Err(ConfigError::InvalidValue { .. })
		));
	}

	#[test]
	fn test_higher_precedence_wins_regardless_of_order() {
		let mut sources: Vec<Box<dyn ConfigSource>> = vec![
			Box::new(FixedSource("[http]\nport = 7000", Precedence::Environment)),
			Box::new(FixedSource(
				"[http]\nport = 6000\nhost = \"127.0.0.1\"",
				Precedence::ConfigFile,
			)),
		];
		sources.sort_by_key(|s| s.precedence());

		let mut merged = ServerConfigLayer::default();
		for source in sources {
			merged.merge(source.load().unwrap());
		}
		let config = finalize(merged, None).unwrap();
		assert_eq!(config.http.port, 7000);
		assert_eq!(config.http.host, "127.0.0.1");
	}

	#[test]
	fn test_config_file_values_are_used() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"[database]\nurl = \"sqlite:/srv/adsun.db\"\n[logging]\nlevel = \"warn\""
		)
		.unwrap();

		let layer = TomlSource::new(file.path()).load().unwrap();
		let config = finalize(layer, None).unwrap();
		assert_eq!(config.database.url, "sqlite:/srv/adsun.db");
		assert_eq!(config.logging.level, "warn");
		assert_eq!(config.http.port, 3000);
	}

	#[test]
	fn test_socket_addr() {
		let config = ServerConfig {
			http: HttpConfig {
				host: "127.0.0.1".to_string(),
				port: 9000,
			},
			..Default::default()
		};
		assert_eq!(config.socket_addr(), "127.0.0.1:9000");
	}
}
