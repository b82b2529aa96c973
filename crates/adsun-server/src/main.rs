// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Adsun back-office server binary.

use std::path::PathBuf;
use std::time::Duration;

use adsun_server::{create_app_state, create_router, db, seed, version};
use adsun_server_auth::{JwtTokenService, TokenService, UserStore};
use adsun_server_config::{ServerConfig, TOKEN_SECRET_ENV};
use adsun_server_db::UserRepository;
use clap::{Parser, Subcommand};
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Adsun server - roles, permissions and the authorized menu.
#[derive(Parser, Debug)]
#[command(name = "adsun-server", about = "Adsun back-office server", version)]
struct Args {
	/// Config file (defaults to /etc/adsun/server.toml)
	#[arg(long, short)]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run the HTTP server (default)
	Serve,
	/// Show version and build information
	Version,
	/// Create system roles, the admin user and the default menu if missing
	Seed {
		#[arg(long, default_value = "admin")]
		admin_username: String,
		/// Password for a newly created admin account
		#[arg(long, env = "ADSUN_ADMIN_PASSWORD", hide_env_values = true)]
		admin_password: Option<String>,
	},
	/// Print a bearer token for an existing user
	IssueToken {
		username: String,
		/// Token lifetime, e.g. `15m` or `8h`
		#[arg(long, value_parser = humantime::parse_duration)]
		ttl: Option<Duration>,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	// Load .env file if present
	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => adsun_server_config::load_config_with_file(path)?,
		None => adsun_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let pool = db::create_pool(&config.database.url).await?;
	db::run_migrations(&pool).await?;

	match args.command {
		Some(Command::Seed {
			admin_username,
			admin_password,
		}) => {
			let report = seed::seed(&pool, &admin_username, admin_password.as_deref()).await?;
			println!("{report:?}");
			Ok(())
		}
		Some(Command::IssueToken { username, ttl }) => {
			let token = issue_token(pool, &config, &username, ttl).await?;
			println!("{token}");
			Ok(())
		}
		Some(Command::Serve) | None => serve(pool, config).await,
		Some(Command::Version) => Ok(()),
	}
}

async fn serve(pool: sqlx::SqlitePool, config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		resolve_per_request = config.auth.resolve_per_request,
		"starting adsun-server"
	);

	let state = create_app_state(pool, &config)?;
	let app = create_router(state).layer(
		CorsLayer::new()
			.allow_origin(Any)
			.allow_methods(Any)
			.allow_headers(Any),
	);

	let addr = config.socket_addr();
	tracing::info!("listening on {}", addr);
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "Server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}

async fn issue_token(
	pool: sqlx::SqlitePool,
	config: &ServerConfig,
	username: &str,
	ttl: Option<Duration>,
) -> Result<String, Box<dyn std::error::Error>> {
	// An ephemeral key would sign a token no running server accepts.
	let secret = config
		.auth
		.token_secret
		.clone()
		.ok_or_else(|| format!("{TOKEN_SECRET_ENV} must be set to issue tokens"))?;
	let ttl_secs = ttl.map_or(config.auth.token_ttl_secs, |d| d.as_secs());
	let tokens = JwtTokenService::new(secret, ttl_secs);

	let state = create_app_state(pool.clone(), config)?;
	let user = UserRepository::new(pool)
		.find_user_by_username(username)
		.await?
		.ok_or_else(|| format!("user not found: {username}"))?;
	let effective = state.permissions.effective_for(user).await?;
	let claims = tokens.claims_for(&effective.user, &effective.permissions);

	tracing::info!(
		username = %effective.user.username,
		ttl = %version::format_ttl(ttl_secs),
		"issued bearer token"
	);
	Ok(tokens.issue(&claims)?)
}
