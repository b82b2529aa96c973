// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP server for the Adsun back office.
//!
//! Every request passes through [`auth_middleware::auth_layer`], which turns a
//! bearer token into an [`adsun_server_auth::AuthContext`]. Admin routes are
//! additionally gated by [`permission_middleware::RequirePermission`].

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod error;
pub mod permission_middleware;
pub mod routes;
pub mod seed;
pub mod version;

pub use adsun_server_db as db;
pub use api::{create_app_state, create_router, AppState};
pub use error::ServerError;
