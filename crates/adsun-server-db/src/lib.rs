// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SQLite persistence for roles, users and the navigation menu.
//!
//! Each repository exposes inherent methods returning [`DbError`] and
//! implements the matching store trait from `adsun-server-auth`, so the
//! permission service never sees SQL errors directly.

pub mod category;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod role;
mod row;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use category::CategoryRepository;
pub use error::{DbError, Result};
pub use migrations::run_migrations;
pub use pool::create_pool;
pub use role::RoleRepository;
pub use user::UserRepository;
