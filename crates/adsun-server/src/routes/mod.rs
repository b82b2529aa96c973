// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod menu;
pub mod permissions;
pub mod roles;
pub mod users;

use std::str::FromStr;

use crate::error::ServerError;

/// Parse a UUID path segment into a typed ID.
pub(crate) fn parse_id<T>(raw: &str, what: &str) -> Result<T, ServerError>
where
	T: FromStr<Err = uuid::Error>,
{
	raw
		.parse()
		.map_err(|_| ServerError::BadRequest(format!("invalid {what} id: {raw}")))
}
