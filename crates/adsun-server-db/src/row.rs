// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Column decoding shared by the repositories.

use adsun_server_auth::PermissionTree;
use chrono::{DateTime, Utc};
use std::str::FromStr;

use crate::error::DbError;

pub(crate) fn parse_id<T>(raw: &str, what: &str) -> Result<T, DbError>
where
	T: FromStr<Err = uuid::Error>,
{
	raw
		.parse()
		.map_err(|e| DbError::Internal(format!("Invalid {what}: {e}")))
}

pub(crate) fn parse_timestamp(raw: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(raw)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

/// Stored trees may predate the nested format and hold a flat array of
/// category codes; both shapes are accepted.
pub(crate) fn parse_tree(raw: &str) -> Result<PermissionTree, DbError> {
	let value: serde_json::Value = serde_json::from_str(raw)?;
	PermissionTree::from_payload(&value)
		.map_err(|e| DbError::Internal(format!("Invalid stored permissions: {e}")))
}
