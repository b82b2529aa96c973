// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Permission paths and their token form.
//!
//! Inside the crate a permission is a sequence of segments
//! (`["admin", "users", "write"]`). The underscore-joined token
//! (`admin_users_write`) only appears at API and log boundaries.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{PermissionError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionPath(Vec<String>);

impl PermissionPath {
	/// Joins segments in the token form.
	pub const SEPARATOR: char = '_';

	pub fn from_segments<I, S>(segments: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self(segments.into_iter().map(Into::into).collect())
	}

	/// Parse an underscore-joined token. Empty tokens and empty segments are rejected.
	pub fn parse(token: &str) -> Result<Self> {
		if token.is_empty() {
			return Err(PermissionError::InvalidPermissionFormat(
				"empty permission token".to_string(),
			));
		}

		let segments: Vec<String> = token.split(Self::SEPARATOR).map(str::to_string).collect();
		if segments.iter().any(String::is_empty) {
			return Err(PermissionError::InvalidPermissionFormat(format!(
				"empty segment in permission token '{token}'"
			)));
		}

		Ok(Self(segments))
	}

	pub fn segments(&self) -> &[String] {
		&self.0
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// First segment.
	pub fn category(&self) -> Option<&str> {
		self.0.first().map(String::as_str)
	}

	/// Second segment.
	pub fn action(&self) -> Option<&str> {
		self.0.get(1).map(String::as_str)
	}

	pub fn child(&self, segment: impl Into<String>) -> Self {
		let mut segments = self.0.clone();
		segments.push(segment.into());
		Self(segments)
	}

	pub fn to_token(&self) -> String {
		self.0.join("_")
	}
}

impl fmt::Display for PermissionPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_token())
	}
}

impl FromStr for PermissionPath {
	type Err = PermissionError;

	fn from_str(s: &str) -> Result<Self> {
		Self::parse(s)
	}
}

impl Serialize for PermissionPath {
	fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for PermissionPath {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let token = String::deserialize(deserializer)?;
		Self::parse(&token).map_err(de::Error::custom)
	}
}
