// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error taxonomy for permission handling.
//!
//! None of these are fatal to the process; the HTTP layer maps each variant to
//! a `{ success: false, message }` body with the matching status code.

#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
	/// Payload is not an object (or a legacy array of category codes) where a tree is required.
	#[error("invalid permission format: {0}")]
	InvalidPermissionFormat(String),

	#[error("role not found: {0}")]
	RoleNotFound(String),

	#[error("user not found: {0}")]
	UserNotFound(String),

	/// The authorization decision came back negative.
	#[error("permission denied: {0}")]
	PermissionDenied(String),

	#[error("system role cannot be modified: {0}")]
	SystemRoleImmutable(String),

	#[error("invalid role name: {0}")]
	InvalidRoleName(String),

	#[error("role name already exists: {0}")]
	RoleNameTaken(String),

	#[error("role {role} is assigned to {users} user(s)")]
	RoleInUse { role: String, users: i64 },

	/// Unknown login or wrong password. Deliberately does not say which.
	#[error("invalid credentials")]
	InvalidCredentials,

	#[error("account is disabled: {0}")]
	AccountDisabled(String),

	/// Username or email collides with another account.
	#[error("user already exists: {0}")]
	UserExists(String),

	#[error("invalid user data: {0}")]
	InvalidUser(String),

	#[error("password hashing failed: {0}")]
	PasswordHash(String),

	/// Upstream storage failure. The message is for logs, not for clients.
	#[error("storage error: {0}")]
	Store(String),
}

pub type Result<T> = std::result::Result<T, PermissionError>;
