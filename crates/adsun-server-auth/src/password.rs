// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2id password hashing for back-office logins.
//!
//! Release builds use `Argon2::default()` (19 MiB, 2 iterations). Unit tests in
//! this crate use 1 MiB and a single pass; those parameters must never reach
//! production.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
#[cfg(test)]
use argon2::{Algorithm, Params, Version};

use crate::error::{PermissionError, Result};

#[inline]
pub(crate) fn argon2_instance() -> Argon2<'static> {
	#[cfg(test)]
	{
		let params = Params::new(1024, 1, 1, None).expect("valid Argon2 params for tests");
		Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
	}

	#[cfg(not(test))]
	{
		Argon2::default()
	}
}

/// PHC-format hash of `password` with a fresh salt.
pub fn hash_password(password: &str) -> Result<String> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| PermissionError::PasswordHash(e.to_string()))
}

/// `false` for a wrong password and for a stored hash that does not parse.
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
	let Ok(parsed) = PasswordHash::new(stored_hash) else {
		tracing::warn!("stored password hash is not in PHC format");
		return false;
	};
	argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok()
}
