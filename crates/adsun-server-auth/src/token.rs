// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs. The payload carries a snapshot of the holder's
//! effective permissions, used when per-request resolution is disabled.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use adsun_common_config::SecretString;

use crate::permission::PermissionTree;
use crate::types::UserId;
use crate::user::User;

const EPHEMERAL_KEY_LEN: usize = 48;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
	#[error("malformed token: {0}")]
	Malformed(String),

	#[error("token signature mismatch")]
	InvalidSignature,

	#[error("token expired")]
	Expired,

	#[error("token signing key rejected")]
	InvalidKey,

	#[error("token encoding failed: {0}")]
	Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
	fn from(err: jsonwebtoken::errors::Error) -> Self {
		match err.kind() {
			ErrorKind::ExpiredSignature => TokenError::Expired,
			ErrorKind::InvalidSignature => TokenError::InvalidSignature,
			ErrorKind::InvalidKeyFormat | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidEcdsaKey => {
				TokenError::InvalidKey
			}
			_ => TokenError::Malformed(err.to_string()),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
	pub sub: UserId,
	pub username: String,
	pub role_name: String,
	/// Effective tree at issue time.
	pub permissions: PermissionTree,
	pub iat: i64,
	pub exp: i64,
}

pub trait TokenService: Send + Sync {
	fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError>;
	fn verify(&self, token: &str) -> Result<TokenClaims, TokenError>;
	fn ttl_secs(&self) -> i64;

	/// Claims for `user` valid from now for [`TokenService::ttl_secs`].
	fn claims_for(&self, user: &User, permissions: &PermissionTree) -> TokenClaims {
		let iat = Utc::now().timestamp();
		TokenClaims {
			sub: user.id,
			username: user.username.clone(),
			role_name: user.role_name.clone(),
			permissions: permissions.clone(),
			iat,
			exp: iat.saturating_add(self.ttl_secs()),
		}
	}
}

/// HS256 tokens keyed by a shared secret.
pub struct JwtTokenService {
	encoding: EncodingKey,
	decoding: DecodingKey,
	validation: Validation,
	ttl_secs: i64,
}

impl JwtTokenService {
	pub fn new(secret: SecretString, ttl_secs: u64) -> Self {
		let key = secret.expose().as_bytes();
		let mut validation = Validation::new(Algorithm::HS256);
		// `exp` is compared to the clock exactly; the TTL already bounds the window.
		validation.leeway = 0;
		Self {
			encoding: EncodingKey::from_secret(key),
			decoding: DecodingKey::from_secret(key),
			validation,
			ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
		}
	}

	/// Random per-process key; tokens do not survive a restart.
	pub fn ephemeral(ttl_secs: u64) -> Self {
		let key: String = rand::thread_rng()
			.sample_iter(&Alphanumeric)
			.take(EPHEMERAL_KEY_LEN)
			.map(char::from)
			.collect();
		tracing::warn!("no token secret configured, using an ephemeral signing key");
		Self::new(SecretString::new(key), ttl_secs)
	}
}

impl TokenService for JwtTokenService {
	#[instrument(skip(self, claims), fields(user_id = %claims.sub))]
	fn issue(&self, claims: &TokenClaims) -> Result<String, TokenError> {
		let token = encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
			.map_err(|e| TokenError::Encoding(e.to_string()))?;
		debug!(exp = claims.exp, "issued token");
		Ok(token)
	}

	fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
		let data = decode::<TokenClaims>(token, &self.decoding, &self.validation)?;
		Ok(data.claims)
	}

	fn ttl_secs(&self) -> i64 {
		self.ttl_secs
	}
}
