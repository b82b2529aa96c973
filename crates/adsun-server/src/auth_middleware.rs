// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bearer-token authentication.
//!
//! [`auth_layer`] runs on every request and always inserts an [`AuthContext`]
//! into the request extensions; a missing, malformed, tampered or expired token
//! yields an unauthenticated context rather than an error. Handlers that need
//! a user take [`RequireAuth`], which rejects with 401.

use adsun_server_auth::{
	extract_bearer_token, AuthContext, CurrentUser, PermissionError, TokenClaims,
};
use axum::{
	extract::{FromRequestParts, Request, State},
	http::request::Parts,
	middleware::Next,
	response::{IntoResponse, Response},
};

use crate::{api::AppState, error::ServerError};

/// Populate [`AuthContext`] from the `Authorization` header.
pub async fn auth_layer(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
	let ctx = match extract_bearer_token(request.headers()) {
		None => AuthContext::unauthenticated(),
		Some(token) => match state.tokens.verify(&token) {
			Err(e) => {
				tracing::debug!(error = %e, "bearer token rejected");
				AuthContext::unauthenticated()
			}
			Ok(claims) => match authenticate(&state, claims).await {
				Ok(ctx) => ctx,
				Err(e) => return e.into_response(),
			},
		},
	};

	request.extensions_mut().insert(ctx);
	next.run(request).await
}

async fn authenticate(state: &AppState, claims: TokenClaims) -> Result<AuthContext, ServerError> {
	if !state.resolve_per_request {
		return Ok(AuthContext::authenticated(CurrentUser::from_claims(claims)));
	}

	match state.permissions.effective_permissions(&claims.sub).await {
		Ok(effective) if effective.user.is_active => {
			Ok(AuthContext::authenticated(CurrentUser::from_effective(effective)))
		}
		Ok(effective) => {
			tracing::info!(user_id = %effective.user.id, "token presented for inactive user");
			Ok(AuthContext::unauthenticated())
		}
		Err(PermissionError::UserNotFound(_)) => {
			tracing::info!(user_id = %claims.sub, "token presented for unknown user");
			Ok(AuthContext::unauthenticated())
		}
		Err(e) => Err(e.into()),
	}
}

/// Extractor for handlers that require an authenticated user.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts
			.extensions
			.get::<AuthContext>()
			.and_then(|ctx| ctx.current_user.clone())
			.map(RequireAuth)
			.ok_or(ServerError::Unauthorized)
	}
}
