// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route-level permission checks.
//!
//! [`RequirePermission`] evaluates one grant token against the effective tree
//! of the authenticated user in [`AuthContext`]:
//!
//! - no authenticated user → 401
//! - decision denied → 403 `{ success: false, message: "Permission denied" }`
//!
//! ```ignore
//! Router::new()
//!     .route("/roles", get(list_roles))
//!     .route_layer(RequirePermission::token("admin_roles_read"));
//! ```
//!
//! Decisions are logged with the user id and required token, never the bearer
//! token itself.

use adsun_server_auth::{AuthContext, Decision, PermissionPath};
use axum::{
	body::Body,
	http::Request,
	response::{IntoResponse, Response},
};
use pin_project_lite::pin_project;
use std::{
	future::Future,
	pin::Pin,
	task::{Context, Poll},
};
use tower::{Layer, Service};

use crate::error::ServerError;

/// Route layer requiring one permission path.
#[derive(Clone)]
pub struct RequirePermission {
	required: PermissionPath,
}

impl RequirePermission {
	pub fn new(required: PermissionPath) -> Self {
		Self { required }
	}

	/// Build from an underscore-joined token such as `admin_users_write`.
	pub fn token(token: &str) -> Self {
		Self::new(PermissionPath::from_segments(
			token.split(PermissionPath::SEPARATOR),
		))
	}
}

impl<S> Layer<S> for RequirePermission {
	type Service = RequirePermissionService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequirePermissionService {
			inner,
			required: self.required.clone(),
		}
	}
}

/// Service wrapper for [`RequirePermission`] layer.
#[derive(Clone)]
pub struct RequirePermissionService<S> {
	inner: S,
	required: PermissionPath,
}

impl<S> Service<Request<Body>> for RequirePermissionService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequirePermissionFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, req: Request<Body>) -> Self::Future {
		let auth_ctx = req
			.extensions()
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		let Some(current_user) = auth_ctx.current_user else {
			tracing::debug!(required = %self.required, "permission check: not authenticated");
			return RequirePermissionFuture::Rejected {
				resp: Some(ServerError::Unauthorized.into_response()),
			};
		};

		let decision = current_user.decide(&self.required);
		if decision == Decision::Denied {
			tracing::warn!(
				user_id = %current_user.id,
				role = %current_user.role_name,
				required = %self.required,
				"permission check denied"
			);
			return RequirePermissionFuture::Rejected {
				resp: Some(ServerError::Forbidden.into_response()),
			};
		}

		tracing::debug!(
			user_id = %current_user.id,
			required = %self.required,
			decision = ?decision,
			"permission check passed"
		);

		RequirePermissionFuture::Inner {
			fut: self.inner.call(req),
		}
	}
}

pin_project! {
	/// Future for [`RequirePermissionService`].
	#[project = RequirePermissionFutureProj]
	pub enum RequirePermissionFuture<F> {
		Inner { #[pin] fut: F },
		Rejected { resp: Option<Response> },
	}
}

impl<F, E> Future for RequirePermissionFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		match self.project() {
			RequirePermissionFutureProj::Inner { fut } => fut.poll(cx),
			RequirePermissionFutureProj::Rejected { resp } => {
				Poll::Ready(Ok(resp.take().expect("polled after completion")))
			}
		}
	}
}
