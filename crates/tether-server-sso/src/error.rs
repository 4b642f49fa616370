// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Login reconciliation errors.
//!
//! Any error returned from this crate means the login attempt must be
//! rejected and no session issued. Nothing here is retried.

use tether_server_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SsoError {
	/// The provider did not share a usable email claim. This is a consent
	/// scope mismatch at the identity provider, not a transient failure.
	#[error("login blocked: provider did not share an email")]
	EmailNotProvided,

	/// Backfilling the profile of an existing user was rejected by the store.
	#[error("login blocked: could not update user profile: {0}")]
	ProfileUpdate(String),

	/// Any other store failure, propagated unmodified.
	#[error("login failed: {0}")]
	Store(#[from] DbError),
}

impl SsoError {
	/// Returns true if this error should be logged at error level.
	pub fn is_internal(&self) -> bool {
		matches!(self, SsoError::Store(_))
	}

	/// Returns the HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			SsoError::EmailNotProvided | SsoError::ProfileUpdate(_) => 401,
			SsoError::Store(_) => 500,
		}
	}
}
