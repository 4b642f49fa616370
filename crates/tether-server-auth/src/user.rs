// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User identity types.
//!
//! This module provides:
//! - [`User`] - the local user, keyed by a normalized email
//! - [`ExternalProfile`] - the identity claims handed over by an SSO provider
//! - [`ProviderAccount`] - the linkage between a user and one provider subject
//! - [`VerifiedAssertion`] - the full, already-verified login payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::token::OAuthToken;
use crate::types::{ProviderAccountId, UserId};

/// Provider label used when a profile does not carry a usable one.
pub const DEFAULT_PROVIDER: &str = "oidc";

/// Longest display name the `users` table accepts, in characters.
pub const MAX_DISPLAY_NAME_LEN: usize = 256;

/// Longest photo URL the `users` table accepts, in characters.
pub const MAX_PHOTO_URL_LEN: usize = 2048;

/// A user in the system.
///
/// # PII Handling
///
/// `email`, `display_name` and `photo_url` are personally identifiable and
/// must not be logged at info level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	/// Unique identifier for this user.
	pub id: UserId,

	/// Lowercase-normalized email. Unique and immutable once set.
	pub email: String,

	/// Display name. May be null for accounts created by passwordless
	/// signup; filled at most once from an SSO profile.
	pub display_name: Option<String>,

	/// Avatar URL. Same lifecycle as `display_name`.
	pub photo_url: Option<String>,

	/// When the user was created.
	pub created_at: DateTime<Utc>,

	/// When the user was last updated.
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Build a new, not yet persisted user with a fresh ID.
	pub fn new(email: String, display_name: Option<String>, photo_url: Option<String>) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			email,
			display_name,
			photo_url,
			created_at: now,
			updated_at: now,
		}
	}

	/// Returns true if either profile field is still unset.
	pub fn needs_profile_backfill(&self) -> bool {
		self.display_name.is_none() || self.photo_url.is_none()
	}
}

/// Identity claims from an external provider for a single login attempt.
///
/// Transient: never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalProfile {
	/// Provider label used for record-keeping (e.g. "oidc").
	#[serde(default)]
	pub provider: String,

	/// Issuer that asserted this identity.
	pub issuer: String,

	/// Subject identifier at the provider.
	pub subject_id: String,

	/// First email claim, if the provider shared one.
	#[serde(default)]
	pub email: Option<String>,

	#[serde(default)]
	pub display_name: Option<String>,

	#[serde(default)]
	pub photo_url: Option<String>,
}

impl ExternalProfile {
	/// The display name, treating blank strings as absent.
	pub fn display_name(&self) -> Option<&str> {
		non_blank(self.display_name.as_deref())
	}

	/// The photo URL, treating blank strings as absent.
	pub fn photo_url(&self) -> Option<&str> {
		non_blank(self.photo_url.as_deref())
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|s| !s.is_empty())
}

/// A linkage between a [`User`] and one external provider identity.
///
/// Unique per (`user_id`, `provider`, `provider_account_id`). Token material
/// lives on the stored row only and is never read back into this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAccount {
	pub id: ProviderAccountId,

	/// The user this linkage belongs to.
	pub user_id: UserId,

	/// Provider label, as normalized during resolution.
	pub provider: String,

	/// The subject identifier at the provider.
	pub provider_account_id: String,

	/// Issuer that asserted the identity when the link was created.
	pub issuer: String,

	pub created_at: DateTime<Utc>,
}

/// A verified login payload from the protocol layer.
///
/// Issuer and token verification have already happened; nothing here is
/// re-validated cryptographically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedAssertion {
	pub issuer: String,
	pub profile: ExternalProfile,
	#[serde(default)]
	pub id_token: Option<OAuthToken>,
	#[serde(default)]
	pub access_token: Option<OAuthToken>,
	#[serde(default)]
	pub refresh_token: Option<OAuthToken>,
}
