// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Find-or-create of the local user for an external profile.
//!
//! The resolver owns user identity. It validates and normalizes the email
//! claim, looks the user up, creates it when absent and backfills profile
//! fields that are still null. Races between concurrent logins for the same
//! email are settled by the store's uniqueness constraint: the losing insert
//! is re-read and treated as an existing user.

use tether_server_auth::{
	normalize_email, AddressValidator, EmailValidator, ExternalProfile, User, DEFAULT_PROVIDER,
	MAX_DISPLAY_NAME_LEN, MAX_PHOTO_URL_LEN,
};
use tether_server_db::{DbError, UserStore};

use crate::error::SsoError;

/// Normalize a provider label for record-keeping.
///
/// Trims and lowercases; an empty label becomes [`DEFAULT_PROVIDER`].
pub fn normalize_provider(label: &str) -> String {
	let label = label.trim().to_lowercase();
	if label.is_empty() {
		DEFAULT_PROVIDER.to_string()
	} else {
		label
	}
}

pub struct IdentityResolver<U, V = AddressValidator> {
	users: U,
	validator: V,
	provider_label: Option<String>,
}

impl<U: UserStore> IdentityResolver<U> {
	pub fn new(users: U) -> Self {
		Self {
			users,
			validator: AddressValidator,
			provider_label: None,
		}
	}
}

impl<U: UserStore, V: EmailValidator> IdentityResolver<U, V> {
	/// Replace the email validator.
	pub fn with_validator<W: EmailValidator>(self, validator: W) -> IdentityResolver<U, W> {
		IdentityResolver {
			users: self.users,
			validator,
			provider_label: self.provider_label,
		}
	}

	/// Record every login under this provider label, whatever the profile says.
	pub fn with_provider_label(mut self, label: impl Into<String>) -> Self {
		self.provider_label = Some(normalize_provider(&label.into()));
		self
	}

	/// Resolve `profile` to a persisted user.
	///
	/// On success `profile.provider` holds the normalized label the account
	/// linker must use.
	///
	/// # Errors
	///
	/// - [`SsoError::EmailNotProvided`] if the email claim is missing, blank or
	///   malformed. Nothing is persisted.
	/// - [`SsoError::ProfileUpdate`] if the store rejects the backfill.
	/// - [`SsoError::Store`] for any other store failure.
	#[tracing::instrument(skip(self, profile), fields(provider = %profile.provider))]
	pub async fn resolve(&self, profile: &mut ExternalProfile) -> Result<User, SsoError> {
		let email = self.extract_email(profile)?;

		profile.provider = match &self.provider_label {
			Some(label) => label.clone(),
			None => normalize_provider(&profile.provider),
		};

		if let Some(user) = self.users.get_user_by_email(&email).await? {
			tracing::debug!(user_id = %user.id, "found existing user");
			return self.backfill(user, profile).await;
		}

		let user = User::new(
			email,
			within_limit(profile.display_name(), MAX_DISPLAY_NAME_LEN, "display_name"),
			within_limit(profile.photo_url(), MAX_PHOTO_URL_LEN, "photo_url"),
		);

		match self.users.create_user(&user).await {
			Ok(()) => {
				tracing::info!(user_id = %user.id, provider = %profile.provider, "created user from SSO login");
				Ok(user)
			}
			Err(DbError::Conflict(reason)) => {
				tracing::debug!(%reason, "user created concurrently, re-reading");
				match self.users.get_user_by_email(&user.email).await? {
					Some(existing) => self.backfill(existing, profile).await,
					None => Err(DbError::Conflict(reason).into()),
				}
			}
			Err(e) => Err(e.into()),
		}
	}

	fn extract_email(&self, profile: &ExternalProfile) -> Result<String, SsoError> {
		let Some(raw) = profile.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
			tracing::warn!(provider = %profile.provider, "SSO profile carried no email claim");
			return Err(SsoError::EmailNotProvided);
		};

		if !self.validator.is_valid_email(raw) {
			tracing::warn!(provider = %profile.provider, "SSO profile email claim is malformed");
			return Err(SsoError::EmailNotProvided);
		}

		Ok(normalize_email(raw))
	}

	async fn backfill(&self, user: User, profile: &ExternalProfile) -> Result<User, SsoError> {
		if !user.needs_profile_backfill() {
			return Ok(user);
		}

		let display_name = profile.display_name().filter(|_| user.display_name.is_none());
		let photo_url = profile.photo_url().filter(|_| user.photo_url.is_none());

		if display_name.is_none() && photo_url.is_none() {
			return Ok(user);
		}

		match self
			.users
			.backfill_profile(&user.id, display_name, photo_url)
			.await
		{
			Ok(updated) => {
				tracing::info!(
					user_id = %updated.id,
					display_name = display_name.is_some(),
					photo_url = photo_url.is_some(),
					"backfilled user profile"
				);
				Ok(updated)
			}
			Err(e @ (DbError::Validation(_) | DbError::NotFound(_))) => {
				tracing::warn!(user_id = %user.id, error = %e, "profile backfill rejected");
				Err(SsoError::ProfileUpdate(e.to_string()))
			}
			Err(e) => Err(e.into()),
		}
	}
}

/// Profile fields the store would reject are left unset on a new user.
fn within_limit(value: Option<&str>, max_chars: usize, column: &'static str) -> Option<String> {
	let value = value?;
	if value.chars().count() > max_chars {
		tracing::debug!(column, max_chars, "dropping oversized profile field");
		return None;
	}
	Some(value.to_string())
}
