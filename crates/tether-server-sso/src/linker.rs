// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Provider account linkage for resolved users.

use chrono::Utc;
use tether_server_auth::{ExternalProfile, OAuthToken, ProviderAccount, ProviderAccountId, User};
use tether_server_db::{DbError, ProviderAccountStore};

use crate::error::SsoError;

/// What [`AccountLinker::ensure_linked`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
	/// A new provider account row was written.
	Created,
	/// The linkage already existed. Stored tokens were left untouched.
	AlreadyLinked,
}

pub struct AccountLinker<P> {
	accounts: P,
}

impl<P: ProviderAccountStore> AccountLinker<P> {
	pub fn new(accounts: P) -> Self {
		Self { accounts }
	}

	/// Ensure a provider account exists for `(user, profile.provider, profile.subject_id)`.
	///
	/// `profile.provider` must already be normalized by the identity resolver.
	/// A concurrent insert of the same linkage counts as [`LinkOutcome::AlreadyLinked`];
	/// every other store failure is returned.
	#[tracing::instrument(
		skip(self, user, profile, access_token, refresh_token),
		fields(user_id = %user.id, provider = %profile.provider)
	)]
	pub async fn ensure_linked(
		&self,
		user: &User,
		profile: &ExternalProfile,
		access_token: Option<&OAuthToken>,
		refresh_token: Option<&OAuthToken>,
	) -> Result<LinkOutcome, SsoError> {
		if self
			.accounts
			.provider_account_exists(&user.id, &profile.provider, &profile.subject_id)
			.await?
		{
			tracing::debug!("provider account already linked");
			return Ok(LinkOutcome::AlreadyLinked);
		}

		let account = ProviderAccount {
			id: ProviderAccountId::generate(),
			user_id: user.id,
			provider: profile.provider.clone(),
			provider_account_id: profile.subject_id.clone(),
			issuer: profile.issuer.clone(),
			created_at: Utc::now(),
		};

		match self
			.accounts
			.create_provider_account(&account, access_token, refresh_token)
			.await
		{
			Ok(()) => {
				tracing::info!(account_id = %account.id, "linked provider account");
				Ok(LinkOutcome::Created)
			}
			Err(DbError::Conflict(_)) => {
				tracing::debug!("provider account linked concurrently");
				Ok(LinkOutcome::AlreadyLinked)
			}
			Err(e) => {
				tracing::error!(error = %e, "failed to link provider account");
				Err(e.into())
			}
		}
	}
}
