// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use tether_server_auth::{AddressValidator, EmailValidator, User, VerifiedAssertion};
use tether_server_db::{ProviderAccountStore, UserStore};

use crate::error::SsoError;
use crate::linker::{AccountLinker, LinkOutcome};
use crate::resolver::IdentityResolver;

/// Reconciles one verified SSO assertion into local state.
///
/// Runs the identity resolver, then the account linker. Either step failing
/// rejects the login; state already committed by the resolver is kept.
pub struct SsoLogin<U, P, V = AddressValidator> {
	resolver: IdentityResolver<U, V>,
	linker: AccountLinker<P>,
}

impl<U: UserStore, P: ProviderAccountStore> SsoLogin<U, P> {
	pub fn new(users: U, accounts: P) -> Self {
		Self {
			resolver: IdentityResolver::new(users),
			linker: AccountLinker::new(accounts),
		}
	}
}

impl<U: UserStore, P: ProviderAccountStore, V: EmailValidator> SsoLogin<U, P, V> {
	pub fn with_provider_label(self, label: impl Into<String>) -> Self {
		Self {
			resolver: self.resolver.with_provider_label(label),
			linker: self.linker,
		}
	}

	/// Resolve the user for `assertion` and make sure its provider identity is linked.
	///
	/// The profile's issuer defaults to the assertion's issuer when blank.
	#[tracing::instrument(skip(self, assertion), fields(issuer = %assertion.issuer))]
	pub async fn reconcile(&self, assertion: VerifiedAssertion) -> Result<User, SsoError> {
		let VerifiedAssertion {
			issuer,
			mut profile,
			access_token,
			refresh_token,
			..
		} = assertion;

		if profile.issuer.trim().is_empty() {
			profile.issuer = issuer;
		}

		let user = self.resolver.resolve(&mut profile).await?;

		let outcome = self
			.linker
			.ensure_linked(&user, &profile, access_token.as_ref(), refresh_token.as_ref())
			.await?;

		tracing::info!(
			user_id = %user.id,
			provider = %profile.provider,
			new_link = outcome == LinkOutcome::Created,
			"SSO login reconciled"
		);

		Ok(user)
	}
}
