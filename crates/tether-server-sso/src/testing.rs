// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory stores for unit tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tether_server_auth::{ExternalProfile, OAuthToken, ProviderAccount, User, UserId};
use tether_server_db::{DbError, ProviderAccountStore, UserStore};

pub fn profile(email: Option<&str>) -> ExternalProfile {
	ExternalProfile {
		provider: "oidc".to_string(),
		issuer: "https://idp.example.com".to_string(),
		subject_id: "subject-1".to_string(),
		email: email.map(str::to_string),
		display_name: Some("Ada Lovelace".to_string()),
		photo_url: Some("https://idp.example.com/ada.png".to_string()),
	}
}

#[derive(Clone, Default)]
pub struct MockUserStore {
	pub users: Arc<Mutex<HashMap<UserId, User>>>,
	/// When set, the next email lookup reports "not found" even if the user
	/// exists, reproducing a lost find-or-create race.
	pub hide_next_lookup: Arc<AtomicBool>,
	/// When set, `backfill_profile` fails with a validation error.
	pub reject_backfill: Arc<AtomicBool>,
	pub creates: Arc<AtomicUsize>,
	pub backfills: Arc<AtomicUsize>,
}

impl MockUserStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, user: User) {
		self.users.lock().unwrap().insert(user.id, user);
	}

	pub fn len(&self) -> usize {
		self.users.lock().unwrap().len()
	}
}

#[async_trait]
impl UserStore for MockUserStore {
	async fn create_user(&self, user: &User) -> Result<(), DbError> {
		let mut users = self.users.lock().unwrap();
		if users.values().any(|u| u.email == user.email) {
			return Err(DbError::Conflict("user already exists".to_string()));
		}
		users.insert(user.id, user.clone());
		self.creates.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		Ok(self.users.lock().unwrap().get(id).cloned())
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		if self.hide_next_lookup.swap(false, Ordering::SeqCst) {
			return Ok(None);
		}
		Ok(self
			.users
			.lock()
			.unwrap()
			.values()
			.find(|u| u.email == email)
			.cloned())
	}

	async fn backfill_profile(
		&self,
		id: &UserId,
		display_name: Option<&str>,
		photo_url: Option<&str>,
	) -> Result<User, DbError> {
		if self.reject_backfill.load(Ordering::SeqCst) {
			return Err(DbError::Validation("CHECK constraint failed".to_string()));
		}
		let mut users = self.users.lock().unwrap();
		let user = users
			.get_mut(id)
			.ok_or_else(|| DbError::NotFound(format!("user {id}")))?;
		if user.display_name.is_none() {
			user.display_name = display_name.map(str::to_string);
		}
		if user.photo_url.is_none() {
			user.photo_url = photo_url.map(str::to_string);
		}
		self.backfills.fetch_add(1, Ordering::SeqCst);
		Ok(user.clone())
	}

	async fn count_users(&self) -> Result<i64, DbError> {
		Ok(self.len() as i64)
	}
}

#[derive(Clone, Default)]
pub struct MockProviderAccountStore {
	pub accounts: Arc<Mutex<Vec<ProviderAccount>>>,
	pub tokens: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
	/// When set, `provider_account_exists` reports false regardless of state.
	pub hide_existing: Arc<AtomicBool>,
	/// When set, `create_provider_account` fails with an unclassified error.
	pub fail_create: Arc<AtomicBool>,
}

impl MockProviderAccountStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.accounts.lock().unwrap().len()
	}
}

#[async_trait]
impl ProviderAccountStore for MockProviderAccountStore {
	async fn provider_account_exists(
		&self,
		user_id: &UserId,
		provider: &str,
		provider_account_id: &str,
	) -> Result<bool, DbError> {
		if self.hide_existing.load(Ordering::SeqCst) {
			return Ok(false);
		}
		Ok(self.accounts.lock().unwrap().iter().any(|a| {
			a.user_id == *user_id
				&& a.provider == provider
				&& a.provider_account_id == provider_account_id
		}))
	}

	async fn create_provider_account(
		&self,
		account: &ProviderAccount,
		access_token: Option<&OAuthToken>,
		refresh_token: Option<&OAuthToken>,
	) -> Result<(), DbError> {
		if self.fail_create.load(Ordering::SeqCst) {
			return Err(DbError::Internal("disk full".to_string()));
		}
		let mut accounts = self.accounts.lock().unwrap();
		if accounts.iter().any(|a| {
			a.user_id == account.user_id
				&& a.provider == account.provider
				&& a.provider_account_id == account.provider_account_id
		}) {
			return Err(DbError::Conflict("provider account already exists".to_string()));
		}
		accounts.push(account.clone());
		self.tokens.lock().unwrap().push((
			access_token.map(|t| t.expose().to_string()),
			refresh_token.map(|t| t.expose().to_string()),
		));
		Ok(())
	}

	async fn list_provider_accounts_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<ProviderAccount>, DbError> {
		Ok(self
			.accounts
			.lock()
			.unwrap()
			.iter()
			.filter(|a| a.user_id == *user_id)
			.cloned()
			.collect())
	}

	async fn count_provider_accounts_for_user(&self, user_id: &UserId) -> Result<i64, DbError> {
		Ok(self.list_provider_accounts_for_user(user_id).await?.len() as i64)
	}
}
