// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Provider account repository for database operations.
//!
//! A provider account links a user to one subject at one external identity
//! provider. A user may accumulate several of them (one per provider
//! identity); they are never deleted by the login flow.
//!
//! Provider tokens are written here and nowhere else. They are write-only
//! from the point of view of this crate.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePool, Row};
use tether_server_auth::{OAuthToken, ProviderAccount, ProviderAccountId, UserId};
use uuid::Uuid;

use crate::error::DbError;
use crate::user::parse_timestamp;

#[async_trait]
pub trait ProviderAccountStore: Send + Sync {
	async fn provider_account_exists(
		&self,
		user_id: &UserId,
		provider: &str,
		provider_account_id: &str,
	) -> Result<bool, DbError>;
	async fn create_provider_account(
		&self,
		account: &ProviderAccount,
		access_token: Option<&OAuthToken>,
		refresh_token: Option<&OAuthToken>,
	) -> Result<(), DbError>;
	async fn list_provider_accounts_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<ProviderAccount>, DbError>;
	async fn count_provider_accounts_for_user(&self, user_id: &UserId) -> Result<i64, DbError>;
}

/// Repository for provider account database operations.
#[derive(Clone)]
pub struct ProviderAccountRepository {
	pool: SqlitePool,
}

impl ProviderAccountRepository {
	/// Create a new repository with the given connection pool.
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Check whether a user is already linked to a provider identity.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn provider_account_exists(
		&self,
		user_id: &UserId,
		provider: &str,
		provider_account_id: &str,
	) -> Result<bool, DbError> {
		let (exists,): (bool,) = sqlx::query_as(
			r#"
			SELECT EXISTS (
				SELECT 1 FROM provider_accounts
				WHERE user_id = ? AND provider = ? AND provider_account_id = ?
			)
			"#,
		)
		.bind(user_id.to_string())
		.bind(provider)
		.bind(provider_account_id)
		.fetch_one(&self.pool)
		.await?;

		Ok(exists)
	}

	/// Create a new provider account together with its token material.
	///
	/// # Errors
	/// - `DbError::Conflict` if the (`user_id`, `provider`,
	///   `provider_account_id`) linkage already exists
	/// - `DbError::Validation` if `user_id` does not reference a user
	///
	/// # Database Constraints
	/// - `id` must be unique
	/// - (`user_id`, `provider`, `provider_account_id`) must be unique
	/// - `user_id` must reference an existing user
	#[tracing::instrument(
		skip(self, account, access_token, refresh_token),
		fields(provider_account_id = %account.id, user_id = %account.user_id, provider = %account.provider)
	)]
	pub async fn create_provider_account(
		&self,
		account: &ProviderAccount,
		access_token: Option<&OAuthToken>,
		refresh_token: Option<&OAuthToken>,
	) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO provider_accounts (
				id, user_id, provider, provider_account_id, issuer,
				access_token, refresh_token, created_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(account.id.to_string())
		.bind(account.user_id.to_string())
		.bind(&account.provider)
		.bind(&account.provider_account_id)
		.bind(&account.issuer)
		.bind(access_token.map(OAuthToken::expose))
		.bind(refresh_token.map(OAuthToken::expose))
		.bind(account.created_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::from_write(e, "provider account"))?;

		tracing::debug!(
			provider_account_id = %account.id,
			user_id = %account.user_id,
			"provider account created"
		);
		Ok(())
	}

	/// List all provider accounts linked to a user, oldest first.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_provider_accounts_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<ProviderAccount>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, user_id, provider, provider_account_id, issuer, created_at
			FROM provider_accounts
			WHERE user_id = ?
			ORDER BY created_at ASC
			"#,
		)
		.bind(user_id.to_string())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(row_to_provider_account).collect()
	}

	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn count_provider_accounts_for_user(&self, user_id: &UserId) -> Result<i64, DbError> {
		let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM provider_accounts WHERE user_id = ?")
			.bind(user_id.to_string())
			.fetch_one(&self.pool)
			.await?;
		Ok(count.0)
	}
}

fn row_to_provider_account(row: &sqlx::sqlite::SqliteRow) -> Result<ProviderAccount, DbError> {
	let id_str: String = row.get("id");
	let id = Uuid::parse_str(&id_str)
		.map_err(|e| DbError::Internal(format!("Invalid provider account ID: {e}")))?;

	let user_id_str: String = row.get("user_id");
	let user_id = Uuid::parse_str(&user_id_str)
		.map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

	let created_at: String = row.get("created_at");

	Ok(ProviderAccount {
		id: ProviderAccountId::new(id),
		user_id: UserId::new(user_id),
		provider: row.get("provider"),
		provider_account_id: row.get("provider_account_id"),
		issuer: row.get("issuer"),
		created_at: parse_timestamp(&created_at, "created_at")?,
	})
}

#[async_trait]
impl ProviderAccountStore for ProviderAccountRepository {
	async fn provider_account_exists(
		&self,
		user_id: &UserId,
		provider: &str,
		provider_account_id: &str,
	) -> Result<bool, DbError> {
		self
			.provider_account_exists(user_id, provider, provider_account_id)
			.await
	}

	async fn create_provider_account(
		&self,
		account: &ProviderAccount,
		access_token: Option<&OAuthToken>,
		refresh_token: Option<&OAuthToken>,
	) -> Result<(), DbError> {
		self
			.create_provider_account(account, access_token, refresh_token)
			.await
	}

	async fn list_provider_accounts_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<ProviderAccount>, DbError> {
		self.list_provider_accounts_for_user(user_id).await
	}

	async fn count_provider_accounts_for_user(&self, user_id: &UserId) -> Result<i64, DbError> {
		self.count_provider_accounts_for_user(user_id).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_test_pool;
	use crate::user::UserRepository;
	use chrono::Utc;
	use tether_server_auth::User;

	async fn setup() -> (ProviderAccountRepository, User, SqlitePool) {
		let pool = create_test_pool().await;
		let user = User::new("a@x.com".to_string(), None, None);
		UserRepository::new(pool.clone())
			.create_user(&user)
			.await
			.unwrap();
		(ProviderAccountRepository::new(pool.clone()), user, pool)
	}

	fn account(user_id: UserId, provider: &str, subject: &str) -> ProviderAccount {
		ProviderAccount {
			id: ProviderAccountId::generate(),
			user_id,
			provider: provider.to_string(),
			provider_account_id: subject.to_string(),
			issuer: "https://idp.example.com".to_string(),
			created_at: Utc::now(),
		}
	}

	#[tokio::test]
	async fn create_then_exists() {
		let (repo, user, _pool) = setup().await;
		assert!(!repo
			.provider_account_exists(&user.id, "oidc", "sub-1")
			.await
			.unwrap());

		repo
			.create_provider_account(&account(user.id, "oidc", "sub-1"), None, None)
			.await
			.unwrap();

		assert!(repo
			.provider_account_exists(&user.id, "oidc", "sub-1")
			.await
			.unwrap());
		assert!(!repo
			.provider_account_exists(&user.id, "google", "sub-1")
			.await
			.unwrap());
	}

	#[tokio::test]
	async fn duplicate_linkage_is_conflict() {
		let (repo, user, _pool) = setup().await;
		repo
			.create_provider_account(&account(user.id, "oidc", "sub-1"), None, None)
			.await
			.unwrap();

		let err = repo
			.create_provider_account(&account(user.id, "oidc", "sub-1"), None, None)
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Conflict(_)), "got {err:?}");
		assert_eq!(repo.count_provider_accounts_for_user(&user.id).await.unwrap(), 1);
	}

	#[tokio::test]
	async fn unknown_user_is_validation_error() {
		let (repo, _user, _pool) = setup().await;
		let err = repo
			.create_provider_account(&account(UserId::generate(), "oidc", "sub-1"), None, None)
			.await
			.unwrap_err();
		assert!(matches!(err, DbError::Validation(_)), "got {err:?}");
	}

	#[tokio::test]
	async fn tokens_are_persisted_on_the_account() {
		let (repo, user, pool) = setup().await;
		let access = OAuthToken::new("access-1");
		let refresh = OAuthToken::new("refresh-1");
		let linked = account(user.id, "oidc", "sub-1");
		repo
			.create_provider_account(&linked, Some(&access), Some(&refresh))
			.await
			.unwrap();

		let (stored_access, stored_refresh): (Option<String>, Option<String>) = sqlx::query_as(
			"SELECT access_token, refresh_token FROM provider_accounts WHERE id = ?",
		)
		.bind(linked.id.to_string())
		.fetch_one(&pool)
		.await
		.unwrap();
		assert_eq!(stored_access.as_deref(), Some("access-1"));
		assert_eq!(stored_refresh.as_deref(), Some("refresh-1"));
	}

	#[tokio::test]
	async fn list_returns_all_links_for_user() {
		let (repo, user, _pool) = setup().await;
		repo
			.create_provider_account(&account(user.id, "google", "g-1"), None, None)
			.await
			.unwrap();
		repo
			.create_provider_account(&account(user.id, "okta", "o-1"), None, None)
			.await
			.unwrap();

		let accounts = repo.list_provider_accounts_for_user(&user.id).await.unwrap();
		assert_eq!(accounts.len(), 2);
		assert!(accounts.iter().all(|a| a.user_id == user.id));
		let mut providers: Vec<_> = accounts.iter().map(|a| a.provider.as_str()).collect();
		providers.sort();
		assert_eq!(providers, vec!["google", "okta"]);
	}
}
