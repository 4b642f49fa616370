// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! User repository for database operations.
//!
//! Users are keyed by a unique, lowercase-normalized email. Callers are
//! expected to normalize before calling in; the repository stores what it
//! is given.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePool, Row};
use tether_server_auth::{User, UserId};
use uuid::Uuid;

use crate::error::DbError;

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &User) -> Result<(), DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
	async fn backfill_profile(
		&self,
		id: &UserId,
		display_name: Option<&str>,
		photo_url: Option<&str>,
	) -> Result<User, DbError>;
	async fn count_users(&self) -> Result<i64, DbError>;
}

/// Repository for user database operations.
///
/// All user IDs are UUIDs stored as strings in SQLite.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	/// Create a new repository with the given connection pool.
	///
	/// # Arguments
	/// * `pool` - SQLite connection pool
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Create a new user in the database.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if a user with the same email (or ID)
	/// already exists, `DbError::Validation` if a column constraint rejects
	/// the profile fields.
	///
	/// # Database Constraints
	/// - `id` must be unique
	/// - `email` must be unique
	#[tracing::instrument(skip(self, user), fields(user_id = %user.id))]
	pub async fn create_user(&self, user: &User) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, email, display_name, photo_url, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.to_string())
		.bind(&user.email)
		.bind(&user.display_name)
		.bind(&user.photo_url)
		.bind(user.created_at.to_rfc3339())
		.bind(user.updated_at.to_rfc3339())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::from_write(e, "user"))?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	/// Get a user by their unique ID.
	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, display_name, photo_url, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| row_to_user(&r)).transpose()
	}

	/// Get a user by their normalized email address.
	///
	/// # Returns
	/// `None` if no user exists with this email.
	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, display_name, photo_url, created_at, updated_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		let result = row.map(|r| row_to_user(&r)).transpose()?;
		if let Some(ref user) = result {
			tracing::debug!(user_id = %user.id, "user found by email");
		}
		Ok(result)
	}

	/// Fill `display_name` and `photo_url` where they are still null.
	///
	/// A single UPDATE that never overwrites a non-null column, so concurrent
	/// backfills commute.
	///
	/// # Returns
	/// The user as stored after the update.
	///
	/// # Errors
	/// - `DbError::NotFound` if the user does not exist
	/// - `DbError::Validation` if a column constraint rejects the new values
	#[tracing::instrument(skip(self, display_name, photo_url), fields(user_id = %id))]
	pub async fn backfill_profile(
		&self,
		id: &UserId,
		display_name: Option<&str>,
		photo_url: Option<&str>,
	) -> Result<User, DbError> {
		let now = Utc::now().to_rfc3339();
		let row = sqlx::query(
			r#"
			UPDATE users SET
				display_name = COALESCE(display_name, ?),
				photo_url = COALESCE(photo_url, ?),
				updated_at = ?
			WHERE id = ?
			RETURNING id, email, display_name, photo_url, created_at, updated_at
			"#,
		)
		.bind(display_name)
		.bind(photo_url)
		.bind(now)
		.bind(id.to_string())
		.fetch_optional(&self.pool)
		.await
		.map_err(|e| DbError::from_write(e, "user profile"))?;

		let user = row
			.map(|r| row_to_user(&r))
			.transpose()?
			.ok_or_else(|| DbError::NotFound(format!("user {id}")))?;

		tracing::debug!(user_id = %user.id, "user profile backfilled");
		Ok(user)
	}

	/// Count all users.
	#[tracing::instrument(skip(self))]
	pub async fn count_users(&self) -> Result<i64, DbError> {
		let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
			.fetch_one(&self.pool)
			.await?;
		Ok(count.0)
	}
}

pub(crate) fn parse_timestamp(value: &str, column: &str) -> Result<DateTime<Utc>, DbError> {
	DateTime::parse_from_rfc3339(value)
		.map(|dt| dt.with_timezone(&Utc))
		.map_err(|e| DbError::Internal(format!("Invalid {column}: {e}")))
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	let id_str: String = row.get("id");
	let id =
		Uuid::parse_str(&id_str).map_err(|e| DbError::Internal(format!("Invalid user ID: {e}")))?;

	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(User {
		id: UserId::new(id),
		email: row.get("email"),
		display_name: row.get("display_name"),
		photo_url: row.get("photo_url"),
		created_at: parse_timestamp(&created_at, "created_at")?,
		updated_at: parse_timestamp(&updated_at, "updated_at")?,
	})
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, user: &User) -> Result<(), DbError> {
		self.create_user(user).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_email(email).await
	}

	async fn backfill_profile(
		&self,
		id: &UserId,
		display_name: Option<&str>,
		photo_url: Option<&str>,
	) -> Result<User, DbError> {
		self.backfill_profile(id, display_name, photo_url).await
	}

	async fn count_users(&self) -> Result<i64, DbError> {
		self.count_users().await
	}
}
