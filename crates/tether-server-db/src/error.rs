// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use sqlx::error::ErrorKind;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
	#[error("Database error: {0}")]
	Sqlx(#[from] sqlx::Error),

	#[error("Not found: {0}")]
	NotFound(String),

	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Validation failed: {0}")]
	Validation(String),

	#[error("Internal: {0}")]
	Internal(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
	/// Classify an error from an INSERT or UPDATE.
	///
	/// Unique violations become [`DbError::Conflict`]; CHECK, NOT NULL and
	/// foreign key violations become [`DbError::Validation`]. Everything
	/// else stays a [`DbError::Sqlx`].
	pub(crate) fn from_write(e: sqlx::Error, what: &str) -> Self {
		let classified = match &e {
			sqlx::Error::Database(db_err) => match db_err.kind() {
				ErrorKind::UniqueViolation => Some(DbError::Conflict(format!("{what} already exists"))),
				ErrorKind::CheckViolation
				| ErrorKind::NotNullViolation
				| ErrorKind::ForeignKeyViolation => {
					Some(DbError::Validation(format!("{what}: {}", db_err.message())))
				}
				_ => classify_by_message(what, db_err.message()),
			},
			_ => None,
		};
		classified.unwrap_or(DbError::Sqlx(e))
	}
}

// Older SQLite builds report constraint failures without extended codes.
fn classify_by_message(what: &str, message: &str) -> Option<DbError> {
	if message.contains("UNIQUE constraint failed") {
		Some(DbError::Conflict(format!("{what} already exists")))
	} else if message.contains("CHECK constraint failed")
		|| message.contains("NOT NULL constraint failed")
		|| message.contains("FOREIGN KEY constraint failed")
	{
		Some(DbError::Validation(format!("{what}: {message}")))
	} else {
		None
	}
}
