// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # tether-server-db
//!
//! Persistence layer for Tether using SQLite via sqlx.
//!
//! ## Repository Pattern
//!
//! Each domain has two components:
//! - **`*Store` trait**: the interface the login flow depends on
//!   (`UserStore`, `ProviderAccountStore`)
//! - **`*Repository` struct**: the SQLite implementation holding a `SqlitePool`
//!
//! The trait impls delegate to inherent methods, so the repositories can be
//! used directly or behind the trait.
//!
//! ## Error Handling
//!
//! | Variant | When |
//! |---------|------|
//! | `Conflict` | Unique constraint violation (email taken, linkage exists) |
//! | `Validation` | CHECK / NOT NULL / foreign key violation |
//! | `NotFound` | An update targeted a row that does not exist |
//! | `Sqlx` | Anything else from the driver, propagated via `?` |
//! | `Internal` | Stored data that cannot be parsed |
//!
//! Lookups where absence is normal return `Result<Option<T>>`.
//!
//! ## Concurrency
//!
//! Find-or-create races are settled by the database: `users.email` and
//! `provider_accounts(user_id, provider, provider_account_id)` are unique,
//! and the losing insert surfaces as `DbError::Conflict`.

mod error;
pub mod pool;
pub mod provider_account;
pub mod user;

#[cfg(test)]
pub mod testing;

pub use error::{DbError, Result};
pub use pool::{create_pool, run_migrations};
pub use provider_account::{ProviderAccountRepository, ProviderAccountStore};
pub use user::{UserRepository, UserStore};
