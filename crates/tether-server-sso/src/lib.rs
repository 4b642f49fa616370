// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # tether-server-sso
//!
//! Post-authentication identity reconciliation for SSO/OIDC logins.
//!
//! The protocol layer hands over an already-verified [`VerifiedAssertion`].
//! This crate decides whether the caller is a new user, an existing user whose
//! profile needs backfilling, or an existing user arriving through a new
//! provider, and writes the matching state:
//!
//! ```text
//! START -> lookup by email
//!   NOT_FOUND -> create user -> create link -> DONE
//!   FOUND     -> (maybe) backfill profile -> lookup link
//!                  LINK_NOT_FOUND -> create link -> DONE
//!                  LINK_FOUND     -> DONE
//! ```
//!
//! - [`IdentityResolver`] owns the user row
//! - [`AccountLinker`] owns the provider account rows
//! - [`SsoLogin`] runs one after the other
//!
//! Stores are injected through the [`UserStore`] and [`ProviderAccountStore`]
//! traits. Nothing is retried; any error rejects the login.
//!
//! [`VerifiedAssertion`]: tether_server_auth::VerifiedAssertion
//! [`UserStore`]: tether_server_db::UserStore
//! [`ProviderAccountStore`]: tether_server_db::ProviderAccountStore

pub mod error;
pub mod linker;
pub mod login;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use error::SsoError;
pub use linker::{AccountLinker, LinkOutcome};
pub use login::SsoLogin;
pub use resolver::{normalize_provider, IdentityResolver};
