// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Email address validation and normalization.
//!
//! Users are keyed by email, so every address that reaches the store goes
//! through [`normalize_email`] first. Validation is pluggable through the
//! [`EmailValidator`] trait; [`AddressValidator`] is the default and parses
//! with [`lettre::Address`].

use lettre::Address;

/// Checks whether a string is a usable email address.
pub trait EmailValidator: Send + Sync {
	fn is_valid_email(&self, email: &str) -> bool;
}

/// Validator backed by lettre's RFC 5321 address parser.
///
/// Display-name forms such as `"Jane <jane@example.com>"` are rejected; only
/// a bare `local@domain` address is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressValidator;

impl EmailValidator for AddressValidator {
	fn is_valid_email(&self, email: &str) -> bool {
		is_valid_email(email)
	}
}

/// Validate a bare email address.
///
/// # Example
///
/// ```
/// use tether_server_auth::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(!is_valid_email("not-an-email"));
/// assert!(!is_valid_email(""));
/// ```
pub fn is_valid_email(email: &str) -> bool {
	email.parse::<Address>().is_ok()
}

/// Normalize an email address for storage and lookup: trims surrounding
/// whitespace and lowercases the whole address.
pub fn normalize_email(email: &str) -> String {
	email.trim().to_lowercase()
}
