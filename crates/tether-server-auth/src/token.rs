// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Opaque OAuth token material.
//!
//! Access and refresh tokens handed over by the protocol layer are carried
//! through reconciliation untouched and persisted on the provider account.
//! [`OAuthToken`] keeps them out of logs and zeroes them on drop:
//!
//! - `Debug`/`Display` print `[REDACTED]`
//! - `Serialize` writes `"[REDACTED]"`
//! - reading the value requires an explicit [`OAuthToken::expose`]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroize;

/// The redaction placeholder used in all output.
pub const REDACTED: &str = "[REDACTED]";

/// An access, refresh or ID token issued by an external identity provider.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct OAuthToken {
	value: String,
}

impl OAuthToken {
	pub fn new(value: impl Into<String>) -> Self {
		Self {
			value: value.into(),
		}
	}

	/// Explicitly access the raw token.
	pub fn expose(&self) -> &str {
		&self.value
	}
}

impl fmt::Debug for OAuthToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("OAuthToken").field(&REDACTED).finish()
	}
}

impl fmt::Display for OAuthToken {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

impl Serialize for OAuthToken {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(REDACTED)
	}
}

impl<'de> Deserialize<'de> for OAuthToken {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		String::deserialize(deserializer).map(OAuthToken::new)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn debug_is_redacted() {
		let token = OAuthToken::new("ya29.super-secret");
		let debug = format!("{token:?}");
		assert!(!debug.contains("super-secret"));
		assert!(debug.contains(REDACTED));
	}

	#[test]
	fn display_is_redacted() {
		let token = OAuthToken::new("ya29.super-secret");
		assert_eq!(token.to_string(), REDACTED);
	}

	#[test]
	fn expose_returns_raw_value() {
		let token = OAuthToken::new("refresh-123");
		assert_eq!(token.expose(), "refresh-123");
	}

	#[test]
	fn serializes_redacted_but_deserializes_raw() {
		let token: OAuthToken = serde_json::from_str("\"abc\"").unwrap();
		assert_eq!(token.expose(), "abc");
		assert_eq!(serde_json::to_string(&token).unwrap(), "\"[REDACTED]\"");
	}

	proptest! {
		#[test]
		fn token_never_in_debug(value in "[a-zA-Z0-9._-]{12,64}") {
			prop_assume!(!value.contains("REDACTED"));
			let token = OAuthToken::new(value.clone());
			let debug = format!("{token:?}");
			prop_assert!(!debug.contains(&value));
		}
	}
}
