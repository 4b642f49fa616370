// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! SSO login reconciliation configuration.

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_PROVIDER_LABEL: &str = "oidc";
const DEFAULT_SCOPES: &[&str] = &["openid", "email", "profile"];

/// SSO configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsoConfig {
	/// Label recorded on every provider account created by this deployment.
	pub provider_label: String,
	/// Scopes requested from the identity provider. Read by the OIDC
	/// protocol layer when it builds the authorization request.
	pub scopes: Vec<String>,
}

impl Default for SsoConfig {
	fn default() -> Self {
		Self {
			provider_label: DEFAULT_PROVIDER_LABEL.to_string(),
			scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
		}
	}
}

impl SsoConfig {
	/// Logins without an email claim are always rejected, so the `email`
	/// scope must be requested.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.provider_label.trim().is_empty() {
			return Err(ConfigError::Validation(
				"sso.provider_label must not be empty".to_string(),
			));
		}
		if !self.scopes.iter().any(|s| s == "email") {
			return Err(ConfigError::Validation(format!(
				"sso.scopes must include \"email\" (got {:?})",
				self.scopes
			)));
		}
		Ok(())
	}
}

/// SSO configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SsoConfigLayer {
	#[serde(default)]
	pub provider_label: Option<String>,
	#[serde(default)]
	pub scopes: Option<Vec<String>>,
}

impl SsoConfigLayer {
	pub fn merge(&mut self, other: SsoConfigLayer) {
		if other.provider_label.is_some() {
			self.provider_label = other.provider_label;
		}
		if other.scopes.is_some() {
			self.scopes = other.scopes;
		}
	}

	pub fn finalize(self) -> SsoConfig {
		let defaults = SsoConfig::default();
		SsoConfig {
			provider_label: self
				.provider_label
				.map(|l| l.trim().to_lowercase())
				.unwrap_or(defaults.provider_label),
			scopes: self.scopes.unwrap_or(defaults.scopes),
		}
	}
}

/// Split a comma-separated scope list, dropping blanks.
pub fn parse_scopes(raw: &str) -> Vec<String> {
	raw.split(',')
		.map(str::trim)
		.filter(|s| !s.is_empty())
		.map(str::to_string)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn test_defaults() {
		let config = SsoConfigLayer::default().finalize();
		assert_eq!(config.provider_label, "oidc");
		assert_eq!(config.scopes, vec!["openid", "email", "profile"]);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_label_is_normalized() {
		let layer = SsoConfigLayer {
			provider_label: Some(" Corp-SSO ".to_string()),
			scopes: None,
		};
		assert_eq!(layer.finalize().provider_label, "corp-sso");
	}

	#[test]
	fn test_missing_email_scope_is_rejected() {
		let config = SsoConfig {
			scopes: parse_scopes("openid,profile"),
			..Default::default()
		};
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("email"));
	}

	#[test]
	fn test_empty_label_is_rejected() {
		let config = SsoConfig {
			provider_label: "  ".to_string(),
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_parse_scopes() {
		assert_eq!(parse_scopes("openid, email,,profile "), vec!["openid", "email", "profile"]);
		assert!(parse_scopes("").is_empty());
	}

	#[test]
	fn test_deserialize_layer() {
		let layer: SsoConfigLayer =
			toml::from_str("provider_label = \"okta\"\nscopes = [\"openid\", \"email\"]").unwrap();
		assert_eq!(layer.provider_label.as_deref(), Some("okta"));
		assert_eq!(layer.scopes.unwrap(), vec!["openid", "email"]);
	}

	proptest! {
		#[test]
		fn parsed_scopes_are_trimmed_and_non_empty(raw in "[ ,a-z]{0,40}") {
			for scope in parse_scopes(&raw) {
				prop_assert!(!scope.is_empty());
				prop_assert_eq!(scope.trim(), scope.as_str());
			}
		}
	}
}
