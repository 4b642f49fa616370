// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identity types for Tether federated login.
//!
//! This crate provides:
//! - Type-safe ID newtypes ([`UserId`], [`ProviderAccountId`])
//! - The local [`User`] and its [`ProviderAccount`] linkages
//! - The transient [`ExternalProfile`] and [`VerifiedAssertion`] handed over
//!   by the protocol layer
//! - Email validation and normalization
//! - [`OAuthToken`], a redacting wrapper for provider tokens
//!
//! # Security Considerations
//!
//! - Provider tokens never appear in `Debug`, `Display` or serialized output
//! - Emails are normalized before they are used as lookup keys

pub mod email;
pub mod token;
pub mod types;
pub mod user;

pub use email::{is_valid_email, normalize_email, AddressValidator, EmailValidator};
pub use token::OAuthToken;
pub use types::{ProviderAccountId, UserId};
pub use user::{
	ExternalProfile, ProviderAccount, User, VerifiedAssertion, DEFAULT_PROVIDER,
	MAX_DISPLAY_NAME_LEN, MAX_PHOTO_URL_LEN,
};
