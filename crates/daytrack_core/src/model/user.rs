//! User profile domain model.
//!
//! # Responsibility
//! - Mirror the identity snapshot handed back by the auth provider.
//! - Validate the snapshot before it is upserted locally.
//!
//! # Invariants
//! - `uid` is the provider's opaque subject ID and acts as primary key.
//! - `email` always matches the pragmatic shape checked here; exhaustive
//!   RFC validation stays with the provider.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Validation failure for a user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUid,
    EmptyDisplayName,
    InvalidEmail(String),
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyUid => write!(f, "user uid must not be empty"),
            Self::EmptyDisplayName => write!(f, "user display name must not be empty"),
            Self::InvalidEmail(email) => write!(f, "invalid email address: {email}"),
        }
    }
}

impl Error for UserValidationError {}

/// Local snapshot of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Opaque subject ID issued by the identity provider.
    pub uid: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a profile snapshot with fresh timestamps.
    pub fn new(
        uid: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            email: email.into(),
            photo_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// # Contract
    /// - Called before every upsert and by the auth service before any
    ///   provider round trip.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.uid.trim().is_empty() {
            return Err(UserValidationError::EmptyUid);
        }
        if self.display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        validate_email(&self.email)?;
        Ok(())
    }

    /// Refreshes `updated_at` after an in-place mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Checks an address against the pragmatic email shape.
///
/// Shared by the auth service so malformed input is rejected before the
/// provider is called at all.
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if EMAIL_RE.is_match(email.trim()) {
        Ok(())
    } else {
        Err(UserValidationError::InvalidEmail(email.to_string()))
    }
}
