//! Auth orchestration: input checks, provider calls, profile mirroring.

use crate::auth::provider::{IdentityProvider, ProviderError, ProviderIdentity};
use crate::model::user::{validate_email, UserProfile, UserValidationError};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Shortest password the sign-up form accepts.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// Service error for auth use-cases.
#[derive(Debug)]
pub enum AuthError {
    /// Email failed the pre-flight shape check.
    InvalidEmail(String),
    /// Sign-up password is shorter than [`MIN_PASSWORD_CHARS`].
    PasswordTooShort { min: usize },
    /// Provider round trip failed.
    Provider(ProviderError),
    /// Local profile persistence failed.
    Repo(RepoError),
    /// Operation requires a signed-in session.
    NotSignedIn,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail(email) => write!(f, "invalid email address: {email}"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::Provider(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::NotSignedIn => write!(f, "no user is signed in"),
        }
    }
}

impl Error for AuthError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Provider(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProviderError> for AuthError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<RepoError> for AuthError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<UserValidationError> for AuthError {
    fn from(value: UserValidationError) -> Self {
        match value {
            UserValidationError::InvalidEmail(email) => Self::InvalidEmail(email),
            other => Self::Repo(RepoError::Validation(other.to_string())),
        }
    }
}

/// Session-holding facade over the identity provider and user repository.
///
/// # Invariants
/// - `current_uid` is `Some` only after a successful sign-in/sign-up and
///   a successful profile upsert.
/// - Malformed input is rejected before any provider round trip.
pub struct AuthService<P: IdentityProvider, U: UserRepository> {
    provider: P,
    users: U,
    current_uid: Option<String>,
}

impl<P: IdentityProvider, U: UserRepository> AuthService<P, U> {
    /// Creates a signed-out service over the given provider and repository.
    pub fn new(provider: P, users: U) -> Self {
        Self {
            provider,
            users,
            current_uid: None,
        }
    }

    /// Registers a new account and opens a session for it.
    ///
    /// # Contract
    /// - Email shape and password length are checked before the provider
    ///   is contacted.
    /// - The returned identity is mirrored into the `users` table.
    pub fn sign_up(&mut self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let email = email.trim();
        validate_email(email)?;
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AuthError::PasswordTooShort {
                min: MIN_PASSWORD_CHARS,
            });
        }

        let identity = self.provider.sign_up(email, password).map_err(|err| {
            warn!("event=auth_sign_up module=auth status=error error={err}");
            err
        })?;
        self.open_session("auth_sign_up", identity)
    }

    /// Signs into an existing account with email and password.
    pub fn sign_in(&mut self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let email = email.trim();
        validate_email(email)?;

        let identity = self.provider.sign_in(email, password).map_err(|err| {
            warn!("event=auth_sign_in module=auth status=error error={err}");
            err
        })?;
        self.open_session("auth_sign_in", identity)
    }

    /// Runs the provider's interactive Google flow and opens a session.
    pub fn sign_in_with_google(&mut self) -> Result<UserProfile, AuthError> {
        let identity = self.provider.sign_in_with_google().map_err(|err| {
            warn!("event=auth_sign_in_google module=auth status=error error={err}");
            err
        })?;
        self.open_session("auth_sign_in_google", identity)
    }

    /// Asks the provider to send a password-reset email.
    ///
    /// Does not touch the current session.
    pub fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        validate_email(email)?;
        self.provider.send_password_reset(email)?;
        info!("event=auth_password_reset module=auth status=ok");
        Ok(())
    }

    /// Closes the current session, provider side first.
    pub fn sign_out(&mut self) -> Result<(), AuthError> {
        let uid = self.current_uid.take().ok_or(AuthError::NotSignedIn)?;
        if let Err(err) = self.provider.sign_out(&uid) {
            // Session is dropped locally regardless; the provider call is
            // best effort once the user asked to leave.
            warn!("event=auth_sign_out module=auth status=error uid={uid} error={err}");
            return Err(err.into());
        }
        info!("event=auth_sign_out module=auth status=ok uid={uid}");
        Ok(())
    }

    /// The uid of the signed-in user, if any.
    pub fn current_uid(&self) -> Option<&str> {
        self.current_uid.as_deref()
    }

    /// Loads the stored profile of the signed-in user.
    pub fn current_profile(&self) -> Result<UserProfile, AuthError> {
        let uid = self.current_uid().ok_or(AuthError::NotSignedIn)?;
        self.users
            .get_user(uid)?
            .ok_or_else(|| AuthError::Repo(RepoError::InvalidData(format!(
                "session uid `{uid}` has no stored profile"
            ))))
    }

    fn open_session(
        &mut self,
        event: &str,
        identity: ProviderIdentity,
    ) -> Result<UserProfile, AuthError> {
        let mut profile = UserProfile::new(
            identity.uid,
            effective_display_name(&identity.display_name, &identity.email),
            identity.email,
        );
        profile.photo_url = identity.photo_url;
        profile.validate()?;

        self.users.upsert_user(&profile)?;
        self.current_uid = Some(profile.uid.clone());
        info!("event={event} module=auth status=ok uid={}", profile.uid);
        Ok(profile)
    }
}

/// Fresh email/password accounts often arrive without a display name;
/// fall back to the address's local part so the profile stays valid.
/// Every path that mirrors a provider identity into a [`UserProfile`]
/// must go through this.
pub fn effective_display_name(display_name: &str, email: &str) -> String {
    let trimmed = display_name.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    email
        .split('@')
        .next()
        .filter(|part| !part.trim().is_empty())
        .unwrap_or("user")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::effective_display_name;

    #[test]
    fn display_name_falls_back_to_email_local_part() {
        assert_eq!(effective_display_name("Ada", "ada@example.com"), "Ada");
        assert_eq!(effective_display_name("  ", "ada@example.com"), "ada");
        assert_eq!(effective_display_name("", "@example.com"), "user");
    }
}
