//! Identity provider port.
//!
//! The actual credential flows (password verification, OAuth token
//! exchange, reset email delivery) live in an external service; this
//! trait is the whole surface the core depends on. Tests implement it
//! with an in-memory mock.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failure reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Email/password pair was rejected.
    InvalidCredentials,
    /// Sign-up hit an address that already has an account.
    EmailAlreadyInUse(String),
    /// No account exists for the address (reset flow).
    AccountNotFound(String),
    /// Interactive flow was abandoned by the user.
    Cancelled,
    /// Provider could not be reached or answered with a server error.
    Unavailable(String),
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCredentials => write!(f, "email or password is incorrect"),
            Self::EmailAlreadyInUse(email) => {
                write!(f, "an account already exists for {email}")
            }
            Self::AccountNotFound(email) => write!(f, "no account exists for {email}"),
            Self::Cancelled => write!(f, "sign-in was cancelled"),
            Self::Unavailable(detail) => write!(f, "identity provider unavailable: {detail}"),
        }
    }
}

impl Error for ProviderError {}

/// Identity snapshot handed back after a successful provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Opaque subject ID; primary key of the local profile mirror.
    pub uid: String,
    pub email: String,
    /// May be empty for fresh email/password accounts; the auth service
    /// falls back to the address's local part.
    pub display_name: String,
    pub photo_url: Option<String>,
}

/// Port to the external identity service.
///
/// Implementations are expected to be thin adapters around a hosted
/// SDK or HTTP client. The core never inspects credentials beyond the
/// pre-flight shape checks in the auth service.
pub trait IdentityProvider {
    fn sign_up(&self, email: &str, password: &str) -> ProviderResult<ProviderIdentity>;
    fn sign_in(&self, email: &str, password: &str) -> ProviderResult<ProviderIdentity>;
    /// Runs the interactive OAuth flow.
    fn sign_in_with_google(&self) -> ProviderResult<ProviderIdentity>;
    fn send_password_reset(&self, email: &str) -> ProviderResult<()>;
    /// Invalidates the provider-side session for `uid`.
    fn sign_out(&self, uid: &str) -> ProviderResult<()>;
}
