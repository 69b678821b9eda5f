use bridge_traits::IdentityError;
use thiserror::Error;

/// Errors returned by login and logout operations.
///
/// Stage failures keep the provider's [`IdentityError`] as their source,
/// unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid login request: {0}")]
    InvalidRequest(String),

    #[error("Identity client initialization failed: {0}")]
    Initialization(#[source] IdentityError),

    #[error("Silent token acquisition failed: {0}")]
    SilentAcquisition(#[source] IdentityError),

    #[error("Interactive token acquisition failed: {0}")]
    InteractiveAcquisition(#[source] IdentityError),

    #[error("Nothing to sign out from.")]
    NoAccountToLogout,

    #[error("Logout failed: {0}")]
    Logout(#[source] IdentityError),
}

impl AuthError {
    /// The provider failure behind this error, if it came from a provider call
    pub fn cause(&self) -> Option<&IdentityError> {
        match self {
            AuthError::Initialization(cause)
            | AuthError::SilentAcquisition(cause)
            | AuthError::InteractiveAcquisition(cause)
            | AuthError::Logout(cause) => Some(cause),
            AuthError::InvalidConfig(_)
            | AuthError::InvalidRequest(_)
            | AuthError::NoAccountToLogout => None,
        }
    }

    /// Stable tag for logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidConfig(_) => "invalid_config",
            AuthError::InvalidRequest(_) => "invalid_request",
            AuthError::NoAccountToLogout => "no_account_to_logout",
            other => other.cause().map_or("unknown", IdentityError::kind),
        }
    }

    /// Whether retrying the operation could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            AuthError::InvalidConfig(_) | AuthError::InvalidRequest(_) => false,
            AuthError::NoAccountToLogout => false,
            other => other.cause().map_or(false, IdentityError::is_recoverable),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
