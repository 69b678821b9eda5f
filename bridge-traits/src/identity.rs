//! Identity Provider Abstractions
//!
//! The provider client (token cache, popup/redirect UI, PKCE and nonce
//! handling, network calls to the authorization server) is owned by the host.
//! The core only drives it through [`IdentityClient`] and builds it through
//! [`IdentityClientFactory`].
//!
//! # Example
//!
//! ```ignore
//! use bridge_traits::identity::{ClientConfiguration, IdentityClientFactory};
//!
//! async fn accounts(factory: &dyn IdentityClientFactory, config: ClientConfiguration) {
//!     let client = factory.create(config).expect("valid configuration");
//!     client.initialize().await.expect("provider initialized");
//!     for account in client.get_all_accounts() {
//!         println!("{}", account.username);
//!     }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::platform::PlatformSendSync;

/// Where the provider persists its token cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CacheLocation {
    /// Durable, origin-scoped storage that survives page reloads
    LocalStorage,
    /// Per-tab storage cleared when the tab closes
    SessionStorage,
    /// Process memory only
    Memory,
}

impl CacheLocation {
    /// Provider-facing identifier for this cache location
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheLocation::LocalStorage => "localStorage",
            CacheLocation::SessionStorage => "sessionStorage",
            CacheLocation::Memory => "memoryStorage",
        }
    }
}

/// Configuration a provider client is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfiguration {
    /// Application (client) ID registered with the provider
    pub client_id: String,
    /// Authority URL trusted to issue tokens
    pub authority: String,
    /// Additional authorities the client may trust
    pub known_authorities: Vec<String>,
    /// Hint forwarded to the provider to skip home realm discovery
    pub domain_hint: Option<String>,
    /// Where the provider redirects after interactive flows
    pub redirect_uri: String,
    /// Token cache persistence
    pub cache_location: CacheLocation,
}

/// Prompt behavior for interactive acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Prompt {
    /// Always show the account picker
    SelectAccount,
    /// Force credential entry
    Login,
    /// Force the consent screen
    Consent,
    /// Never show UI; fail instead
    None,
}

impl Prompt {
    /// Value sent as the `prompt` authorization parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Prompt::SelectAccount => "select_account",
            Prompt::Login => "login",
            Prompt::Consent => "consent",
            Prompt::None => "none",
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed-in identity known to the provider's cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Stable identifier across tenants
    pub home_account_id: String,
    /// Cloud instance host (e.g. `login.windows.net`)
    pub environment: String,
    /// Tenant the account signed in to
    pub tenant_id: String,
    /// Sign-in name, usually an e-mail address
    pub username: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Request for silent (cache or refresh-token based) acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilentTokenRequest {
    pub scopes: Vec<String>,
    pub account: Account,
    pub correlation_id: Uuid,
}

/// Request for interactive (popup) acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupTokenRequest {
    pub prompt: Prompt,
    pub scopes: Vec<String>,
    /// Forwarded verbatim to the authorization request
    pub extra_query_parameters: BTreeMap<String, String>,
    pub correlation_id: Uuid,
}

/// Tokens returned by the provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: String,
    /// Account the tokens were issued for, when the provider reports it
    #[serde(default)]
    pub account: Option<Account>,
    /// Access token expiry, when the provider reports it
    #[serde(default)]
    pub expires_on: Option<DateTime<Utc>>,
}

impl TokenResponse {
    pub fn new(access_token: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            id_token: id_token.into(),
            account: None,
            expires_on: None,
        }
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &"[REDACTED]")
            .field("account", &self.account.as_ref().map(|a| &a.home_account_id))
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// Failures reported by the provider client.
///
/// The variant is preserved for diagnostics; the core does not branch on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("No account is available for this request")]
    NoAccount,

    #[error("Interaction required: {0}")]
    InteractionRequired(String),

    #[error("Consent required: {0}")]
    ConsentRequired(String),

    #[error("User cancelled the flow")]
    UserCancelled,

    #[error("Popup window was blocked")]
    PopupBlocked,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Identity client used before initialization")]
    NotInitialized,

    #[error("Invalid client configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Provider error {code}: {message}")]
    Provider { code: String, message: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl IdentityError {
    /// Stable tag for logs and events
    pub fn kind(&self) -> &'static str {
        match self {
            IdentityError::NoAccount => "no_account",
            IdentityError::InteractionRequired(_) => "interaction_required",
            IdentityError::ConsentRequired(_) => "consent_required",
            IdentityError::UserCancelled => "user_cancelled",
            IdentityError::PopupBlocked => "popup_blocked",
            IdentityError::Network(_) => "network",
            IdentityError::NotInitialized => "not_initialized",
            IdentityError::InvalidConfiguration(_) => "invalid_configuration",
            IdentityError::Provider { .. } => "provider",
            IdentityError::MalformedResponse(_) => "malformed_response",
        }
    }

    /// Whether repeating the operation (possibly interactively) could succeed
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            IdentityError::InvalidConfiguration(_) | IdentityError::NotInitialized
        )
    }
}

/// Provider client capability.
///
/// Implementations wrap the host's identity SDK. `initialize` must complete
/// before any other call is issued; the core guarantees this ordering.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait IdentityClient: PlatformSendSync {
    /// Complete the provider's required startup work
    async fn initialize(&self) -> Result<(), IdentityError>;

    /// Accounts currently known to the provider's cache, in provider order
    fn get_all_accounts(&self) -> Vec<Account>;

    /// Acquire tokens without user interaction
    async fn acquire_token_silent(
        &self,
        request: SilentTokenRequest,
    ) -> Result<TokenResponse, IdentityError>;

    /// Acquire tokens through a popup flow
    async fn acquire_token_popup(
        &self,
        request: PopupTokenRequest,
    ) -> Result<TokenResponse, IdentityError>;

    /// End the provider session through a popup flow
    async fn logout_popup(&self) -> Result<(), IdentityError>;
}

/// Builds provider clients from a [`ClientConfiguration`].
pub trait IdentityClientFactory: PlatformSendSync {
    /// Construct an uninitialized client
    fn create(
        &self,
        configuration: ClientConfiguration,
    ) -> Result<Box<dyn IdentityClient>, IdentityError>;
}
