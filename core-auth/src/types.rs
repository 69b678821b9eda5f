use crate::error::{AuthError, Result};
use bridge_traits::{Account, IdentityError, TokenResponse};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Caller-supplied configuration for one provider session.
///
/// Consumed to produce exactly one `SessionContext`. Field names follow the
/// host plugin's camelCase option objects.
///
/// # Examples
///
/// ```
/// use core_auth::SessionConfig;
///
/// let config = SessionConfig::new("abc")
///     .with_tenant("contoso.onmicrosoft.com")
///     .with_redirect_uri("http://localhost:3000/auth");
///
/// assert_eq!(config.client_id, "abc");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Application (client) ID
    pub client_id: String,
    /// Tenant used to derive the authority (`common` when absent)
    #[serde(default)]
    pub tenant: Option<String>,
    /// Authority URL; overrides the tenant-derived authority
    #[serde(default)]
    pub authority_url: Option<String>,
    /// Additional trusted authorities
    #[serde(default)]
    pub known_authorities: Vec<String>,
    /// Home realm hint forwarded to the provider
    #[serde(default)]
    pub domain_hint: Option<String>,
    /// Redirect target; defaults to the current page without query/fragment
    #[serde(default)]
    pub redirect_uri: Option<String>,
}

impl SessionConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            tenant: None,
            authority_url: None,
            known_authorities: Vec::new(),
            domain_hint: None,
            redirect_uri: None,
        }
    }

    pub fn with_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    pub fn with_authority_url(mut self, authority_url: impl Into<String>) -> Self {
        self.authority_url = Some(authority_url.into());
        self
    }

    pub fn with_known_authority(mut self, authority: impl Into<String>) -> Self {
        self.known_authorities.push(authority.into());
        self
    }

    pub fn with_domain_hint(mut self, domain_hint: impl Into<String>) -> Self {
        self.domain_hint = Some(domain_hint.into());
        self
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Check the fields that must hold before any provider call.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidConfig` - blank client ID, or an authority URL
    ///   that is not an absolute https URL
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(AuthError::InvalidConfig(
                "clientId cannot be empty".to_string(),
            ));
        }

        if let Some(authority_url) = &self.authority_url {
            let parsed = Url::parse(authority_url).map_err(|e| {
                AuthError::InvalidConfig(format!(
                    "authorityUrl '{}' is not a valid URL: {}",
                    authority_url, e
                ))
            })?;
            if parsed.scheme() != "https" {
                return Err(AuthError::InvalidConfig(format!(
                    "authorityUrl must use https, got '{}'",
                    parsed.scheme()
                )));
            }
        }

        Ok(())
    }
}

/// Scopes and extra parameters for one token request.
///
/// Deserializing goes through [`LoginRequest::new`], so scopes from JSON
/// are deduplicated as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawLoginRequest")]
pub struct LoginRequest {
    /// Requested scopes, echoed back in [`AuthResult::scopes`]
    pub scopes: Vec<String>,
    /// Forwarded verbatim to the interactive authorization request
    #[serde(default)]
    pub extra_query_parameters: BTreeMap<String, String>,
}

impl LoginRequest {
    /// Create a request for the given scopes.
    ///
    /// Duplicate scopes are dropped; the first occurrence keeps its position.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for scope in scopes {
            let scope = scope.into();
            if !unique.contains(&scope) {
                unique.push(scope);
            }
        }

        Self {
            scopes: unique,
            extra_query_parameters: BTreeMap::new(),
        }
    }

    pub fn with_extra_query_parameter(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.extra_query_parameters.insert(key.into(), value.into());
        self
    }

    /// # Errors
    ///
    /// - `AuthError::InvalidRequest` - no scopes, or a blank scope
    pub fn validate(&self) -> Result<()> {
        if self.scopes.is_empty() {
            return Err(AuthError::InvalidRequest(
                "at least one scope is required".to_string(),
            ));
        }

        if self.scopes.iter().any(|scope| scope.trim().is_empty()) {
            return Err(AuthError::InvalidRequest(
                "scopes cannot be blank".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLoginRequest {
    scopes: Vec<String>,
    #[serde(default)]
    extra_query_parameters: BTreeMap<String, String>,
}

impl From<RawLoginRequest> for LoginRequest {
    fn from(raw: RawLoginRequest) -> Self {
        let mut request = LoginRequest::new(raw.scopes);
        request.extra_query_parameters = raw.extra_query_parameters;
        request
    }
}

/// Combined login options as sent by the host plugin layer.
///
/// # Examples
///
/// ```
/// use core_auth::LoginOptions;
///
/// let options = LoginOptions::from_json(
///     r#"{"clientId":"abc","tenant":"common","scopes":["User.Read"]}"#,
/// )
/// .unwrap();
///
/// assert_eq!(options.session.client_id, "abc");
/// assert_eq!(options.request.scopes, vec!["User.Read".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOptions {
    #[serde(flatten)]
    pub session: SessionConfig,
    #[serde(flatten)]
    pub request: LoginRequest,
}

impl LoginOptions {
    pub fn new(session: SessionConfig, request: LoginRequest) -> Self {
        Self { session, request }
    }

    /// Parse the host's JSON option object.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRequest` - malformed JSON or missing fields
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| AuthError::InvalidRequest(format!("Malformed login options: {}", e)))
    }
}

/// Normalized result of a successful login.
///
/// Both tokens are non-empty. `scopes` echoes the requested scopes, not
/// necessarily the granted set.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResult {
    pub access_token: String,
    pub id_token: String,
    pub scopes: Vec<String>,
}

impl AuthResult {
    /// Build a result from a provider response.
    ///
    /// # Errors
    ///
    /// - `IdentityError::MalformedResponse` - the provider returned an empty
    ///   access token or ID token
    pub fn from_response(
        response: TokenResponse,
        scopes: &[String],
    ) -> std::result::Result<Self, IdentityError> {
        if response.access_token.is_empty() {
            return Err(IdentityError::MalformedResponse(
                "provider returned an empty access token".to_string(),
            ));
        }
        if response.id_token.is_empty() {
            return Err(IdentityError::MalformedResponse(
                "provider returned an empty ID token".to_string(),
            ));
        }

        Ok(Self {
            access_token: response.access_token,
            id_token: response.id_token,
            scopes: scopes.to_vec(),
        })
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for AuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResult")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Which cached account silent acquisition binds to.
///
/// `First` takes the first account in provider order, which is the
/// behavior hosts get unless they opt into another policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "value", rename_all = "camelCase")]
pub enum AccountSelection {
    /// First account in the provider's known-accounts list
    #[default]
    First,
    /// Account with this home account ID
    HomeAccountId(String),
    /// Account with this username (case-insensitive)
    Username(String),
}

impl AccountSelection {
    /// Pick an account from `accounts`, or `None` if nothing matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use core_auth::AccountSelection;
    ///
    /// assert!(AccountSelection::First.select(&[]).is_none());
    /// ```
    pub fn select(&self, accounts: &[Account]) -> Option<Account> {
        match self {
            AccountSelection::First => accounts.first().cloned(),
            AccountSelection::HomeAccountId(id) => accounts
                .iter()
                .find(|account| &account.home_account_id == id)
                .cloned(),
            AccountSelection::Username(username) => accounts
                .iter()
                .find(|account| account.username.eq_ignore_ascii_case(username))
                .cloned(),
        }
    }
}

impl fmt::Display for AccountSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountSelection::First => write!(f, "first"),
            AccountSelection::HomeAccountId(_) => write!(f, "home_account_id"),
            AccountSelection::Username(_) => write!(f, "username"),
        }
    }
}

/// How a login operation acquires tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMode {
    /// Silent first, interactive on any silent failure
    Fallback,
    /// Interactive only
    Interactive,
    /// Silent only
    Silent,
}

impl LoginMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoginMode::Fallback => "fallback",
            LoginMode::Interactive => "interactive",
            LoginMode::Silent => "silent",
        }
    }

    /// Name of the public operation running in this mode
    pub fn operation(&self) -> &'static str {
        match self {
            LoginMode::Fallback => "login",
            LoginMode::Interactive => "login_interactively",
            LoginMode::Silent => "login_silently",
        }
    }
}

impl fmt::Display for LoginMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
