//! # Session Contexts
//!
//! Turns a caller's [`SessionConfig`] into an initialized provider client.
//!
//! ## Derivation rules
//!
//! - Authority: `authorityUrl` when present, otherwise
//!   `{authority_host}/{tenant}` with the configured default tenant
//!   (`common`) when the session names none.
//! - Redirect URI: `redirectUri` when present, otherwise the host's current
//!   URL with any query string or fragment removed.
//! - Cache location: always [`CacheLocation::LocalStorage`].
//!
//! A [`SessionContext`] can only be obtained from
//! [`SessionContextFactory::create_context`], which runs the provider's
//! `initialize` step before handing the context out.

use crate::error::{AuthError, Result};
use crate::types::SessionConfig;
use bridge_traits::{CacheLocation, ClientConfiguration, IdentityClient};
use core_runtime::config::CoreConfig;
use std::fmt;
use tracing::{debug, instrument};

/// An initialized provider client scoped to one operation.
pub struct SessionContext {
    client: Box<dyn IdentityClient>,
    configuration: ClientConfiguration,
}

impl SessionContext {
    /// Configuration the provider client was constructed with
    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    pub(crate) fn client(&self) -> &dyn IdentityClient {
        self.client.as_ref()
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("client", &"IdentityClient { ... }")
            .field("configuration", &self.configuration)
            .finish()
    }
}

/// Builds and initializes [`SessionContext`]s.
#[derive(Clone)]
pub struct SessionContextFactory {
    config: CoreConfig,
}

impl SessionContextFactory {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Derive the provider client configuration for `session`.
    ///
    /// No provider call is made.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidConfig` - the session failed validation, or no
    ///   redirect URI was given and the host location is unknown
    pub fn client_configuration(&self, session: &SessionConfig) -> Result<ClientConfiguration> {
        session.validate()?;

        Ok(ClientConfiguration {
            client_id: session.client_id.clone(),
            authority: self.authority(session),
            known_authorities: session.known_authorities.clone(),
            domain_hint: session.domain_hint.clone(),
            redirect_uri: self.redirect_uri(session)?,
            cache_location: CacheLocation::LocalStorage,
        })
    }

    /// Construct the provider client for `session` and initialize it.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidConfig` - see [`client_configuration`](Self::client_configuration)
    /// - `AuthError::Initialization` - the provider rejected the configuration
    ///   or its `initialize` step failed; the provider error is kept as-is
    #[instrument(skip(self, session), fields(client_id = %session.client_id))]
    pub async fn create_context(&self, session: &SessionConfig) -> Result<SessionContext> {
        let configuration = self.client_configuration(session)?;
        debug!(
            authority = %configuration.authority,
            redirect_uri = %configuration.redirect_uri,
            cache_location = configuration.cache_location.as_str(),
            "Creating identity client"
        );

        let client = self
            .config
            .identity_client_factory
            .create(configuration.clone())
            .map_err(AuthError::Initialization)?;

        client
            .initialize()
            .await
            .map_err(AuthError::Initialization)?;

        debug!("Identity client initialized");
        Ok(SessionContext {
            client,
            configuration,
        })
    }

    fn authority(&self, session: &SessionConfig) -> String {
        if let Some(authority_url) = &session.authority_url {
            return authority_url.clone();
        }

        let tenant = session
            .tenant
            .as_deref()
            .map(str::trim)
            .filter(|tenant| !tenant.is_empty())
            .unwrap_or(&self.config.default_tenant);

        self.config.tenant_authority(tenant)
    }

    fn redirect_uri(&self, session: &SessionConfig) -> Result<String> {
        if let Some(redirect_uri) = &session.redirect_uri {
            return Ok(redirect_uri.clone());
        }

        let current = self
            .config
            .location_provider
            .as_ref()
            .and_then(|location| location.current_url())
            .ok_or_else(|| {
                AuthError::InvalidConfig(
                    "redirectUri is required when the current location is unknown".to_string(),
                )
            })?;

        Ok(strip_query_and_fragment(&current).to_string())
    }
}

impl fmt::Debug for SessionContextFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContextFactory")
            .field("authority_host", &self.config.authority_host)
            .field("default_tenant", &self.config.default_tenant)
            .field(
                "has_location_provider",
                &self.config.location_provider.is_some(),
            )
            .finish()
    }
}

/// Everything before the first `?` or `#`.
fn strip_query_and_fragment(url: &str) -> &str {
    match url.find(|c| c == '?' || c == '#') {
        Some(index) => &url[..index],
        None => url,
    }
}
