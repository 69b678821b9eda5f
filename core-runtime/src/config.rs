//! # Core Configuration Module
//!
//! Provides runtime configuration for the authentication core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding the host capabilities and the defaults used when deriving
//! a provider session. It enforces fail-fast validation so a missing identity
//! provider is reported at startup rather than on the first login.
//!
//! ## Required Dependencies
//!
//! - `IdentityClientFactory` - Builds the host's identity provider client
//!
//! ## Optional Dependencies
//!
//! - `LocationProvider` - Current page URL used for the default redirect URI.
//!   Without it, every session must carry an explicit `redirectUri`.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .identity_client_factory(Arc::new(MsalFactory::new()))
//!     .location_provider(Arc::new(WindowLocation))
//!     .authority_host("https://login.microsoftonline.us")
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // Fails fast: no identity provider was injected
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing identity client factory");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{IdentityClientFactory, LocationProvider};
use std::sync::Arc;
use url::Url;

/// Public-cloud authority host used when a session names only a tenant.
pub const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Tenant used when a session names neither a tenant nor an authority.
pub const DEFAULT_TENANT: &str = "common";

/// Core configuration for the authentication core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Builds identity provider clients (required)
    pub identity_client_factory: Arc<dyn IdentityClientFactory>,

    /// Current page location (optional)
    pub location_provider: Option<Arc<dyn LocationProvider>>,

    /// Authority host that tenant-derived authorities are built on
    pub authority_host: String,

    /// Tenant used when a session does not name one
    pub default_tenant: String,

    /// Buffer size of the auth event bus
    pub event_buffer_size: usize,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("identity_client_factory", &"IdentityClientFactory { ... }")
            .field(
                "location_provider",
                &self
                    .location_provider
                    .as_ref()
                    .map(|_| "LocationProvider { ... }"),
            )
            .field("authority_host", &self.authority_host)
            .field("default_tenant", &self.default_tenant)
            .field("event_buffer_size", &self.event_buffer_size)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The authority host is an absolute https URL without query or fragment
    /// - The default tenant is not blank
    /// - The event buffer size is greater than zero
    pub fn validate(&self) -> Result<()> {
        let host = Url::parse(&self.authority_host).map_err(|e| {
            Error::Config(format!(
                "Authority host '{}' is not a valid URL: {}",
                self.authority_host, e
            ))
        })?;

        if host.scheme() != "https" {
            return Err(Error::Config(format!(
                "Authority host must use https, got '{}'",
                host.scheme()
            )));
        }

        if host.query().is_some() || host.fragment().is_some() {
            return Err(Error::Config(
                "Authority host cannot carry a query string or fragment".to_string(),
            ));
        }

        if self.default_tenant.trim().is_empty() {
            return Err(Error::Config("Default tenant cannot be empty".to_string()));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Authority URL for `tenant` on the configured host.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// assert_eq!(
    ///     config.tenant_authority("contoso.onmicrosoft.com"),
    ///     "https://login.microsoftonline.com/contoso.onmicrosoft.com"
    /// );
    /// ```
    pub fn tenant_authority(&self, tenant: &str) -> String {
        format!("{}/{}", self.authority_host.trim_end_matches('/'), tenant)
    }
}

fn identity_factory_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "IdentityClientFactory".to_string(),
        message: "An identity provider client is required for login and logout. \
                 Web: inject an adapter over the browser identity SDK. \
                 Desktop: inject an adapter over the platform broker or a loopback client. \
                 Tests: inject a stub factory."
            .to_string(),
    }
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Call [`build()`](CoreConfigBuilder::build) to validate and create the
/// final config.
#[derive(Default)]
pub struct CoreConfigBuilder {
    identity_client_factory: Option<Arc<dyn IdentityClientFactory>>,
    location_provider: Option<Arc<dyn LocationProvider>>,
    authority_host: Option<String>,
    default_tenant: Option<String>,
    event_buffer_size: Option<usize>,
}

impl CoreConfigBuilder {
    /// Sets the identity client factory (required).
    pub fn identity_client_factory(mut self, factory: Arc<dyn IdentityClientFactory>) -> Self {
        self.identity_client_factory = Some(factory);
        self
    }

    /// Sets the current-location provider.
    pub fn location_provider(mut self, location: Arc<dyn LocationProvider>) -> Self {
        self.location_provider = Some(location);
        self
    }

    /// Sets the authority host.
    ///
    /// Default: `https://login.microsoftonline.com`. Sovereign clouds use
    /// their own host (e.g. `https://login.microsoftonline.us`).
    pub fn authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = Some(host.into());
        self
    }

    /// Sets the tenant used when a session names none.
    ///
    /// Default: `common`
    pub fn default_tenant(mut self, tenant: impl Into<String>) -> Self {
        self.default_tenant = Some(tenant.into());
        self
    }

    /// Sets the auth event bus buffer size.
    ///
    /// Default: 100
    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Builds the `CoreConfig`, validating all required dependencies.
    ///
    /// # Errors
    ///
    /// - `Error::CapabilityMissing` - no identity client factory was provided
    /// - `Error::Config` - a setting failed validation
    pub fn build(self) -> Result<CoreConfig> {
        let identity_client_factory = self
            .identity_client_factory
            .ok_or_else(identity_factory_missing_error)?;

        let config = CoreConfig {
            identity_client_factory,
            location_provider: self.location_provider,
            authority_host: self
                .authority_host
                .unwrap_or_else(|| DEFAULT_AUTHORITY_HOST.to_string()),
            default_tenant: self
                .default_tenant
                .unwrap_or_else(|| DEFAULT_TENANT.to_string()),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}
