//! # Authentication Manager
//!
//! Host-facing facade over session contexts and token acquisition.
//!
//! ## Overview
//!
//! Each operation builds a fresh [`SessionContext`] from the caller's
//! [`SessionConfig`], runs one orchestration step against it and drops it.
//! Nothing is cached between calls, so an `AuthManager` can be shared
//! across tasks behind an `Arc`.
//!
//! ## Usage
//!
//! ```no_run
//! use core_auth::{AuthManager, LoginOptions};
//! use core_runtime::config::CoreConfig;
//! # use bridge_traits::{ClientConfiguration, IdentityClient, IdentityClientFactory, IdentityError};
//! # use std::sync::Arc;
//! # struct MsalFactory;
//! # impl IdentityClientFactory for MsalFactory {
//! #     fn create(&self, _c: ClientConfiguration) -> Result<Box<dyn IdentityClient>, IdentityError> {
//! #         Err(IdentityError::NotInitialized)
//! #     }
//! # }
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CoreConfig::builder()
//!     .identity_client_factory(Arc::new(MsalFactory))
//!     .build()?;
//! let manager = AuthManager::new(config);
//!
//! let options = LoginOptions::from_json(
//!     r#"{"clientId":"abc","redirectUri":"http://localhost:3000","scopes":["User.Read"]}"#,
//! )?;
//! let result = manager.login(&options).await?;
//! println!("signed in for {:?}", result.scopes);
//!
//! manager.logout(&options.session).await?;
//! # Ok(())
//! # }
//! ```

use crate::context::{SessionContext, SessionContextFactory};
use crate::error::Result;
use crate::orchestrator::TokenAcquisitionOrchestrator;
use crate::types::{AccountSelection, AuthResult, LoginMode, LoginOptions, SessionConfig};
use core_runtime::config::CoreConfig;
use core_runtime::events::{AuthEvent, EventBus, Receiver};
use tracing::instrument;
use uuid::Uuid;

/// Login and logout entry points for host glue.
#[derive(Debug, Clone)]
pub struct AuthManager {
    contexts: SessionContextFactory,
    orchestrator: TokenAcquisitionOrchestrator,
    event_bus: EventBus,
}

impl AuthManager {
    /// Creates a manager from validated runtime configuration.
    pub fn new(config: CoreConfig) -> Self {
        let event_bus = EventBus::new(config.event_buffer_size);
        Self {
            contexts: SessionContextFactory::new(&config),
            orchestrator: TokenAcquisitionOrchestrator::new(event_bus.clone()),
            event_bus,
        }
    }

    /// Choose which cached account silent acquisition uses.
    ///
    /// Default: [`AccountSelection::First`]
    pub fn with_account_selection(mut self, selection: AccountSelection) -> Self {
        self.orchestrator = self.orchestrator.with_account_selection(selection);
        self
    }

    /// Bus the manager publishes [`AuthEvent`]s on
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn subscribe(&self) -> Receiver<AuthEvent> {
        self.event_bus.subscribe()
    }

    /// Sign in silently, falling back to the interactive flow once.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidConfig` / `AuthError::InvalidRequest` - rejected
    ///   before any provider call
    /// - `AuthError::Initialization` - the provider client could not start
    /// - `AuthError::InteractiveAcquisition` - the fallback also failed
    #[instrument(skip(self, options), fields(client_id = %options.session.client_id))]
    pub async fn login(&self, options: &LoginOptions) -> Result<AuthResult> {
        self.run_login(LoginMode::Fallback, options).await
    }

    /// Sign in through the interactive flow, always showing the account picker.
    #[instrument(skip(self, options), fields(client_id = %options.session.client_id))]
    pub async fn login_interactively(&self, options: &LoginOptions) -> Result<AuthResult> {
        self.run_login(LoginMode::Interactive, options).await
    }

    /// Sign in from the provider's cache only.
    #[instrument(skip(self, options), fields(client_id = %options.session.client_id))]
    pub async fn login_silently(&self, options: &LoginOptions) -> Result<AuthResult> {
        self.run_login(LoginMode::Silent, options).await
    }

    /// Sign out of the cached account.
    ///
    /// # Errors
    ///
    /// - `AuthError::NoAccountToLogout` - nothing is signed in
    /// - `AuthError::Logout` - the provider logout flow failed
    #[instrument(skip(self, session), fields(client_id = %session.client_id))]
    pub async fn logout(&self, session: &SessionConfig) -> Result<()> {
        self.run_logout("logout", session).await
    }

    /// Behaves exactly like [`logout`](Self::logout).
    #[instrument(skip(self, session), fields(client_id = %session.client_id))]
    pub async fn logout_all(&self, session: &SessionConfig) -> Result<()> {
        self.run_logout("logout_all", session).await
    }

    async fn run_login(&self, mode: LoginMode, options: &LoginOptions) -> Result<AuthResult> {
        let correlation_id = Uuid::new_v4();

        if let Err(e) = options.request.validate() {
            self.orchestrator
                .report_failure(mode.operation(), Some(correlation_id), &e);
            return Err(e);
        }

        let context = self
            .open_context(mode.operation(), &options.session, correlation_id)
            .await?;

        self.orchestrator
            .acquire_validated(mode, &context, &options.request, correlation_id)
            .await
    }

    async fn run_logout(&self, operation: &'static str, session: &SessionConfig) -> Result<()> {
        let correlation_id = Uuid::new_v4();
        let context = self
            .open_context(operation, session, correlation_id)
            .await?;

        self.orchestrator
            .sign_out(operation, &context, correlation_id)
            .await
    }

    async fn open_context(
        &self,
        operation: &'static str,
        session: &SessionConfig,
        correlation_id: Uuid,
    ) -> Result<SessionContext> {
        match self.contexts.create_context(session).await {
            Ok(context) => Ok(context),
            Err(e) => {
                self.orchestrator
                    .report_failure(operation, Some(correlation_id), &e);
                Err(e)
            }
        }
    }
}
