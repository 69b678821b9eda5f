//! # Token Acquisition
//!
//! Drives login and logout against an initialized [`SessionContext`].
//!
//! ## Login modes
//!
//! | mode          | stages                                   |
//! |---------------|------------------------------------------|
//! | `Fallback`    | silent, then interactive if silent fails |
//! | `Interactive` | interactive only                         |
//! | `Silent`      | silent only                              |
//!
//! In `Fallback` mode every silent failure leads to the interactive stage.
//! The silent failure's kind is logged and published as
//! [`AuthEvent::SilentAcquisitionFailed`], never inspected.
//!
//! ## Failure reporting
//!
//! The final failure of an operation is logged with `error!` and published as
//! [`AuthEvent::AuthError`]; the caller then receives that same error.
//! Event emission does not affect the returned value.

use crate::context::SessionContext;
use crate::error::{AuthError, Result};
use crate::types::{AccountSelection, AuthResult, LoginMode, LoginRequest};
use bridge_traits::{IdentityError, PopupTokenRequest, Prompt, SilentTokenRequest};
use core_runtime::events::{AuthEvent, EventBus};
use core_runtime::logging::redact_if_sensitive;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Silent/interactive acquisition policy and logout over a provider client.
#[derive(Debug, Clone)]
pub struct TokenAcquisitionOrchestrator {
    event_bus: EventBus,
    account_selection: AccountSelection,
}

impl TokenAcquisitionOrchestrator {
    pub fn new(event_bus: EventBus) -> Self {
        Self {
            event_bus,
            account_selection: AccountSelection::default(),
        }
    }

    /// Bind silent acquisition to a different cached account.
    pub fn with_account_selection(mut self, selection: AccountSelection) -> Self {
        self.account_selection = selection;
        self
    }

    pub fn account_selection(&self) -> &AccountSelection {
        &self.account_selection
    }

    /// Silent acquisition with a single interactive fallback.
    pub async fn login(&self, context: &SessionContext, request: &LoginRequest) -> Result<AuthResult> {
        self.acquire(LoginMode::Fallback, context, request, Uuid::new_v4())
            .await
    }

    /// Interactive acquisition only.
    pub async fn login_interactively(
        &self,
        context: &SessionContext,
        request: &LoginRequest,
    ) -> Result<AuthResult> {
        self.acquire(LoginMode::Interactive, context, request, Uuid::new_v4())
            .await
    }

    /// Silent acquisition only; never opens provider UI.
    pub async fn login_silently(
        &self,
        context: &SessionContext,
        request: &LoginRequest,
    ) -> Result<AuthResult> {
        self.acquire(LoginMode::Silent, context, request, Uuid::new_v4())
            .await
    }

    /// Run a login in `mode`, tagging every provider call with `correlation_id`.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidRequest` - no usable scopes; no provider call is made
    /// - `AuthError::SilentAcquisition` - `Silent` mode only
    /// - `AuthError::InteractiveAcquisition` - `Fallback` and `Interactive` modes
    pub async fn acquire(
        &self,
        mode: LoginMode,
        context: &SessionContext,
        request: &LoginRequest,
        correlation_id: Uuid,
    ) -> Result<AuthResult> {
        if let Err(e) = request.validate() {
            self.report_failure(mode.operation(), Some(correlation_id), &e);
            return Err(e);
        }

        self.acquire_validated(mode, context, request, correlation_id)
            .await
    }

    /// [`acquire`](Self::acquire) for a request the caller already validated.
    #[instrument(
        skip(self, context, request),
        fields(
            mode = %mode,
            correlation_id = %correlation_id,
            client_id = %context.configuration().client_id
        )
    )]
    pub(crate) async fn acquire_validated(
        &self,
        mode: LoginMode,
        context: &SessionContext,
        request: &LoginRequest,
        correlation_id: Uuid,
    ) -> Result<AuthResult> {
        let _ = self.event_bus.emit(AuthEvent::SigningIn {
            mode: mode.as_str().to_string(),
            correlation_id: correlation_id.to_string(),
        });
        debug!(scopes = ?request.scopes, "Starting token acquisition");

        let outcome = match mode {
            LoginMode::Silent => self
                .acquire_silently(context, request, correlation_id)
                .await
                .map_err(AuthError::SilentAcquisition),
            LoginMode::Interactive => self
                .acquire_interactively(context, request, correlation_id)
                .await
                .map_err(AuthError::InteractiveAcquisition),
            LoginMode::Fallback => {
                match self
                    .acquire_silently(context, request, correlation_id)
                    .await
                {
                    Ok(result) => Ok(result),
                    Err(cause) => {
                        warn!(
                            kind = cause.kind(),
                            error = %cause,
                            "Silent acquisition failed, falling back to interactive"
                        );
                        let _ = self.event_bus.emit(AuthEvent::SilentAcquisitionFailed {
                            correlation_id: correlation_id.to_string(),
                            kind: cause.kind().to_string(),
                            message: cause.to_string(),
                        });

                        self.acquire_interactively(context, request, correlation_id)
                            .await
                            .map_err(AuthError::InteractiveAcquisition)
                    }
                }
            }
        };

        match outcome {
            Ok(result) => {
                info!("Token acquisition succeeded");
                let _ = self.event_bus.emit(AuthEvent::SignedIn {
                    mode: mode.as_str().to_string(),
                    correlation_id: correlation_id.to_string(),
                });
                Ok(result)
            }
            Err(e) => {
                self.report_failure(mode.operation(), Some(correlation_id), &e);
                Err(e)
            }
        }
    }

    /// End the provider session for the cached account.
    ///
    /// # Errors
    ///
    /// - `AuthError::NoAccountToLogout` - the provider knows no accounts; the
    ///   provider logout flow is not started
    /// - `AuthError::Logout` - the provider logout flow failed
    pub async fn logout(&self, context: &SessionContext) -> Result<()> {
        self.sign_out("logout", context, Uuid::new_v4()).await
    }

    /// Same as [`logout`](Self::logout). Only the cached session the provider
    /// logs out of is ended; other accounts stay signed in.
    pub async fn logout_all(&self, context: &SessionContext) -> Result<()> {
        self.sign_out("logout_all", context, Uuid::new_v4()).await
    }

    #[instrument(skip(self, context), fields(correlation_id = %correlation_id))]
    pub(crate) async fn sign_out(
        &self,
        operation: &'static str,
        context: &SessionContext,
        correlation_id: Uuid,
    ) -> Result<()> {
        let accounts = context.client().get_all_accounts();
        if accounts.is_empty() {
            let e = AuthError::NoAccountToLogout;
            self.report_failure(operation, Some(correlation_id), &e);
            return Err(e);
        }

        debug!(accounts = accounts.len(), "Starting provider logout");
        let _ = self.event_bus.emit(AuthEvent::SigningOut {
            correlation_id: correlation_id.to_string(),
        });

        match context.client().logout_popup().await {
            Ok(()) => {
                info!("Signed out");
                let _ = self.event_bus.emit(AuthEvent::SignedOut {
                    correlation_id: correlation_id.to_string(),
                });
                Ok(())
            }
            Err(cause) => {
                let e = AuthError::Logout(cause);
                self.report_failure(operation, Some(correlation_id), &e);
                Err(e)
            }
        }
    }

    async fn acquire_silently(
        &self,
        context: &SessionContext,
        request: &LoginRequest,
        correlation_id: Uuid,
    ) -> std::result::Result<AuthResult, IdentityError> {
        let accounts = context.client().get_all_accounts();
        let account = self
            .account_selection
            .select(&accounts)
            .ok_or(IdentityError::NoAccount)?;

        debug!(
            account = %redact_if_sensitive("account", &account.username),
            selection = %self.account_selection,
            "Acquiring token silently"
        );

        let response = context
            .client()
            .acquire_token_silent(SilentTokenRequest {
                scopes: request.scopes.clone(),
                account,
                correlation_id,
            })
            .await?;

        AuthResult::from_response(response, &request.scopes)
    }

    async fn acquire_interactively(
        &self,
        context: &SessionContext,
        request: &LoginRequest,
        correlation_id: Uuid,
    ) -> std::result::Result<AuthResult, IdentityError> {
        debug!(prompt = %Prompt::SelectAccount, "Acquiring token interactively");

        let response = context
            .client()
            .acquire_token_popup(PopupTokenRequest {
                prompt: Prompt::SelectAccount,
                scopes: request.scopes.clone(),
                extra_query_parameters: request.extra_query_parameters.clone(),
                correlation_id,
            })
            .await?;

        AuthResult::from_response(response, &request.scopes)
    }

    /// Log `err` and publish it as an [`AuthEvent::AuthError`].
    pub(crate) fn report_failure(
        &self,
        operation: &'static str,
        correlation_id: Option<Uuid>,
        err: &AuthError,
    ) {
        error!(operation, kind = err.kind(), error = %err, "Authentication operation failed");
        let _ = self.event_bus.emit(AuthEvent::AuthError {
            operation: operation.to_string(),
            correlation_id: correlation_id.map(|id| id.to_string()),
            kind: err.kind().to_string(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
        });
    }
}
