//! Login flow demonstration
//!
//! Runs the facade against an in-memory provider whose account cache
//! survives between calls, the way a durable browser cache would.
//!
//! Run with:
//! ```bash
//! cargo run -p core-auth --example login_demo
//!
//! # JSON logs with debug output from the core
//! cargo run -p core-auth --example login_demo -- json "core_auth=debug"
//! ```

use bridge_traits::log::LogLevel;
use bridge_traits::{
    Account, ClientConfiguration, IdentityClient, IdentityClientFactory, IdentityError,
    PopupTokenRequest, SilentTokenRequest, StaticLocation, TokenResponse,
};
use core_auth::{AuthManager, LoginOptions};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventSeverity, EventStream};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use std::env;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Stands in for the provider's persisted account cache.
type AccountCache = Arc<Mutex<Vec<Account>>>;

struct InMemoryClient {
    cache: AccountCache,
}

#[async_trait::async_trait]
impl IdentityClient for InMemoryClient {
    async fn initialize(&self) -> Result<(), IdentityError> {
        Ok(())
    }

    fn get_all_accounts(&self) -> Vec<Account> {
        self.cache.lock().map(|cache| cache.clone()).unwrap_or_default()
    }

    async fn acquire_token_silent(
        &self,
        request: SilentTokenRequest,
    ) -> Result<TokenResponse, IdentityError> {
        let mut response = TokenResponse::new(
            format!("access-{}", request.correlation_id),
            format!("id-{}", request.account.home_account_id),
        );
        response.account = Some(request.account);
        Ok(response)
    }

    async fn acquire_token_popup(
        &self,
        request: PopupTokenRequest,
    ) -> Result<TokenResponse, IdentityError> {
        let account = Account {
            home_account_id: "00000000-0000-0000-0000-000000000001.9188040d".to_string(),
            environment: "login.windows.net".to_string(),
            tenant_id: "9188040d-6c67-4c5b-b112-36a304b66dad".to_string(),
            username: request
                .extra_query_parameters
                .get("login_hint")
                .cloned()
                .unwrap_or_else(|| "demo@contoso.com".to_string()),
            name: Some("Demo User".to_string()),
        };

        if let Ok(mut cache) = self.cache.lock() {
            cache.push(account.clone());
        }

        let mut response = TokenResponse::new(
            format!("access-{}", request.correlation_id),
            format!("id-{}", account.home_account_id),
        );
        response.account = Some(account);
        Ok(response)
    }

    async fn logout_popup(&self) -> Result<(), IdentityError> {
        if let Ok(mut cache) = self.cache.lock() {
            cache.clear();
        }
        Ok(())
    }
}

struct InMemoryFactory {
    cache: AccountCache,
}

impl IdentityClientFactory for InMemoryFactory {
    fn create(
        &self,
        configuration: ClientConfiguration,
    ) -> Result<Box<dyn IdentityClient>, IdentityError> {
        info!(
            authority = %configuration.authority,
            redirect_uri = %configuration.redirect_uri,
            "Provider client created"
        );
        Ok(Box::new(InMemoryClient {
            cache: Arc::clone(&self.cache),
        }))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        Some("pretty") => LogFormat::Pretty,
        _ => LogFormat::default(),
    };

    let mut logging = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Info)
        .with_spans(true);
    if let Some(filter) = args.get(2) {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging)?;

    let config = CoreConfig::builder()
        .identity_client_factory(Arc::new(InMemoryFactory {
            cache: Arc::new(Mutex::new(Vec::new())),
        }))
        .location_provider(Arc::new(StaticLocation::new(
            "http://localhost:3000/index.html?debug=1#/settings",
        )))
        .build()?;
    let manager = AuthManager::new(config);

    let mut events = EventStream::new(manager.subscribe())
        .filter(|event| event.severity() >= EventSeverity::Info);
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            println!("[event] {:?} {}", event.severity(), event.description());
        }
    });

    let options = LoginOptions::from_json(
        r#"{
            "clientId": "6731de76-14a6-49ae-97bc-6eba6914391e",
            "tenant": "contoso.onmicrosoft.com",
            "scopes": ["User.Read"],
            "extraQueryParameters": {"login_hint": "ada@contoso.com"}
        }"#,
    )?;

    // Empty cache: silent fails and the popup flow signs the user in
    let first = manager.login(&options).await?;
    info!(scopes = ?first.scopes, "First login complete");

    // Cached account: silent acquisition succeeds
    let second = manager.login_silently(&options).await?;
    info!(scopes = ?second.scopes, "Silent login complete");

    manager.logout(&options.session).await?;
    info!("Logged out");

    if let Err(e) = manager.logout_all(&options.session).await {
        info!(error = %e, "Second logout rejected");
    }

    tokio::task::yield_now().await;
    Ok(())
}
