//! Integration tests for the login/logout facade
//!
//! These tests drive `AuthManager` end to end against a scripted provider:
//! - Authority and redirect derivation
//! - Silent success without interactive acquisition
//! - Interactive fallback after any silent failure
//! - Failure causes surfaced unchanged
//! - Logout guard and logoutAll parity

use bridge_traits::{
    Account, CacheLocation, ClientConfiguration, IdentityClient, IdentityClientFactory,
    IdentityError, PopupTokenRequest, Prompt, SilentTokenRequest, StaticLocation, TokenResponse,
};
use core_auth::{AuthError, AuthManager, LoginOptions, LoginRequest, SessionConfig};
use core_runtime::config::CoreConfig;
use core_runtime::events::AuthEvent;
use std::sync::{Arc, Mutex};

// ============================================================================
// Scripted Provider
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Initialize,
    Silent(SilentTokenRequest),
    Popup(PopupTokenRequest),
    Logout,
}

/// Provider behavior shared by every client the factory creates.
struct Script {
    accounts: Vec<Account>,
    initialize: Result<(), IdentityError>,
    silent: Result<TokenResponse, IdentityError>,
    popup: Result<TokenResponse, IdentityError>,
    logout: Result<(), IdentityError>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            initialize: Ok(()),
            silent: Err(IdentityError::InteractionRequired("no cached token".to_string())),
            popup: Err(IdentityError::UserCancelled),
            logout: Ok(()),
        }
    }
}

#[derive(Default)]
struct Recorder {
    configurations: Mutex<Vec<ClientConfiguration>>,
    calls: Mutex<Vec<Call>>,
}

impl Recorder {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn popup_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Popup(_)))
            .count()
    }

    fn logout_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Logout))
            .count()
    }

    fn last_configuration(&self) -> ClientConfiguration {
        self.configurations
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("a client was created")
    }
}

struct ScriptedClient {
    script: Arc<Script>,
    recorder: Arc<Recorder>,
}

impl ScriptedClient {
    fn record(&self, call: Call) {
        self.recorder.calls.lock().unwrap().push(call);
    }
}

#[async_trait::async_trait]
impl IdentityClient for ScriptedClient {
    async fn initialize(&self) -> Result<(), IdentityError> {
        self.record(Call::Initialize);
        self.script.initialize.clone()
    }

    fn get_all_accounts(&self) -> Vec<Account> {
        self.script.accounts.clone()
    }

    async fn acquire_token_silent(
        &self,
        request: SilentTokenRequest,
    ) -> Result<TokenResponse, IdentityError> {
        self.record(Call::Silent(request));
        self.script.silent.clone()
    }

    async fn acquire_token_popup(
        &self,
        request: PopupTokenRequest,
    ) -> Result<TokenResponse, IdentityError> {
        self.record(Call::Popup(request));
        self.script.popup.clone()
    }

    async fn logout_popup(&self) -> Result<(), IdentityError> {
        self.record(Call::Logout);
        self.script.logout.clone()
    }
}

struct ScriptedFactory {
    script: Arc<Script>,
    recorder: Arc<Recorder>,
}

impl IdentityClientFactory for ScriptedFactory {
    fn create(
        &self,
        configuration: ClientConfiguration,
    ) -> Result<Box<dyn IdentityClient>, IdentityError> {
        self.recorder
            .configurations
            .lock()
            .unwrap()
            .push(configuration);
        Ok(Box::new(ScriptedClient {
            script: Arc::clone(&self.script),
            recorder: Arc::clone(&self.recorder),
        }))
    }
}

// ============================================================================
// Helpers
// ============================================================================

const CURRENT_URL: &str = "https://app.example.com/callback?code=xyz&state=abc#/home";

fn setup(script: Script) -> (AuthManager, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let factory = ScriptedFactory {
        script: Arc::new(script),
        recorder: Arc::clone(&recorder),
    };

    let config = CoreConfig::builder()
        .identity_client_factory(Arc::new(factory))
        .location_provider(Arc::new(StaticLocation::new(CURRENT_URL)))
        .build()
        .unwrap();

    (AuthManager::new(config), recorder)
}

fn account(home_account_id: &str) -> Account {
    Account {
        home_account_id: home_account_id.to_string(),
        environment: "login.windows.net".to_string(),
        tenant_id: "utid".to_string(),
        username: format!("{}@contoso.com", home_account_id),
        name: None,
    }
}

fn user_read_options() -> LoginOptions {
    LoginOptions::new(
        SessionConfig::new("abc").with_tenant("common"),
        LoginRequest::new(["User.Read"]),
    )
}

// ============================================================================
// Session context derivation
// ============================================================================

#[tokio::test]
async fn test_authority_derivation() {
    let cases = [
        (SessionConfig::new("abc"), "https://login.microsoftonline.com/common"),
        (
            SessionConfig::new("abc").with_tenant("contoso.onmicrosoft.com"),
            "https://login.microsoftonline.com/contoso.onmicrosoft.com",
        ),
        (
            SessionConfig::new("abc")
                .with_tenant("ignored")
                .with_authority_url("https://login.microsoftonline.us/contoso"),
            "https://login.microsoftonline.us/contoso",
        ),
    ];

    for (session, expected) in cases {
        let (manager, recorder) = setup(Script::default());
        let _ = manager.logout(&session).await;
        assert_eq!(recorder.last_configuration().authority, expected);
    }
}

#[tokio::test]
async fn test_redirect_defaults_to_current_page() {
    let (manager, recorder) = setup(Script::default());
    let _ = manager.logout(&SessionConfig::new("abc")).await;

    let configuration = recorder.last_configuration();
    assert_eq!(configuration.redirect_uri, "https://app.example.com/callback");
    assert_eq!(configuration.cache_location, CacheLocation::LocalStorage);
    assert_eq!(recorder.calls().first(), Some(&Call::Initialize));
}

#[tokio::test]
async fn test_explicit_redirect_wins() {
    let (manager, recorder) = setup(Script::default());
    let session = SessionConfig::new("abc").with_redirect_uri("http://localhost:8100/auth");
    let _ = manager.logout(&session).await;

    assert_eq!(
        recorder.last_configuration().redirect_uri,
        "http://localhost:8100/auth"
    );
}

#[tokio::test]
async fn test_each_call_builds_a_new_context() {
    let (manager, recorder) = setup(Script::default());
    let session = SessionConfig::new("abc");
    let _ = manager.logout(&session).await;
    let _ = manager.logout(&session).await;

    assert_eq!(recorder.configurations.lock().unwrap().len(), 2);
    let initializations = recorder
        .calls()
        .iter()
        .filter(|call| matches!(call, Call::Initialize))
        .count();
    assert_eq!(initializations, 2);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_silent_success() {
    let (manager, recorder) = setup(Script {
        accounts: vec![account("ada")],
        silent: Ok(TokenResponse::new("tok1", "id1")),
        popup: Err(IdentityError::Provider {
            code: "unexpected".to_string(),
            message: "interactive acquisition must not run".to_string(),
        }),
        ..Script::default()
    });

    let result = manager.login(&user_read_options()).await.unwrap();

    assert_eq!(result.access_token, "tok1");
    assert_eq!(result.id_token, "id1");
    assert_eq!(result.scopes, vec!["User.Read".to_string()]);
    assert_eq!(recorder.popup_calls(), 0);
}

#[tokio::test]
async fn test_login_falls_back_after_silent_rejection() {
    let (manager, recorder) = setup(Script {
        accounts: vec![account("ada")],
        silent: Err(IdentityError::Network("connection reset".to_string())),
        popup: Ok(TokenResponse::new("tok2", "id2")),
        ..Script::default()
    });

    let result = manager.login(&user_read_options()).await.unwrap();

    assert_eq!(result.access_token, "tok2");
    assert_eq!(result.id_token, "id2");
    assert_eq!(result.scopes, vec!["User.Read".to_string()]);

    let calls = recorder.calls();
    let silent_index = calls
        .iter()
        .position(|call| matches!(call, Call::Silent(_)))
        .expect("silent attempted");
    let popup_index = calls
        .iter()
        .position(|call| matches!(call, Call::Popup(_)))
        .expect("interactive attempted");
    assert!(silent_index < popup_index);
    assert_eq!(recorder.popup_calls(), 1);
}

#[tokio::test]
async fn test_login_falls_back_without_accounts() {
    let (manager, recorder) = setup(Script {
        popup: Ok(TokenResponse::new("tok2", "id2")),
        ..Script::default()
    });

    let options = LoginOptions::new(
        SessionConfig::new("abc"),
        LoginRequest::new(["User.Read", "Mail.Read"])
            .with_extra_query_parameter("login_hint", "ada@contoso.com")
            .with_extra_query_parameter("ui_locales", "de-DE"),
    );
    manager.login(&options).await.unwrap();

    let popups: Vec<PopupTokenRequest> = recorder
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Popup(request) => Some(request),
            _ => None,
        })
        .collect();
    assert_eq!(popups.len(), 1);
    assert_eq!(popups[0].prompt, Prompt::SelectAccount);
    assert_eq!(popups[0].scopes, vec!["User.Read", "Mail.Read"]);
    assert_eq!(
        popups[0].extra_query_parameters,
        options.request.extra_query_parameters
    );
    assert!(!recorder
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Silent(_))));
}

#[tokio::test]
async fn test_login_binds_first_account() {
    let (manager, recorder) = setup(Script {
        accounts: vec![account("first"), account("second")],
        silent: Ok(TokenResponse::new("tok1", "id1")),
        ..Script::default()
    });

    manager.login(&user_read_options()).await.unwrap();

    match recorder.calls().get(1) {
        Some(Call::Silent(request)) => {
            assert_eq!(request.account.home_account_id, "first");
            assert_eq!(request.scopes, vec!["User.Read"]);
        }
        other => panic!("Expected silent request, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_surfaces_interactive_failure() {
    let (manager, _recorder) = setup(Script {
        accounts: vec![account("ada")],
        popup: Err(IdentityError::PopupBlocked),
        ..Script::default()
    });
    let mut events = manager.subscribe();

    let err = manager.login(&user_read_options()).await.unwrap_err();
    assert_eq!(err.cause(), Some(&IdentityError::PopupBlocked));

    let mut observed = Vec::new();
    while let Ok(event) = events.try_recv() {
        observed.push(event);
    }
    assert!(observed.iter().any(|event| matches!(
        event,
        AuthEvent::SilentAcquisitionFailed { kind, .. } if kind == "interaction_required"
    )));
    assert!(matches!(
        observed.last(),
        Some(AuthEvent::AuthError { kind, .. }) if kind == "popup_blocked"
    ));
}

#[tokio::test]
async fn test_login_interactively_never_tries_silent() {
    let (manager, recorder) = setup(Script {
        accounts: vec![account("ada")],
        silent: Ok(TokenResponse::new("tok1", "id1")),
        popup: Ok(TokenResponse::new("tok2", "id2")),
        ..Script::default()
    });

    let result = manager
        .login_interactively(&user_read_options())
        .await
        .unwrap();

    assert_eq!(result.access_token, "tok2");
    assert!(!recorder
        .calls()
        .iter()
        .any(|call| matches!(call, Call::Silent(_))));
}

#[tokio::test]
async fn test_login_silently_surfaces_silent_failure() {
    let cause = IdentityError::Provider {
        code: "invalid_grant".to_string(),
        message: "refresh token expired".to_string(),
    };
    let (manager, recorder) = setup(Script {
        accounts: vec![account("ada")],
        silent: Err(cause.clone()),
        popup: Ok(TokenResponse::new("tok2", "id2")),
        ..Script::default()
    });

    let err = manager
        .login_silently(&user_read_options())
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::SilentAcquisition(cause));
    assert_eq!(recorder.popup_calls(), 0);
}

#[tokio::test]
async fn test_login_surfaces_initialization_failure() {
    let (manager, recorder) = setup(Script {
        initialize: Err(IdentityError::InvalidConfiguration(
            "unknown authority".to_string(),
        )),
        ..Script::default()
    });

    let err = manager.login(&user_read_options()).await.unwrap_err();

    assert_eq!(
        err,
        AuthError::Initialization(IdentityError::InvalidConfiguration(
            "unknown authority".to_string()
        ))
    );
    assert_eq!(recorder.calls(), vec![Call::Initialize]);
}

#[tokio::test]
async fn test_login_from_host_json() {
    let (manager, _recorder) = setup(Script {
        accounts: vec![account("ada")],
        silent: Ok(TokenResponse::new("tok1", "id1")),
        ..Script::default()
    });

    let options =
        LoginOptions::from_json(r#"{"clientId":"abc","tenant":"common","scopes":["User.Read"]}"#)
            .unwrap();
    let result = manager.login(&options).await.unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "accessToken": "tok1",
            "idToken": "id1",
            "scopes": ["User.Read"]
        })
    );
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn test_logout_without_accounts() {
    let (manager, recorder) = setup(Script::default());

    let err = manager
        .logout(&SessionConfig::new("abc"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::NoAccountToLogout);
    assert_eq!(err.to_string(), "Nothing to sign out from.");
    assert_eq!(recorder.logout_calls(), 0);
}

#[tokio::test]
async fn test_logout_with_one_account() {
    let (manager, recorder) = setup(Script {
        accounts: vec![account("ada")],
        ..Script::default()
    });

    manager.logout(&SessionConfig::new("abc")).await.unwrap();
    assert_eq!(recorder.logout_calls(), 1);
}

#[tokio::test]
async fn test_logout_surfaces_provider_failure() {
    let (manager, recorder) = setup(Script {
        accounts: vec![account("ada")],
        logout: Err(IdentityError::PopupBlocked),
        ..Script::default()
    });

    let err = manager
        .logout(&SessionConfig::new("abc"))
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::Logout(IdentityError::PopupBlocked));
    assert_eq!(recorder.logout_calls(), 1);
}

#[tokio::test]
async fn test_logout_all_matches_logout() {
    let scripts = || {
        vec![
            Script::default(),
            Script {
                accounts: vec![account("ada"), account("bob")],
                ..Script::default()
            },
            Script {
                accounts: vec![account("ada")],
                logout: Err(IdentityError::UserCancelled),
                ..Script::default()
            },
        ]
    };

    for (single, all) in scripts().into_iter().zip(scripts()) {
        let (single_manager, single_recorder) = setup(single);
        let (all_manager, all_recorder) = setup(all);
        let session = SessionConfig::new("abc");

        let single_result = single_manager.logout(&session).await;
        let all_result = all_manager.logout_all(&session).await;

        assert_eq!(single_result, all_result);
        assert_eq!(single_recorder.calls(), all_recorder.calls());
    }
}
