//! Provider doubles shared by the unit tests.

use bridge_traits::{
    Account, ClientConfiguration, IdentityClient, IdentityClientFactory, IdentityError,
    PopupTokenRequest, SilentTokenRequest, TokenResponse,
};
use mockall::mock;
use std::sync::Mutex;

mock! {
    pub Client {}

    #[async_trait::async_trait]
    impl IdentityClient for Client {
        async fn initialize(&self) -> Result<(), IdentityError>;
        fn get_all_accounts(&self) -> Vec<Account>;
        async fn acquire_token_silent(
            &self,
            request: SilentTokenRequest,
        ) -> Result<TokenResponse, IdentityError>;
        async fn acquire_token_popup(
            &self,
            request: PopupTokenRequest,
        ) -> Result<TokenResponse, IdentityError>;
        async fn logout_popup(&self) -> Result<(), IdentityError>;
    }
}

/// Hands out one prepared client and records the configuration it was asked for.
pub struct OneShotFactory {
    client: Mutex<Option<MockClient>>,
    pub seen: Mutex<Option<ClientConfiguration>>,
}

impl OneShotFactory {
    pub fn new(client: MockClient) -> Self {
        Self {
            client: Mutex::new(Some(client)),
            seen: Mutex::new(None),
        }
    }
}

impl IdentityClientFactory for OneShotFactory {
    fn create(
        &self,
        configuration: ClientConfiguration,
    ) -> Result<Box<dyn IdentityClient>, IdentityError> {
        *self.seen.lock().unwrap() = Some(configuration);
        self.client
            .lock()
            .unwrap()
            .take()
            .map(|client| Box::new(client) as Box<dyn IdentityClient>)
            .ok_or_else(|| IdentityError::InvalidConfiguration("client already taken".to_string()))
    }
}

pub fn account(home_account_id: &str, username: &str) -> Account {
    Account {
        home_account_id: home_account_id.to_string(),
        environment: "login.windows.net".to_string(),
        tenant_id: "9188040d-6c67-4c5b-b112-36a304b66dad".to_string(),
        username: username.to_string(),
        name: None,
    }
}

/// Client whose `initialize` succeeds once
pub fn initialized_client() -> MockClient {
    let mut client = MockClient::new();
    client.expect_initialize().times(1).returning(|| Ok(()));
    client
}
