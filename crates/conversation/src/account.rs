use std::sync::Arc;

use biasbuster_api::{AuthResponse, LoginRequest, SignupRequest, SignupResponse, UserResponse};
use biasbuster_core::SessionStore;
use tracing::info;

use crate::backend::ChatBackend;
use crate::error::ChatError;

/// First screen to show, decided from the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartRoute {
    Chat,
    Login,
}

/// Login state on top of the session store.
pub struct Account {
    backend: Arc<dyn ChatBackend>,
    session: Arc<dyn SessionStore>,
}

impl Account {
    pub fn new(backend: Arc<dyn ChatBackend>, session: Arc<dyn SessionStore>) -> Self {
        Self { backend, session }
    }

    pub fn restore(&self) -> StartRoute {
        if self.session.is_authenticated() {
            StartRoute::Chat
        } else {
            StartRoute::Login
        }
    }

    /// Authenticate and persist the returned token.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ChatError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .backend
            .authenticate(&req)
            .await
            .map_err(ChatError::Network)?;
        self.session.set_token(resp.token.clone());
        info!(email, "logged in");
        Ok(resp)
    }

    /// Register a new account. The user still has to log in afterwards.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SignupResponse, ChatError> {
        let req = SignupRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = self
            .backend
            .register(&req)
            .await
            .map_err(ChatError::Network)?;
        info!(username, "account created");
        Ok(resp)
    }

    pub fn logout(&self) {
        self.session.clear();
        info!("logged out");
    }

    pub async fn whoami(&self) -> Result<UserResponse, ChatError> {
        self.backend
            .current_user()
            .await
            .map_err(ChatError::Network)
    }
}

#[cfg(test)]
mod tests {
    use biasbuster_core::MemorySessionStore;

    use super::*;
    use crate::fake::{FakeBackend, server_error};

    fn account(session: Arc<MemorySessionStore>) -> (Arc<FakeBackend>, Account) {
        let fake = Arc::new(FakeBackend::new());
        (fake.clone(), Account::new(fake, session))
    }

    #[tokio::test]
    async fn restore_routes_by_stored_token() {
        let (_, anon) = account(Arc::new(MemorySessionStore::new()));
        assert_eq!(anon.restore(), StartRoute::Login);

        let (_, known) = account(Arc::new(MemorySessionStore::with_token("t")));
        assert_eq!(known.restore(), StartRoute::Chat);
    }

    #[tokio::test]
    async fn login_stores_token() {
        let session = Arc::new(MemorySessionStore::new());
        let (_, account) = account(session.clone());

        account.login("ana@example.com", "pw").await.unwrap();

        assert_eq!(session.token().as_deref(), Some("token-for-ana@example.com"));
        assert_eq!(account.restore(), StartRoute::Chat);
    }

    #[tokio::test]
    async fn failed_login_leaves_session_alone() {
        let session = Arc::new(MemorySessionStore::with_token("old"));
        let (fake, account) = account(session.clone());
        fake.push_login(Err(server_error("Invalid credentials")));

        let err = account.login("ana@example.com", "bad").await.unwrap_err();

        assert!(err.to_string().contains("Invalid credentials"));
        assert_eq!(session.token().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn signup_does_not_log_in() {
        let session = Arc::new(MemorySessionStore::new());
        let (_, account) = account(session.clone());

        let resp = account.signup("ana", "ana@example.com", "pw").await.unwrap();

        assert_eq!(resp.user.unwrap().username, "ana");
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let session = Arc::new(MemorySessionStore::with_token("t"));
        let (_, account) = account(session.clone());

        account.logout();

        assert!(session.token().is_none());
        assert_eq!(account.restore(), StartRoute::Login);
    }

    #[tokio::test]
    async fn whoami_returns_current_user() {
        let (_, account) = account(Arc::new(MemorySessionStore::with_token("t")));
        let user = account.whoami().await.unwrap();
        assert_eq!(user.email, "ana@example.com");
    }
}
