use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use biasbuster_api_client::ApiClient;
use biasbuster_conversation::{Account, ChatError, Controller};
use biasbuster_core::{Model, SessionStore};
use biasbuster_local_store::FileSessionStore;
use biasbuster_runtime_config::ClientConfig;

/// Everything a command needs to talk to the server.
pub struct Connection {
    pub api: Arc<ApiClient>,
    pub session: Arc<FileSessionStore>,
    pub config: ClientConfig,
}

impl Connection {
    pub fn open(config: ClientConfig) -> Result<Self> {
        let session =
            Arc::new(FileSessionStore::open_default().context("Could not open session store")?);
        let store: Arc<dyn SessionStore> = session.clone();
        let api = ApiClient::new(
            &config.server.url,
            Duration::from_secs(config.server.timeout_secs),
            store,
        )
        .context("Failed to build HTTP client")?;
        Ok(Self {
            api: Arc::new(api),
            session,
            config,
        })
    }

    pub fn account(&self) -> Account {
        Account::new(self.api.clone(), self.session.clone())
    }

    pub fn controller(&self, model: Option<Model>) -> Controller {
        let model = model.unwrap_or_else(|| self.config.chat.model());
        Controller::new(self.api.clone()).with_model(model)
    }
}

/// Attach a login hint to errors caused by a missing or rejected token.
pub fn explain(err: ChatError) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::Error::new(err).context("Not logged in (run `biasbuster login`)")
    } else {
        anyhow::Error::new(err)
    }
}
