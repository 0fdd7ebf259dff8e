use std::sync::Arc;

use tracing::info;

use crate::api_client::{ApiClient, HttpTransport, ReqwestTransport};
use crate::config::Config;
use crate::contract::{Credentials, Identity};
use crate::errors::ClientError;
use crate::services::{AuthService, InterviewService, JobService, ResumeService};
use crate::session::storage::{CredentialStorage, FileCredentialStorage};
use crate::session::{Resolution, SessionStore};

/// Everything a client front end needs, wired around one session store.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session: Arc<SessionStore>,
    pub auth: AuthService,
    pub jobs: JobService,
    pub resumes: ResumeService,
    pub interview: InterviewService,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&config.api_url, config.timeout)
            .map_err(|e| ClientError::Transport(e.0))?;
        info!("API base URL: {}", transport.base_url());
        let storage = FileCredentialStorage::new(&config.credentials_path);
        info!("Credential file: {}", storage.path().display());
        Ok(Self::with_parts(config, Arc::new(transport), Arc::new(storage)))
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn HttpTransport>,
        storage: Arc<dyn CredentialStorage>,
    ) -> Self {
        let auth = AuthService::new(transport.clone());
        let session = Arc::new(SessionStore::new(storage, Arc::new(auth.clone())));
        let api = ApiClient::new(transport, session.clone());
        Self {
            config,
            session,
            auth,
            jobs: JobService::new(api.clone()),
            resumes: ResumeService::new(api.clone()),
            interview: InterviewService::new(api),
        }
    }

    /// Exchanges credentials for a token and starts a session with it.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, ClientError> {
        let credential = self.auth.request_token(credentials).await?;
        match self.session.login(credential).await? {
            Resolution::Committed(identity) => Ok(identity),
            Resolution::Superseded => Err(ClientError::Authentication(
                "sign-in was superseded by a newer session change".to_string(),
            )),
        }
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<Identity, ClientError> {
        self.auth.register(credentials).await
    }

    pub fn logout(&self) {
        self.session.logout();
    }
}
