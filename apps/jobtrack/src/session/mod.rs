//! Session Store — single source of truth for authentication state.
//!
//! All transitions go through one `watch` cell. Every bootstrap, login and
//! logout bumps the cell's generation inside the write section, together
//! with the matching credential-storage write. An identity resolution only
//! commits if the generation it started with is still current; otherwise its
//! result is dropped (last started wins).
//!
//! Identity resolution fails closed: any error, including a network failure,
//! signs the session out and clears the persisted credential.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::contract::Identity;
use crate::errors::ClientError;

pub mod guard;
pub mod storage;

use storage::CredentialStorage;

/// Opaque bearer token. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Bootstrap has not run yet.
    Uninitialized,
    Loading,
    Authenticated(Identity),
    Unauthenticated,
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Resolves the identity behind a credential (the "who am I" call).
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, credential: &Credential) -> Result<Identity, ClientError>;
}

/// Supplies the credential the gateway attaches to outgoing calls.
pub trait CredentialSource: Send + Sync {
    fn current_credential(&self) -> Option<Credential>;
}

/// Outcome of a login or bootstrap resolution that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Committed(Identity),
    /// A newer login/bootstrap/logout started while this one was in flight;
    /// its result was discarded.
    Superseded,
}

#[derive(Debug, Clone)]
struct SessionCell {
    state: SessionState,
    credential: Option<Credential>,
    generation: u64,
}

pub struct SessionStore {
    cell: watch::Sender<SessionCell>,
    storage: Arc<dyn CredentialStorage>,
    resolver: Arc<dyn IdentityResolver>,
    bootstrapped: AtomicBool,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn CredentialStorage>, resolver: Arc<dyn IdentityResolver>) -> Self {
        let (cell, _) = watch::channel(SessionCell {
            state: SessionState::Uninitialized,
            credential: None,
            generation: 0,
        });
        Self {
            cell,
            storage,
            resolver,
            bootstrapped: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        self.cell.borrow().state.clone()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.cell.borrow().state.identity().cloned()
    }

    pub fn subscribe(&self) -> SessionWatcher {
        SessionWatcher {
            rx: self.cell.subscribe(),
        }
    }

    /// Restores the persisted session. Runs once per store; later calls
    /// return the current state without touching storage or the network.
    /// A call made while the first is still resolving returns `Loading`;
    /// wait for the outcome through [`SessionStore::subscribe`] (or
    /// `RouteGuard::settle`).
    pub async fn bootstrap(&self) -> SessionState {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            debug!("Session already bootstrapped");
            return self.state();
        }
        self.run_bootstrap().await
    }

    /// Explicit re-bootstrap request.
    pub async fn rebootstrap(&self) -> SessionState {
        self.bootstrapped.store(true, Ordering::SeqCst);
        self.run_bootstrap().await
    }

    async fn run_bootstrap(&self) -> SessionState {
        let mut started: Option<(u64, Credential)> = None;
        self.cell.send_modify(|cell| {
            cell.generation += 1;
            let stored = self.storage.load().unwrap_or_else(|e| {
                warn!("Could not read persisted credential, treating as absent: {e}");
                None
            });
            match stored {
                Some(credential) => {
                    cell.credential = Some(credential.clone());
                    cell.state = SessionState::Loading;
                    started = Some((cell.generation, credential));
                }
                None => {
                    cell.credential = None;
                    cell.state = SessionState::Unauthenticated;
                }
            }
        });

        let Some((generation, credential)) = started else {
            info!("No persisted credential; session is unauthenticated");
            return self.state();
        };

        debug!("Persisted credential found; resolving identity");
        if let Err(e) = self.resolve_and_commit(generation, credential).await {
            debug!("Bootstrap ended unauthenticated: {e}");
        }
        self.state()
    }

    /// Persists `credential` and resolves the identity behind it.
    pub async fn login(&self, credential: Credential) -> Result<Resolution, ClientError> {
        let mut generation = 0;
        let mut saved = Ok(());
        self.cell.send_modify(|cell| {
            cell.generation += 1;
            generation = cell.generation;
            saved = self.storage.save(&credential);
            if saved.is_ok() {
                cell.credential = Some(credential.clone());
                cell.state = SessionState::Loading;
            } else {
                self.clear_storage();
                cell.credential = None;
                cell.state = SessionState::Unauthenticated;
            }
        });
        if let Err(e) = saved {
            warn!("Could not persist credential: {e}");
            return Err(e.into());
        }

        info!("Login started; resolving identity");
        self.resolve_and_commit(generation, credential).await
    }

    /// Signs out from any state. Never fails; a storage failure is logged.
    pub fn logout(&self) {
        self.cell.send_modify(|cell| {
            cell.generation += 1;
            self.clear_storage();
            cell.credential = None;
            cell.state = SessionState::Unauthenticated;
        });
        info!("Signed out");
    }

    async fn resolve_and_commit(
        &self,
        generation: u64,
        credential: Credential,
    ) -> Result<Resolution, ClientError> {
        let outcome = self.resolver.resolve(&credential).await;

        let mut committed = false;
        self.cell.send_if_modified(|cell| {
            if cell.generation != generation {
                return false;
            }
            committed = true;
            match &outcome {
                Ok(identity) => cell.state = SessionState::Authenticated(identity.clone()),
                Err(_) => {
                    self.clear_storage();
                    cell.credential = None;
                    cell.state = SessionState::Unauthenticated;
                }
            }
            true
        });

        if !committed {
            debug!("Discarding superseded identity resolution (generation {generation})");
            return Ok(Resolution::Superseded);
        }

        match outcome {
            Ok(identity) => {
                info!(user_id = %identity.id, "Session authenticated");
                Ok(Resolution::Committed(identity))
            }
            Err(e) => {
                warn!("Identity resolution failed, signing out: {e}");
                Err(fail_closed(e))
            }
        }
    }

    fn clear_storage(&self) {
        if let Err(e) = self.storage.clear() {
            warn!("Could not clear persisted credential: {e}");
        }
    }
}

impl CredentialSource for SessionStore {
    fn current_credential(&self) -> Option<Credential> {
        let cell = self.cell.borrow();
        match cell.state {
            SessionState::Authenticated(_) | SessionState::Loading => cell.credential.clone(),
            SessionState::Uninitialized | SessionState::Unauthenticated => None,
        }
    }
}

/// The resolver cannot tell a bad token from an unreachable server, so a
/// transport failure is reported as an authentication failure.
fn fail_closed(e: ClientError) -> ClientError {
    match e {
        ClientError::Transport(msg) => {
            ClientError::Authentication(format!("identity could not be verified: {msg}"))
        }
        other => other,
    }
}

/// Read side of the session for observers such as the route guard.
pub struct SessionWatcher {
    rx: watch::Receiver<SessionCell>,
}

impl SessionWatcher {
    pub fn state(&self) -> SessionState {
        self.rx.borrow().state.clone()
    }

    /// Waits for the next transition. `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<SessionState> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().state.clone())
    }
}
