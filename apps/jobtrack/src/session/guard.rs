//! Route Guard — decides what a protected view shows for a session state.
//!
//! [`guard`] is the pure decision. [`RouteGuard`] is the adapter a host
//! uses: it forwards a redirect to its [`Navigator`] once per transition
//! into the unauthenticated state and never while the session is pending.

use super::{SessionState, SessionWatcher};

pub const DEFAULT_LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision<'a> {
    Render,
    Pending,
    RedirectTo(&'a str),
}

/// `Uninitialized` counts as pending: bootstrap has not had a chance to run.
pub fn guard<'a>(state: &SessionState, login_path: &'a str) -> GuardDecision<'a> {
    match state {
        SessionState::Authenticated(_) => GuardDecision::Render,
        SessionState::Uninitialized | SessionState::Loading => GuardDecision::Pending,
        SessionState::Unauthenticated => GuardDecision::RedirectTo(login_path),
    }
}

/// Host-side navigation hook.
pub trait Navigator {
    fn redirect(&mut self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardView {
    /// Render the protected content.
    Content,
    /// Neutral placeholder: no content, no redirect.
    Placeholder,
    /// Render nothing; a redirect has been issued.
    Nothing,
}

pub struct RouteGuard {
    login_path: String,
    redirected: bool,
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            redirected: false,
        }
    }

    pub fn observe(&mut self, state: &SessionState, navigator: &mut dyn Navigator) -> GuardView {
        match guard(state, &self.login_path) {
            GuardDecision::Pending => GuardView::Placeholder,
            GuardDecision::Render => {
                self.redirected = false;
                GuardView::Content
            }
            GuardDecision::RedirectTo(path) => {
                if !self.redirected {
                    self.redirected = true;
                    navigator.redirect(path);
                }
                GuardView::Nothing
            }
        }
    }

    /// Observes the watcher until the session leaves the pending states.
    pub async fn settle(
        &mut self,
        watcher: &mut SessionWatcher,
        navigator: &mut dyn Navigator,
    ) -> GuardView {
        let mut view = self.observe(&watcher.state(), navigator);
        while view == GuardView::Placeholder {
            match watcher.changed().await {
                Some(state) => view = self.observe(&state, navigator),
                None => break,
            }
        }
        view
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_PATH)
    }
}
