//! Scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;

use super::transport::{ApiRequest, ApiResponse, HttpTransport, TransportError};
use crate::session::{Credential, CredentialSource};

type Scripted = Result<ApiResponse, TransportError>;

/// Responses are queued per `(method, path)`. The last queued response for a
/// route keeps answering once the earlier ones are used up. Unscripted
/// routes answer 404.
#[derive(Default)]
pub(crate) struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, method: Method, path: &str, scripted: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(scripted);
    }

    pub(crate) fn respond(&self, method: Method, path: &str, status: u16, body: serde_json::Value) {
        self.push(
            method,
            path,
            Ok(ApiResponse {
                status,
                body: Bytes::from(body.to_string()),
            }),
        );
    }

    pub(crate) fn respond_empty(&self, method: Method, path: &str, status: u16) {
        self.push(
            method,
            path,
            Ok(ApiResponse {
                status,
                body: Bytes::new(),
            }),
        );
    }

    pub(crate) fn fail(&self, method: Method, path: &str, message: &str) {
        self.push(method, path, Err(TransportError(message.to_string())));
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, method: &Method, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let key = (request.method.clone(), request.path.clone());
        self.requests.lock().unwrap().push(request);

        let mut routes = self.routes.lock().unwrap();
        match routes.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok(ApiResponse {
                status: 404,
                body: Bytes::from_static(br#"{"detail": "Not Found"}"#),
            }),
        }
    }
}

pub(crate) struct StaticCredential(pub Option<Credential>);

impl CredentialSource for StaticCredential {
    fn current_credential(&self) -> Option<Credential> {
        self.0.clone()
    }
}
