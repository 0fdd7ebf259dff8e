/// API Gateway Client — the single point of entry for all backend calls.
///
/// ARCHITECTURAL RULE: services never talk to the transport directly for
/// authenticated calls. Every request goes through [`ApiClient`], which
/// reads the current credential at call time and attaches it as
/// `Authorization: Bearer <credential>`. Every response body is checked
/// against its entity contract before it is returned.
use std::sync::Arc;

use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contract::{decode, decode_list, Contract, ValidationError};
use crate::errors::ClientError;
use crate::session::CredentialSource;

#[cfg(test)]
pub(crate) mod mock;
pub mod transport;

pub use transport::{
    ApiRequest, ApiResponse, FileUpload, HttpTransport, ReqwestTransport, RequestBody,
    TransportError,
};

/// FastAPI error body: `{"detail": "..."}` or a list of validation items.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: ErrorDetail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Message(String),
    Items(Vec<ErrorItem>),
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

const MAX_RAW_ERROR_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<dyn CredentialSource>,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn HttpTransport>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    pub(crate) fn transport(&self) -> &dyn HttpTransport {
        self.transport.as_ref()
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<Bytes, ClientError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            bearer: self.credentials.current_credential(),
            body,
        };
        dispatch(self.transport(), request).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get<T: Contract>(&self, path: &str) -> Result<T, ClientError> {
        let body = self.call(Method::GET, path, RequestBody::Empty).await?;
        Ok(decode(&body)?)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_list<T: Contract>(&self, path: &str) -> Result<Vec<T>, ClientError> {
        let body = self.call(Method::GET, path, RequestBody::Empty).await?;
        Ok(decode_list(&body)?)
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn post<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: Contract,
    {
        let body = self.call(Method::POST, path, json_body(payload)?).await?;
        Ok(decode(&body)?)
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn put<B, T>(&self, path: &str, payload: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: Contract,
    {
        let body = self.call(Method::PUT, path, json_body(payload)?).await?;
        Ok(decode(&body)?)
    }

    /// The response body, if any, is ignored.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.call(Method::DELETE, path, RequestBody::Empty).await?;
        Ok(())
    }

    #[tracing::instrument(skip(self, file), fields(filename = %file.filename))]
    pub async fn upload<T: Contract>(
        &self,
        path: &str,
        file: FileUpload,
    ) -> Result<T, ClientError> {
        let body = self.call(Method::POST, path, RequestBody::File(file)).await?;
        Ok(decode(&body)?)
    }
}

pub(crate) fn json_body<B: Serialize + ?Sized>(payload: &B) -> Result<RequestBody, ClientError> {
    serde_json::to_value(payload)
        .map(RequestBody::Json)
        .map_err(|e| {
            ValidationError::single("$", format!("payload is not serializable: {e}")).into()
        })
}

/// Sends one request and maps the status: 2xx → body, 401/403 →
/// `Authentication`, anything else → `Api`.
pub(crate) async fn dispatch(
    transport: &dyn HttpTransport,
    request: ApiRequest,
) -> Result<Bytes, ClientError> {
    let method = request.method.clone();
    let path = request.path.clone();

    let response = transport
        .send(request)
        .await
        .map_err(|e| ClientError::Transport(e.to_string()))?;

    let status = response.status;
    if (200..300).contains(&status) {
        debug!("{method} {path} -> {status}");
        return Ok(response.body);
    }

    let message = error_message(status, &response.body);
    warn!("{method} {path} returned {status}: {message}");

    match status {
        401 | 403 => Err(ClientError::Authentication(message)),
        _ => Err(ClientError::Api { status, message }),
    }
}

fn error_message(status: u16, body: &[u8]) -> String {
    if let Ok(parsed) = serde_json::from_slice::<ErrorBody>(body) {
        return match parsed.detail {
            ErrorDetail::Message(message) => message,
            ErrorDetail::Items(items) => items
                .iter()
                .map(render_error_item)
                .collect::<Vec<_>>()
                .join("; "),
        };
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        format!("HTTP {status}")
    } else {
        raw.chars().take(MAX_RAW_ERROR_CHARS).collect()
    }
}

fn render_error_item(item: &ErrorItem) -> String {
    // FastAPI prefixes locations with "body", "query" or "path"; drop it.
    let loc: Vec<String> = item
        .loc
        .iter()
        .skip_while(|segment| matches!(segment.as_str(), Some("body" | "query" | "path")))
        .map(|segment| match segment.as_str() {
            Some(s) => s.to_string(),
            None => segment.to_string(),
        })
        .collect();
    if loc.is_empty() {
        item.msg.clone()
    } else {
        format!("{}: {}", loc.join("."), item.msg)
    }
}
