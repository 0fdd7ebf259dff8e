use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::info;

use crate::api_client::{dispatch, json_body, ApiRequest, HttpTransport, RequestBody};
use crate::contract::{decode, AccessToken, Credentials, Identity, Validate};
use crate::errors::ClientError;
use crate::session::{Credential, IdentityResolver};

const REGISTER_PATH: &str = "/auth/register";
const LOGIN_PATH: &str = "/auth/login";
const ME_PATH: &str = "/auth/me";

/// Account endpoints. These run before a session exists, so they talk to
/// the transport with an explicit credential (or none) instead of reading
/// it from the session.
#[derive(Clone)]
pub struct AuthService {
    transport: Arc<dyn HttpTransport>,
}

impl AuthService {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn register(&self, credentials: &Credentials) -> Result<Identity, ClientError> {
        credentials.validate_registration()?;
        let request = ApiRequest {
            method: Method::POST,
            path: REGISTER_PATH.to_string(),
            bearer: None,
            body: json_body(credentials)?,
        };
        let identity: Identity = decode(&dispatch(self.transport.as_ref(), request).await?)?;
        info!(user_id = %identity.id, "Registered account");
        Ok(identity)
    }

    /// Exchanges email + password for a bearer credential.
    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn request_token(
        &self,
        credentials: &Credentials,
    ) -> Result<Credential, ClientError> {
        credentials.validate()?;
        let request = ApiRequest {
            method: Method::POST,
            path: LOGIN_PATH.to_string(),
            bearer: None,
            body: json_body(credentials)?,
        };
        let token: AccessToken = decode(&dispatch(self.transport.as_ref(), request).await?)?;
        Ok(Credential::new(token.access_token))
    }
}

#[async_trait]
impl IdentityResolver for AuthService {
    async fn resolve(&self, credential: &Credential) -> Result<Identity, ClientError> {
        let request = ApiRequest {
            method: Method::GET,
            path: ME_PATH.to_string(),
            bearer: Some(credential.clone()),
            body: RequestBody::Empty,
        };
        Ok(decode(&dispatch(self.transport.as_ref(), request).await?)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api_client::mock::MockTransport;
    use serde_json::json;

    const USER_ID: &str = "0e5d2ad7-8b8a-4f0e-8e51-51f1e2c1a9b2";

    #[tokio::test]
    async fn test_resolve_sends_explicit_bearer() {
        let transport = MockTransport::new();
        transport.respond(
            Method::GET,
            ME_PATH,
            200,
            json!({"id": USER_ID, "email": "jane@example.com"}),
        );
        let auth = AuthService::new(transport.clone());
        let identity = auth.resolve(&Credential::new("tok-9")).await.unwrap();
        assert_eq!(identity.id.to_string(), USER_ID);
        assert_eq!(transport.requests()[0].bearer, Some(Credential::new("tok-9")));
    }

    #[tokio::test]
    async fn test_resolve_maps_401_to_authentication() {
        let transport = MockTransport::new();
        transport.respond(
            Method::GET,
            ME_PATH,
            401,
            json!({"detail": "Invalid authentication credentials"}),
        );
        let err = AuthService::new(transport)
            .resolve(&Credential::new("old"))
            .await
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[tokio::test]
    async fn test_request_token_returns_credential() {
        let transport = MockTransport::new();
        transport.respond(
            Method::POST,
            LOGIN_PATH,
            200,
            json!({"access_token": "jwt-abc", "token_type": "bearer"}),
        );
        let auth = AuthService::new(transport.clone());
        let credential = auth
            .request_token(&Credentials::new("jane@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(credential, Credential::new("jwt-abc"));

        let request = &transport.requests()[0];
        assert_eq!(request.bearer, None);
        match &request.body {
            RequestBody::Json(body) => assert_eq!(body["email"], "jane@example.com"),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_credentials_never_reach_network() {
        let transport = MockTransport::new();
        let err = AuthService::new(transport.clone())
            .request_token(&Credentials::new("not-an-email", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_enforces_password_length() {
        let transport = MockTransport::new();
        let err = AuthService::new(transport.clone())
            .register(&Credentials::new("jane@example.com", "abc"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(ref e) if e.has_field("password")));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_register_returns_identity() {
        let transport = MockTransport::new();
        transport.respond(
            Method::POST,
            REGISTER_PATH,
            201,
            json!({"id": USER_ID, "email": "jane@example.com"}),
        );
        let identity = AuthService::new(transport)
            .register(&Credentials::new("jane@example.com", "secret1"))
            .await
            .unwrap();
        assert_eq!(identity.email, "jane@example.com");
    }
}
