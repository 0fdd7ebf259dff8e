use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Contract, FieldViolation, Validate, ValidationError, Violations};

/// Supabase Auth rejects sign-ups with shorter passwords by default.
pub const MIN_PASSWORD_CHARS: usize = 6;

/// The user behind a credential, as returned by `/auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

impl Identity {
    /// Local part of the email, used as a display name.
    pub fn display_name(&self) -> &str {
        match self.email.split('@').next() {
            Some(local) if !local.is_empty() => local,
            _ => "User",
        }
    }
}

impl Contract for Identity {
    const ENTITY: &'static str = "Identity";

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require_min_chars("email", &self.email, 1);
        v.into_vec()
    }
}

/// Email + password pair sent to `/auth/login` and `/auth/register`.
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    fn check(&self, min_password: usize) -> Result<(), ValidationError> {
        let mut v = Violations::new();
        if !is_plausible_email(&self.email) {
            v.push("email", "must be a valid email address");
        }
        if self.password.is_empty() {
            v.push("password", "must not be empty");
        } else {
            v.require_min_chars("password", &self.password, min_password);
        }
        v.into_result()
    }

    /// Stricter check for new accounts.
    pub fn validate_registration(&self) -> Result<(), ValidationError> {
        self.check(MIN_PASSWORD_CHARS)
    }
}

impl Validate for Credentials {
    fn validate(&self) -> Result<(), ValidationError> {
        self.check(1)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// `/auth/login` response.
#[derive(Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

impl Contract for AccessToken {
    const ENTITY: &'static str = "AccessToken";

    fn violations(&self) -> Vec<FieldViolation> {
        let mut v = Violations::new();
        v.require_text("access_token", &self.access_token);
        if !self.token_type.eq_ignore_ascii_case("bearer") {
            v.push(
                "token_type",
                format!("expected 'bearer', got '{}'", self.token_type),
            );
        }
        v.into_vec()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}
