use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::session::guard::DEFAULT_LOGIN_PATH;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const CREDENTIALS_FILE: &str = ".jobtrack/credentials.json";

/// Client configuration loaded from environment variables.
/// Every variable has a default; only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub credentials_path: PathBuf,
    pub timeout: Duration,
    pub login_path: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("JOBTRACK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        check_api_url(&api_url).context("JOBTRACK_API_URL is invalid")?;

        let credentials_path = match lookup("JOBTRACK_CREDENTIALS") {
            Some(path) => PathBuf::from(path),
            None => lookup("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(CREDENTIALS_FILE),
        };

        let timeout_secs = match lookup("JOBTRACK_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("JOBTRACK_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let login_path =
            lookup("JOBTRACK_LOGIN_PATH").unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_string());

        Ok(Config {
            api_url,
            credentials_path,
            timeout: Duration::from_secs(timeout_secs),
            login_path,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "warn".to_string()),
        })
    }

    /// Replaces the API URL, applying the same check as `JOBTRACK_API_URL`.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Result<Self> {
        let api_url = api_url.into();
        check_api_url(&api_url)?;
        self.api_url = api_url;
        Ok(self)
    }
}

fn check_api_url(api_url: &str) -> Result<()> {
    if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
        bail!("API URL must be an http(s) URL, got '{api_url}'");
    }
    Ok(())
}
