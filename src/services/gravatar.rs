use reqwest::{Client, StatusCode};
use sha2::{Digest, Sha256};
use std::time::Duration;

use crate::services::reachability::ProbeError;

/// Identity lookup against the gravatar avatar endpoint.
pub struct GravatarClient {
    http: Client,
    base_url: String,
}

impl GravatarClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns whether an avatar is registered for `email`.
    pub async fn has_avatar(&self, email: &str) -> Result<bool, ProbeError> {
        let url = format!("{}/avatar/{}?d=404", self.base_url, avatar_hash(email));
        let response = self.http.head(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            other => Err(ProbeError::Status(other.as_u16())),
        }
    }
}

/// SHA-256 hex digest of the trimmed, lower-cased address.
pub fn avatar_hash(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    hex::encode(Sha256::digest(normalized.as_bytes()))
}
