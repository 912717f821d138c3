use reqwest::Client;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::models::verification::Reachability;

/// Client for a remote reachability probe service (SMTP-level checks).
///
/// Expects `GET {base}/v1/{email}/verification` to answer with a JSON body
/// carrying a `reachable` verdict of `yes`, `no` or `unknown`.
pub struct ReachabilityClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ProbeResponse {
    reachable: String,
}

impl ReachabilityClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProbeError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Ask the probe service whether `email` is deliverable.
    pub async fn probe(
        &self,
        email: &str,
        catch_all_check: bool,
    ) -> Result<Reachability, ProbeError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProbeError::Config(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ProbeError::Config(format!("cannot be a base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(["v1", email, "verification"]);
        url.query_pairs_mut()
            .append_pair("catch_all_check", if catch_all_check { "true" } else { "false" });

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProbeError::Status(status.as_u16()));
        }

        let body: ProbeResponse = response.json().await?;
        Reachability::from_str(&body.reachable.to_lowercase())
            .ok()
            .filter(|r| *r != Reachability::Error)
            .ok_or(ProbeError::Verdict(body.reachable))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("probe service returned status {0}")]
    Status(u16),

    #[error("unrecognised reachability verdict: {0}")]
    Verdict(String),

    #[error("probe client configuration error: {0}")]
    Config(String),
}
