use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::models::job::ValidationOptions;
use crate::models::verification::{Reachability, ValidationOutcome};
use crate::services::gravatar::GravatarClient;
use crate::services::reachability::{ProbeError, ReachabilityClient};
use crate::services::syntax;

/// What a successful verification reports for one address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub reachable: Reachability,
    pub gravatar: Option<bool>,
}

impl Verdict {
    pub fn reachable(reachable: Reachability) -> Self {
        Self {
            reachable,
            gravatar: None,
        }
    }

    pub fn into_outcome(self, email: &str) -> ValidationOutcome {
        ValidationOutcome {
            email: email.to_string(),
            reachable: self.reachable,
            error: None,
            gravatar: self.gravatar,
        }
    }
}

/// Verifies a single address. Implementations may block on network I/O and
/// are invoked concurrently from many tasks.
#[async_trait]
pub trait Verifier: Send + Sync {
    async fn verify(&self, email: &str, options: &ValidationOptions) -> Result<Verdict, VerifyError>;
}

/// Syntax check, then optional deep probe and identity lookup.
pub struct EmailVerifier {
    reachability: Option<ReachabilityClient>,
    gravatar: GravatarClient,
}

impl EmailVerifier {
    pub fn new(reachability: Option<ReachabilityClient>, gravatar: GravatarClient) -> Self {
        Self {
            reachability,
            gravatar,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ProbeError> {
        let timeout = Duration::from_secs(config.verify_timeout_secs);
        let reachability = config
            .reachability_api_url
            .as_deref()
            .map(|url| ReachabilityClient::new(url, timeout))
            .transpose()?;
        let gravatar = GravatarClient::new(&config.gravatar_base_url, timeout)?;
        Ok(Self::new(reachability, gravatar))
    }

    pub fn into_shared(self) -> Arc<dyn Verifier> {
        Arc::new(self)
    }
}

#[async_trait]
impl Verifier for EmailVerifier {
    async fn verify(&self, email: &str, options: &ValidationOptions) -> Result<Verdict, VerifyError> {
        if !syntax::is_valid(email) {
            return Err(VerifyError::Syntax(email.to_string()));
        }

        let reachable = if options.smtp_check {
            let client = self.reachability.as_ref().ok_or(VerifyError::Unavailable)?;
            client.probe(email, options.catch_all_check).await?
        } else {
            Reachability::Unknown
        };

        let gravatar = if options.gravatar_check {
            Some(self.gravatar.has_avatar(email).await?)
        } else {
            None
        };

        Ok(Verdict {
            reachable,
            gravatar,
        })
    }
}

/// A verification attempt that produced no verdict.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("invalid address syntax: {0}")]
    Syntax(String),

    #[error("deep check requested but no reachability service is configured")]
    Unavailable,

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("verifier panicked: {0}")]
    Panicked(String),
}
