use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Verdict on whether an address is likely to accept mail.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Reachability {
    Yes,
    No,
    Unknown,
    /// The verification attempt itself failed.
    Error,
}

/// Result of verifying one address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValidationOutcome {
    /// The input as supplied, not normalised.
    pub email: String,
    pub reachable: Reachability,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    /// Whether a gravatar exists, when the identity check ran.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gravatar: Option<bool>,
}

impl ValidationOutcome {
    pub fn failed(email: &str, detail: impl Into<String>) -> Self {
        Self {
            email: email.to_string(),
            reachable: Reachability::Error,
            error: Some(detail.into()),
            gravatar: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.reachable == Reachability::Error
    }
}

/// Response after submitting a CSV for verification.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_omits_empty_optionals() {
        let outcome = ValidationOutcome {
            email: "a@x.com".to_string(),
            reachable: Reachability::Yes,
            error: None,
            gravatar: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@x.com", "reachable": "yes"}));
    }

    #[test]
    fn test_failed_outcome_carries_detail() {
        let outcome = ValidationOutcome::failed("a@x.com", "probe timed out");
        assert!(outcome.is_error());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["reachable"], "error");
        assert_eq!(json["error"], "probe timed out");
    }
}
