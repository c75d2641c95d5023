use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Overall classification of an address.
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Invalid,
    Unknown,
    Valid,
    LikelyValid,
    LikelyInvalid,
}

/// # Verification Result
///
/// The answer returned for every well-formed request, including addresses
/// that fail format or MX checks.
///
/// ## Fields
/// - `email`: the address after trimming and lower-casing
/// - `smtp_valid`: `null` when probing was skipped or inconclusive (catch-all)
/// - `confidence_score`: 0 to 100, derived from the other signals
/// - `warnings`: ordered, human-readable notes
///
/// ## Example JSON
/// ```json
/// {
///   "email": "user@example.com",
///   "valid_format": true,
///   "domain_has_mx": false,
///   "smtp_valid": null,
///   "is_catch_all": false,
///   "status": "invalid",
///   "confidence_score": 0,
///   "warnings": ["No MX records found"]
/// }
/// ```
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct VerificationResult {
    pub email: String,
    pub valid_format: bool,
    pub domain_has_mx: bool,
    pub smtp_valid: Option<bool>,
    pub is_catch_all: bool,
    pub status: VerificationStatus,
    pub confidence_score: u8,
    pub warnings: Vec<String>,
}

#[derive(Deserialize, ToSchema, Debug)]
pub struct VerifyRequest {
    /// Address to verify. Required; blank values are rejected.
    pub email: Option<String>,
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct VerifyQuery {
    /// Skip SMTP probing and answer from format and MX checks only.
    #[serde(default)]
    pub skip_smtp: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
