/// # Health Status Response
///
/// Used as the response format for the health check endpoint.
pub mod health;

/// # Verification Payloads
///
/// Request, query and response bodies of `POST /verify`.
pub mod verification;

pub use health::HealthResponse;
pub use verification::{
    ErrorResponse, VerificationResult, VerificationStatus, VerifyQuery, VerifyRequest,
};
