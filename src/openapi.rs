use utoipa::OpenApi;

/// OpenAPI Specification Documentation
///
/// Generated at compile time from the route annotations and served at
/// `/api-docs/openapi.json`.
///
/// # Endpoints
/// - Health Check: `GET /health`
/// - Verification: `POST /verify`
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health,
        crate::routes::verify::verify,
    ),
    components(
        schemas(
            crate::models::health::HealthResponse,
            crate::models::verification::VerifyRequest,
            crate::models::verification::VerificationResult,
            crate::models::verification::VerificationStatus,
            crate::models::verification::ErrorResponse
        )
    ),
    tags(
        (name = "Health Check", description = "Service health monitoring endpoints"),
        (name = "Verification", description = "Mailbox existence verification")
    ),
    info(
        description = "Checks whether an email address plausibly has a live mailbox, using MX discovery and SMTP probing without sending mail",
        title = "Email Verifier API",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
