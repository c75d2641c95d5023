use actix_web::error::InternalError;
use actix_web::{HttpResponse, Responder, post, web};

use crate::models::{ErrorResponse, VerificationResult, VerifyQuery, VerifyRequest};
use crate::verifier::EmailVerifier;

pub const EMAIL_REQUIRED: &str = "Email is required";

/// # Mailbox Verification Endpoint
///
/// Checks format, MX records and (unless skipped) live SMTP acceptance for an
/// address, and returns a graded verdict.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `email` field
/// - Query Parameters:
///   - `skip_smtp` (optional): Set to `true` to answer from format and MX only
///
/// ## Responses
/// - **200 OK**: Verification result, including invalid and no-MX verdicts
/// - **400 Bad Request**: `email` missing or blank, or the body is not valid JSON
///
/// ## Example Request
/// ```json
/// { "email": "user@example.com" }
/// ```
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    params(VerifyQuery),
    responses(
        (status = 200, description = "Verification result", body = VerificationResult),
        (status = 400, description = "Missing email or malformed body", body = ErrorResponse)
    ),
    tag = "Verification"
)]
#[post("/verify")]
pub async fn verify(
    req: web::Json<VerifyRequest>,
    query: web::Query<VerifyQuery>,
    verifier: web::Data<EmailVerifier>,
) -> impl Responder {
    let email = req.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return HttpResponse::BadRequest().json(ErrorResponse::new(EMAIL_REQUIRED));
    }

    let result = verifier.verify(email, query.skip_smtp).await;
    HttpResponse::Ok().json(result)
}

/// Answers malformed JSON bodies with the same `{ "error": ... }` shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::new(format!("Invalid request body: {err}"));
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let body = ErrorResponse::new(format!("Invalid query string: {err}"));
        InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
    })
}

/// # Route Configuration
///
/// - `POST /verify`: Mailbox verification
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .service(verify);
}
