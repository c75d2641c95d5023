use actix_web::web;

/// # Health Check Endpoint
///
/// Returns the service status, a timestamp and the cache size.
pub mod health;

/// # Mailbox Verification Endpoint
///
/// Verifies an address through format, MX and SMTP checks.
///
/// ## Request
/// - Method: POST
/// - Body: JSON object with `email` field
/// - Query: optional `skip_smtp=true`
///
/// ## Responses
/// - **200 OK**: Verification result (every verdict, including `invalid`)
/// - **400 Bad Request**: Missing or blank `email`
pub mod verify;


/// # Route Configuration
///
/// Mounts every endpoint at the root path.
///
/// ```text
/// GET  /health - Service health status
/// POST /verify - Mailbox verification
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::configure_routes)
        .configure(verify::configure_routes);
}
