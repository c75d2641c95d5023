use crate::cache::VerdictStore;
use crate::models::HealthResponse;
use crate::verifier::EmailVerifier;
use actix_web::{HttpResponse, Responder, get, web};

/// # Health Check Endpoint
///
/// Returns the current health status of the service along with a timestamp
/// and the number of cached verification results.
///
/// ## Example Response
///
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2023-10-05T12:34:56.789Z",
///   "cached_results": 0
/// }
/// ```
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "Health Check"
)]
#[get("/health")]
pub async fn health(verifier: web::Data<EmailVerifier>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse::up(verifier.cache().len()))
}

/// # Route Configuration
///
/// - `GET /health`: Health check endpoint
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ResultCache;
    use crate::smtp::probe::MockProber;
    use crate::validation::dnsmx::{MockMxLookup, MxResolver};
    use crate::verifier::verdict::VerdictPolicy;
    use actix_web::{App, test};
    use std::sync::Arc;
    use std::time::Duration;

    fn idle_verifier() -> EmailVerifier {
        EmailVerifier::new(
            MxResolver::new(Arc::new(MockMxLookup::new()), Duration::from_secs(1)),
            Arc::new(MockProber::new()),
            Arc::new(ResultCache::new(10, Duration::from_secs(60))),
            VerdictPolicy::Optimistic,
        )
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(idle_verifier()))
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let health_response: HealthResponse = test::read_body_json(resp).await;
        assert_eq!(health_response.status, "UP");
        assert_eq!(health_response.cached_results, 0);
        assert!(!health_response.timestamp.is_empty());
    }
}
