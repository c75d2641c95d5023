use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Logger, web::Data};
use email_verifier::config::AppConfig;
use email_verifier::openapi::ApiDoc;
use email_verifier::verifier::EmailVerifier;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Email Verifier Service Entry Point
///
/// Configures and launches the Actix-web HTTP server with:
/// - Verification and health endpoints (configured in routes)
/// - Swagger UI for API documentation
/// - Environment configuration via `.env` file
/// - Permissive CORS
///
/// # Endpoints
/// - Verification: `POST /verify`
/// - Health: `GET /health`
/// - Swagger UI: `/swagger-ui/`
/// - OpenAPI spec: `/api-docs/openapi.json`
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let verifier = Data::new(EmailVerifier::from_config(&config));
    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(verifier.clone())
            .configure(email_verifier::routes::configure)
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
    })
    .bind((config.bind_address.as_str(), config.port))?;

    tracing::info!(
        bind = %config.bind_address,
        port = config.port,
        helo = %config.helo_name,
        policy = %config.verdict_policy,
        "email verifier listening"
    );

    server.run().await
}
