use actix_cors::Cors;
use actix_web::{web, App, HttpServer, HttpResponse, middleware, error, http::StatusCode};
use home_recommender::config::Settings;
use home_recommender::core::Recommender;
use home_recommender::routes::{self, recommendations::AppState};
use home_recommender::services::{Catalog, PredictorClient};
use std::sync::Arc;
use tracing::{info, warn, error};
use tracing_subscriber::EnvFilter;

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    error!("{}: {}", context, err);
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    // Initialize logging
    let filter = EnvFilter::try_new(&settings.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting home recommender service...");

    // Load the catalog once; requests only read it
    let catalog = Catalog::load(
        &settings.catalog.basics_path,
        settings.catalog.characteristics_path.as_deref(),
        settings.catalog.images_path.as_deref(),
    )
    .map_err(|e| startup_error("Failed to load property catalog", e))?;

    info!("Property catalog loaded ({} listings)", catalog.len());

    // Initialize price predictor client (optional - scoring works without it)
    let predictor = match &settings.predictor.base_url {
        Some(base_url) => {
            let client = PredictorClient::new(
                base_url,
                &settings.predictor.predict_path,
                &settings.predictor.health_path,
                settings.predictor.timeout_ms,
            )
            .map_err(|e| startup_error("Failed to create predictor client", e))?;
            info!(
                "Price predictor at {} (timeout: {}ms)",
                client.predict_url(),
                settings.predictor.timeout_ms
            );
            Some(Arc::new(client))
        }
        None => {
            warn!("No price predictor configured, recommendations will use rule scores only");
            None
        }
    };

    // Build application state
    let app_state = AppState {
        catalog: Arc::new(catalog),
        predictor,
        recommender: Recommender::new(),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
