use actix_web::{App, HttpServer, middleware::Logger};
use fakeynews::classifier::KeywordClassifier;
use fakeynews::config::AppConfig;
use fakeynews::ocr::TesseractCli;
use fakeynews::routes::{UploadLimits, configure_routes, cors};
use fakeynews::service::PredictionService;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = AppConfig::load().map_err(|e| {
        log::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let ocr = TesseractCli::new(config.ocr.clone());
    log::info!(
        "OCR via '{}' (lang {}, psm {})",
        ocr.command(),
        config.ocr.lang,
        config.ocr.psm
    );

    let service = PredictionService::new(Arc::new(ocr), Arc::new(KeywordClassifier::new()));
    let limits = UploadLimits {
        max_upload_bytes: config.server.max_upload_bytes,
    };
    let cors_config = config.cors.clone();
    log::info!("Allowed origins: {:?}", cors_config.allowed_origins);

    let bind_address = config.bind_address();
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(cors(&cors_config))
            .wrap(Logger::default())
            .configure(|cfg| configure_routes(cfg, service.clone(), limits))
    })
    .bind(&bind_address)?
    .run()
    .await
}
