use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::guard::{self, GuardContext};
use actix_web::http::header;
use actix_web::{HttpResponse, web};
use fakeynews_shared::{ErrorResponse, HealthResponse};
use log::{error, warn};
use uuid::Uuid;

use crate::config::CorsConfig;
use crate::service::PredictionService;
use crate::upload::{PredictInput, TextForm, read_multipart, urlencoded_error};

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_upload_bytes: usize,
}

pub fn configure_routes(
    cfg: &mut web::ServiceConfig,
    service: PredictionService,
    limits: UploadLimits,
) {
    cfg.app_data(web::Data::new(service))
        .app_data(web::Data::new(limits))
        .app_data(web::FormConfig::default().limit(limits.max_upload_bytes))
        .service(web::resource("/").route(web::get().to(health_check)))
        .service(
            web::resource("/predict")
                .route(
                    web::post()
                        .guard(guard::fn_guard(is_multipart))
                        .to(predict_multipart),
                )
                .route(
                    web::post()
                        .guard(guard::fn_guard(is_urlencoded))
                        .to(predict_urlencoded),
                )
                .route(web::post().to(predict_without_form)),
        );
}

/// Only the configured origins may call the API from a browser.
pub fn cors(config: &CorsConfig) -> Cors {
    config
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(config.max_age)
}

fn is_multipart(ctx: &GuardContext) -> bool {
    content_type_is(ctx, "multipart/form-data")
}

fn is_urlencoded(ctx: &GuardContext) -> bool {
    content_type_is(ctx, "application/x-www-form-urlencoded")
}

fn content_type_is(ctx: &GuardContext, expected: &str) -> bool {
    ctx.head()
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|ct| ct.to_ascii_lowercase().starts_with(expected))
        .unwrap_or(false)
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(HealthResponse {
        message: "API is running!".to_string(),
    })
}

async fn predict_multipart(
    service: web::Data<PredictionService>,
    limits: web::Data<UploadLimits>,
    payload: Multipart,
) -> HttpResponse {
    match read_multipart(payload, limits.max_upload_bytes).await {
        Ok(input) => run_prediction(service, input).await,
        Err(e) => {
            warn!("Rejected /predict form: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()))
        }
    }
}

async fn predict_urlencoded(
    service: web::Data<PredictionService>,
    form: Result<web::Form<TextForm>, actix_web::Error>,
) -> HttpResponse {
    match form {
        Ok(form) => run_prediction(service, PredictInput::from(form.into_inner())).await,
        Err(e) => {
            let e = urlencoded_error(&e);
            warn!("Rejected /predict form: {}", e);
            HttpResponse::BadRequest().json(ErrorResponse::new(e.to_string()))
        }
    }
}

// No body, or a body that is not a form: nothing was supplied.
async fn predict_without_form(service: web::Data<PredictionService>) -> HttpResponse {
    run_prediction(service, PredictInput::default()).await
}

async fn run_prediction(service: web::Data<PredictionService>, input: PredictInput) -> HttpResponse {
    let request_id = Uuid::new_v4();

    match web::block(move || service.predict(request_id, input)).await {
        Ok(Ok(response)) => HttpResponse::Ok().json(response),
        Ok(Err(e)) => {
            warn!("[{}] Prediction rejected: {}", request_id, e);
            HttpResponse::Ok().json(ErrorResponse::new(e.to_string()))
        }
        Err(e) => {
            error!("[{}] Prediction worker failed: {:?}", request_id, e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::new("Prediction worker failed"))
        }
    }
}
