mod config;
mod proxy;
mod questions;
mod routes;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use config::AppConfig;
use proxy::upstream::UpstreamClient;
use proxy::ProxyState;
use routes::configure_routes;
use std::env;
use std::io::{Error, ErrorKind};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    } else {
        log::error!("Failed to get the current working directory.");
    }

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        Error::new(ErrorKind::InvalidInput, e.to_string())
    })?;

    let question_bank = questions::load_question_bank(&config.questions_path).map_err(|e| {
        log::error!("Failed to load question sets: {}", e);
        Error::new(ErrorKind::InvalidData, e.to_string())
    })?;
    log::info!(
        "Loaded {} disease and {} pest questions from {}",
        question_bank.disease.len(),
        question_bank.pest.len(),
        config.questions_path.display()
    );

    let upstream = UpstreamClient::new(&config.backend_url, config.upstream_timeout)
        .map_err(|e| Error::other(e.to_string()))?;
    let proxy_state = ProxyState {
        upstream,
        upload_dir: config.upload_dir.clone(),
        max_upload_bytes: config.max_upload_bytes,
    };

    log::info!(
        "Proxying predictions to {} (timeout {}s)",
        config.backend_url,
        config.upstream_timeout.as_secs()
    );
    log::info!("Serving frontend from {}", config.frontend_dir.display());
    log::info!("Serving reference images from {}", config.ref_dir.display());

    let bind_address = config.bind_addr();
    log::info!("Starting server on {}", bind_address);

    let proxy_state = web::Data::new(proxy_state);
    let question_bank = web::Data::new(question_bank);
    let frontend_dir = config.frontend_dir.clone();
    let ref_dir = config.ref_dir.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(proxy_state.clone())
            .app_data(question_bank.clone())
            .configure(|cfg| configure_routes(cfg, frontend_dir.clone(), ref_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
