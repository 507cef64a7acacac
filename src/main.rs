use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use dotenvy::dotenv;
use junyou_sdk::constants::HEADER_OPEN_AUTH;
use junyou_sdk::{Config, JunyouClient};
use log::{error, info};

mod api;

use api::gateway_controller;
use api::middleware::{GatewayAuth, GatewayAuthConfig};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok();

    let secret_key = require_env("SECRET_KEY")?;
    let header_name = require_env("HEADER_NAME")?;

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse::<u16>()
        .map_err(|_| invalid_input("PORT must be a number"))?;

    let client = Config::from_env()
        .and_then(JunyouClient::new)
        .map_err(|e| {
            error!("Failed to initialize junyou client: {}", e);
            invalid_input(e.to_string())
        })?;
    info!("Junyou client ready for {}", client.config().address);

    let auth_config = GatewayAuthConfig::new(secret_key)
        .with_rate_limit(100, 60)
        .with_header_name(&header_name)
        .map_err(|e| invalid_input(format!("HEADER_NAME is not a valid header: {}", e)))?;
    auth_config.start_cleanup_task();

    let client = web::Data::new(client);

    info!("Starting gateway at {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(client.clone())
            .wrap(GatewayAuth::new(auth_config.clone()))
            .wrap(middleware::Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST"])
                    .allowed_headers(vec![
                        actix_web::http::header::AUTHORIZATION,
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .allowed_header(header_name.as_str())
                    .allowed_header(HEADER_OPEN_AUTH)
                    .max_age(3600),
            )
            .configure(gateway_controller::configure)
            .route(
                "/health",
                web::get().to(|| async { HttpResponse::Ok().body("Service is running") }),
            )
    })
    .bind((host, port))?
    .run()
    .await
}

fn require_env(name: &str) -> std::io::Result<String> {
    std::env::var(name).map_err(|_| invalid_input(format!("{} environment variable is required", name)))
}

fn invalid_input(message: impl Into<String>) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidInput, message.into())
}
