use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use todoforge::auth::AuthState;
use todoforge::config::Config;
use todoforge::routes;
use todoforge::store::{PgStore, Store};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let store = match PgStore::connect(&config).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.migrate().await {
        log::error!("failed to run migrations: {}", e);
        std::process::exit(1);
    }

    let store_data: web::Data<dyn Store> = web::Data::from(store.clone() as Arc<dyn Store>);
    let auth_data = web::Data::new(AuthState::from_config(&config));
    let settings_data = web::Data::new(config.query.clone());
    let origin = config.cors_origin.clone();

    log::info!("Starting TodoForge server at {}", config.server_url());

    let result = HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .app_data(store_data.clone())
            .app_data(auth_data.clone())
            .app_data(settings_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::config)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await;

    store.close().await;
    log::info!("database pool closed");
    result
}
