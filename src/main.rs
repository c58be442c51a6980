use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use mongodb::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tripsplit::config::AppConfig;
use tripsplit::error::{AppError, AppResult};
use tripsplit::routes;
use tripsplit::store::TripStore;

#[actix_web::main]
async fn main() -> AppResult<()> {
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("{e}");
        e
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("tripsplit={},mongodb=warn", config.log_level))),
        )
        .init();

    info!(database = %config.database_name, "connecting to MongoDB");
    let client = Client::with_uri_str(&config.mongodb_uri).await?;
    info!("connected");

    if config.bot_token.is_none() {
        warn!("BOT_API_TOKEN is not set, authorization is disabled");
    }

    let store = TripStore::connect(&client, &config.database_name).await?;
    let address = (config.bind_address.clone(), config.port);
    info!(address = %address.0, port = address.1, "listening");

    let config = web::Data::new(config);
    let store = web::Data::new(store);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .app_data(config.clone())
            .app_data(store.clone())
            .configure(routes::configure)
    })
    .bind(address)?
    .run()
    .await
    .map_err(AppError::from)
}
