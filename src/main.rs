use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod service;
mod store;
mod utils;

use anyhow::Context;
use config::{Config, StoreBackend};
use model::profile::EmployeeProfile;
use db::init_db;
use store::{MemoryStore, MySqlStore, RecordStore};

use crate::docs::ApiDoc;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Hello World!"
}

async fn serve<S: RecordStore>(config: Config, store: S) -> std::io::Result<()> {
    let store = Data::new(store);
    let server_addr = config.server_addr.clone();

    info!(addr = %server_addr, backend = ?config.store_backend, "Server starting...");

    HttpServer::new(move || {
        let config_data = config.clone();
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            // Payroll routes behind auth + rate limiting
            .configure(|cfg| routes::configure::<S>(cfg, &config_data))
    })
    .bind(server_addr)?
    .run()
    .await
}

fn load_profiles(path: &str) -> anyhow::Result<Vec<EmployeeProfile>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read SEED_PROFILES file {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("{path} is not a JSON array of profiles"))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    match config.store_backend {
        StoreBackend::MySql => {
            let database_url = config.database_url.clone().unwrap_or_default();
            let pool = init_db(&database_url).await?;
            serve(config, MySqlStore::new(pool)).await?;
        }
        StoreBackend::Memory => {
            warn!("Using in-memory record store, data is lost on shutdown");
            let profiles = match &config.seed_profiles {
                Some(path) => load_profiles(path)?,
                None => Vec::new(),
            };
            info!(count = profiles.len(), "Seeded employee profiles");
            serve(config, MemoryStore::with_profiles(profiles)).await?;
        }
    }

    Ok(())
}
