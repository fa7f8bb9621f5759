#![deny(missing_docs)]
//! Shipyard server executable.
//!
//! Hosts the REST endpoints of the ship catalog.

mod config;
mod db;
mod models;
mod openapi;
mod repository;
mod routes;
mod schema;

use std::sync::Arc;

#[cfg(not(test))]
use actix_cors::Cors;
#[cfg(not(test))]
use actix_web::{App, HttpServer, http::header, web};
#[cfg(not(test))]
use dotenvy::dotenv;
use shipyard_core::CatalogService;

use crate::config::StoreMode;
#[cfg(not(test))]
use crate::config::ServerConfig;
use crate::db::init_pool;
use crate::repository::PgShipStore;
#[cfg(not(test))]
use crate::routes::{AppState, configure};

/// Build the catalog over the configured store.
fn build_catalog(store: &StoreMode) -> Result<CatalogService, String> {
    match store {
        StoreMode::Memory => {
            log::warn!("using the in-memory store, ships are lost on restart");
            Ok(CatalogService::in_memory())
        }
        StoreMode::Postgres(database_url) => {
            let pool = init_pool(database_url)?;
            Ok(CatalogService::new(Arc::new(PgShipStore::new(pool))))
        }
    }
}

#[cfg(not(test))]
fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::from_env()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    let catalog = build_catalog(&config.store).map_err(std::io::Error::other)?;
    let state = web::Data::new(AppState { catalog });

    let allowed_origins = config.allowed_origins;
    let listen_addr = config.host;
    let listen_port = config.port;
    log::info!("listening on {listen_addr}:{listen_port}");

    actix_web::rt::System::new().block_on(async move {
        HttpServer::new(move || {
            let mut cors = Cors::default()
                .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(3600);
            for origin in &allowed_origins {
                cors = cors.allowed_origin(origin);
            }
            App::new()
                .wrap(actix_web::middleware::Logger::default())
                .wrap(cors)
                .app_data(state.clone())
                .configure(configure)
        })
        .bind((listen_addr, listen_port))?
        .run()
        .await
    })
}

#[cfg(test)]
fn main() {}

#[cfg(test)]
mod tests {
    use super::*;
    use shipyard_core::ShipPredicate;

    #[test]
    fn memory_store_builds_empty_catalog() {
        let catalog = build_catalog(&StoreMode::Memory).expect("catalog");
        assert_eq!(catalog.count(&ShipPredicate::any()).expect("count"), 0);
    }

    #[test]
    fn postgres_store_builds_over_test_database() {
        let Some(test_db) = crate::db::TestDatabase::new() else {
            return;
        };
        let store = StoreMode::Postgres(test_db.database_url().to_string());
        let catalog = build_catalog(&store).expect("catalog");
        assert_eq!(catalog.count(&ShipPredicate::any()).expect("count"), 0);
    }
}
