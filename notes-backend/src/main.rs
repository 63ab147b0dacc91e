use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::middleware::{Condition, Logger};
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;

mod config;
mod controllers;
mod db;
mod notes;

use config::Config;
use db::Database;
use notes::NoteService;

pub struct AppState {
    pub notes: NoteService,
    pub config: Config,
    /// Server start time for uptime calculation
    pub started_at: std::time::Instant,
}

/// SPA fallback handler - serves index.html for client-side routing
async fn spa_fallback(state: web::Data<AppState>) -> actix_web::Result<NamedFile> {
    Ok(NamedFile::open(state.config.frontend_dist.join("index.html"))?)
}

/// Permissive CORS, applied only when `enabled`
pub fn cors_middleware(enabled: bool) -> Condition<Cors> {
    let cors = Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    Condition::new(enabled, cors)
}

/// Register the API controllers, then the client build (if any) at `/`.
/// The static service goes last so it never shadows an API route.
pub fn configure_app(cfg: &mut web::ServiceConfig, frontend_dist: Option<&Path>) {
    cfg.configure(controllers::health::config_routes)
        .configure(controllers::notes::config);

    if let Some(dir) = frontend_dist {
        cfg.service(
            Files::new("/", dir.to_path_buf())
                .index_file("index.html")
                .default_handler(web::to(spa_fallback)),
        );
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("notes-backend v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env().map_err(|e| {
        log::error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    log::info!("Initializing database at {}", config.database_url);
    let schema = config.load_schema();
    let db = Database::new(&config.database_url, &schema).map_err(|e| {
        log::error!("Failed to initialize database: {}", e);
        std::io::Error::other(e)
    })?;
    log::info!("Database ready at {}", db.path().display());
    let notes = NoteService::new(Arc::new(db));

    let frontend_dist = config.frontend_dist_if_present();
    match &frontend_dist {
        Some(dir) => log::info!("Serving frontend from: {}", dir.display()),
        None => log::info!("No frontend build at {}, static serving disabled", config.frontend_dist.display()),
    }
    log::info!("CORS: {}", if config.cors_enabled { "enabled" } else { "disabled" });

    let bind = (config.bind_address.clone(), config.port);
    let started_at = std::time::Instant::now();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState {
                notes: notes.clone(),
                config: config.clone(),
                started_at,
            }))
            .wrap(Logger::default())
            .wrap(cors_middleware(config.cors_enabled))
            .configure(|cfg| configure_app(cfg, frontend_dist.as_deref()))
    })
    .bind(bind.clone())?
    .run();

    log::info!("Server is running on {}:{}", bind.0, bind.1);

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        log::info!("Received Ctrl+C, shutting down...");

        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop).await.is_err() {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}

#[cfg(test)]
mod test_support {
    use super::*;
    use tempfile::{tempdir, TempDir};

    /// App state backed by a throwaway database. Keep the TempDir alive for
    /// the duration of the test.
    pub fn test_state() -> (TempDir, web::Data<AppState>) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("notes.db");
        let db = Database::new(db_path.to_str().unwrap(), config::BUNDLED_SCHEMA)
            .expect("Failed to create database");

        let config = Config {
            port: config::defaults::PORT,
            bind_address: config::defaults::BIND_ADDRESS.to_string(),
            database_url: db_path.to_string_lossy().to_string(),
            schema_path: dir.path().join("schema.sql"),
            cors_enabled: false,
            frontend_dist: dir.path().join("dist"),
        };

        let state = web::Data::new(AppState {
            notes: NoteService::new(Arc::new(db)),
            config,
            started_at: std::time::Instant::now(),
        });
        (dir, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_state;
    use actix_web::http::{header, StatusCode};
    use actix_web::test;

    #[actix_web::test]
    async fn test_cors_headers_follow_toggle() {
        for enabled in [true, false] {
            let (_dir, state) = test_state();
            let app = test::init_service(
                App::new()
                    .app_data(state)
                    .wrap(cors_middleware(enabled))
                    .configure(|cfg| configure_app(cfg, None)),
            )
            .await;

            let req = test::TestRequest::get()
                .uri("/api/health")
                .insert_header((header::ORIGIN, "http://localhost:3000"))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::OK);
            assert_eq!(
                resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN),
                enabled,
                "cors enabled = {}",
                enabled
            );
        }
    }

    #[actix_web::test]
    async fn test_unknown_path_falls_back_to_index_html() {
        let (_dir, state) = test_state();
        let dist = state.config.frontend_dist.clone();
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(dist.join("index.html"), "<html>notes client</html>").unwrap();

        let served = state.config.frontend_dist_if_present();
        assert_eq!(served.as_deref(), Some(dist.as_path()));

        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(|cfg| configure_app(cfg, served.as_deref())),
        )
        .await;

        let req = test::TestRequest::get().uri("/notes/42/edit").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, web::Bytes::from_static(b"<html>notes client</html>"));

        // API routes still win over the static service
        let req = test::TestRequest::get().uri("/api/notes").to_request();
        let notes: Vec<notes_types::Note> = test::call_and_read_body_json(&app, req).await;
        assert!(notes.is_empty());
    }

    #[actix_web::test]
    async fn test_no_static_service_without_client_build() {
        let (_dir, state) = test_state();
        assert!(state.config.frontend_dist_if_present().is_none());

        let app = test::init_service(
            App::new()
                .app_data(state)
                .configure(|cfg| configure_app(cfg, None)),
        )
        .await;

        let req = test::TestRequest::get().uri("/notes/42/edit").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
