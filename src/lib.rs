use std::{net::TcpListener, sync::Arc};

use actix_cors::Cors;
use actix_web::{dev::Server, http::header, middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod telemetry;

pub use domain::{entities, grading, use_cases, validation};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{db, utils};

use repositories::{
    memory::InMemoryStudentRepo,
    sqlx_repo::SqlxStudentRepo,
    student::SharedStudentRepo,
};
use settings::{AppConfig, StorageBackend};
use use_cases::students::StudentHandler;

pub type AppStudentHandler = StudentHandler<SharedStudentRepo>;

pub struct AppState {
    pub student_handler: AppStudentHandler,
    pub storage: StorageBackend,
}

impl AppState {
    pub fn new(config: &AppConfig, student_repo: SharedStudentRepo) -> Self {
        let student_handler = StudentHandler::new(student_repo, config.query_defaults());

        AppState {
            student_handler,
            storage: config.storage,
        }
    }
}

/// Builds the configured store. For Postgres this connects, then applies
/// pending migrations.
pub async fn connect_repository(config: &AppConfig) -> anyhow::Result<SharedStudentRepo> {
    match config.storage {
        StorageBackend::Postgres => {
            let pool = db::postgres::create_pool(&config.database_url, config.max_db_connections)
                .await
                .context("Failed to create database connection pool")?;

            db::postgres::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            Ok(Arc::new(SqlxStudentRepo::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            Ok(Arc::new(InMemoryStudentRepo::new()))
        }
    }
}

fn build_cors(origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_any_origin();
    }

    origins
        .iter()
        .fold(cors, |cors, origin| cors.allowed_origin(origin))
}

/// Binds the HTTP server to `listener` without starting it.
pub fn run(listener: TcpListener, state: web::Data<AppState>, config: &AppConfig) -> std::io::Result<Server> {
    let origins = config.cors_origins();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(build_cors(&origins))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(routes::configure_routes)
    })
    .listen(listener)?
    .workers(config.worker_count.max(1))
    .run();

    Ok(server)
}
