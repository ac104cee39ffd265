use std::net::TcpListener;

use actix_web::web;
use anyhow::Context;
use student_records::{
    connect_repository,
    graceful_shutdown::run_until_stopped,
    run,
    settings::AppConfig,
    telemetry::init_tracing,
    AppState,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.log_format);
    tracing::info!("Loaded configuration: {:?}", config);

    let student_repo = connect_repository(&config).await?;
    let app_state = web::Data::new(AppState::new(&config, student_repo));

    let server_addr = config.server_addr();
    let listener = TcpListener::bind(&server_addr)
        .with_context(|| format!("Failed to bind {}", server_addr))?;

    tracing::info!(
        "🚀 Starting {} v{} on {} ({} storage)",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.storage
    );

    let server = run(listener, app_state, &config)?;
    run_until_stopped(server).await?;

    Ok(())
}
