use actix_web::dev::Server;
use tokio::signal;
use tracing::{error, warn};

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("🛑 Ctrl+C received, initiating shutdown...")
        },
        _ = terminate => {
            warn!("🛑 SIGTERM received, initiating shutdown...");
        }
    }
}

/// Runs the server until it exits on its own or a shutdown signal arrives,
/// in which case in-flight requests are allowed to finish.
pub async fn run_until_stopped(server: Server) -> std::io::Result<()> {
    let handle = server.handle();
    let server = tokio::spawn(server);

    tokio::select! {
        res = server => res.map_err(std::io::Error::other)?,
        _ = shutdown_signal() => {
            handle.stop(true).await;
            warn!("Server stopped");
            Ok(())
        }
    }
}
