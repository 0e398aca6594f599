//! Shutdown coordination for the registry service.

/// Resolve when the process receives SIGINT or SIGTERM.
///
/// Used as the graceful-shutdown future for `axum::serve`: once it
/// resolves the listener stops accepting and in-flight requests drain.
pub async fn signal_received() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received, draining");
}
