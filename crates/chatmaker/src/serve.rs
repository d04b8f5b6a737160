// SPDX-FileCopyrightText: 2026 Auto Chat Maker Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatmaker serve` command implementation.
//!
//! Opens SQLite storage, mounts the HTTP API and serves until SIGINT or
//! SIGTERM, then checkpoints the database before exiting.

use std::sync::Arc;

use chatmaker_config::ChatMakerConfig;
use chatmaker_core::ChatMakerError;
use chatmaker_gateway::{start_server, AppState};
use chatmaker_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Runs the `chatmaker serve` command.
pub async fn run_serve(config: Arc<ChatMakerConfig>) -> Result<(), ChatMakerError> {
    init_tracing(&config.app.log_level, &config.app.log_format);

    info!(
        name = %config.app.name,
        version = %config.app.version,
        debug = config.app.debug,
        environment = config.environment(),
        "starting Auto Chat Maker"
    );

    let storage = Arc::new(SqliteStorage::open(&config.database).await?);
    info!(url = %config.database.url, "database initialized");

    let cancel = install_signal_handler();
    let state = AppState::new(config.clone(), storage.clone());
    let served = start_server(state, cancel).await;
    finish_serve(&storage, &config.app.name, served).await
}

/// Checkpoints storage and logs the end of the run, then hands back the
/// server's outcome.
async fn finish_serve(
    storage: &SqliteStorage,
    name: &str,
    served: Result<(), ChatMakerError>,
) -> Result<(), ChatMakerError> {
    if let Err(e) = storage.shutdown().await {
        warn!(error = %e, "database checkpoint on shutdown failed");
    }
    if let Err(e) = &served {
        error!(error = %e, "server stopped with an error");
    }
    info!(name, "shutdown complete");
    served
}

/// Installs handlers for SIGINT (Ctrl+C) and SIGTERM.
///
/// Returns a [`CancellationToken`] cancelled when either signal arrives.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    tokio::select! {
                        _ = ctrl_c => {
                            info!("received SIGINT (Ctrl+C), initiating shutdown");
                        }
                        _ = sigterm.recv() => {
                            info!("received SIGTERM, initiating shutdown");
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
                    let _ = ctrl_c.await;
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Default filter directive for a configured log level.
fn filter_directive(log_level: &str) -> String {
    let level = log_level.to_ascii_lowercase();
    format!("chatmaker={level},tower_http={level},warn")
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence over
/// `app.log_level`.
fn init_tracing(log_level: &str, log_format: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false);

    if log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex;

    use chatmaker_storage::Database;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    async fn finish_and_capture(
        served: Result<(), ChatMakerError>,
    ) -> (Result<(), ChatMakerError>, String) {
        let logs = Captured::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let storage = SqliteStorage::new(Database::open_in_memory().await.unwrap());
        let result = finish_serve(&storage, "Auto Chat Maker", served).await;
        (result, logs.text())
    }

    #[tokio::test]
    async fn clean_stop_logs_shutdown_complete() {
        let (result, logs) = finish_and_capture(Ok(())).await;
        assert!(result.is_ok());
        assert!(logs.contains("shutdown complete"));
        assert!(!logs.contains("server stopped with an error"));
    }

    #[tokio::test]
    async fn failed_server_still_logs_shutdown_complete() {
        let served = Err(ChatMakerError::network("failed to bind 0.0.0.0:8000"));
        let (result, logs) = finish_and_capture(served).await;
        assert_eq!(result.unwrap_err().message(), "failed to bind 0.0.0.0:8000");
        let stopped = logs.find("server stopped with an error").unwrap();
        let complete = logs.find("shutdown complete").unwrap();
        assert!(stopped < complete);
    }

    #[tokio::test]
    async fn install_signal_handler_returns_token() {
        let token = install_signal_handler();
        assert!(!token.is_cancelled());
        token.cancel();
    }

    #[test]
    fn filter_directive_scopes_level_to_service_crates() {
        assert_eq!(
            filter_directive("DEBUG"),
            "chatmaker=debug,tower_http=debug,warn"
        );
    }

    #[test]
    fn filter_directive_parses() {
        use tracing_subscriber::EnvFilter;
        for level in ["trace", "debug", "info", "warn", "error"] {
            assert!(EnvFilter::try_new(filter_directive(level)).is_ok());
        }
    }
}
