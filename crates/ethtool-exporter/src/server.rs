//! HTTP scrape endpoint.
//!
//! Every request runs one fresh collection pass on a blocking worker. The
//! collector sits behind a mutex, so concurrent scrapes run one after another.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tracing::{debug, error, info};

use ethtool_exporter_core::EXIT_FATAL;
use ethtool_exporter_core::collector::{Collector, CommandRunner, FileSystem};
use ethtool_exporter_core::metrics::{CONTENT_TYPE, format_prometheus};

type SharedCollector<F, R> = Arc<Mutex<Collector<F, R>>>;

/// Builds the router serving `/` and `/metrics`.
pub fn router<F, R>(collector: Collector<F, R>) -> Router
where
    F: FileSystem + 'static,
    R: CommandRunner + 'static,
{
    let state: SharedCollector<F, R> = Arc::new(Mutex::new(collector));
    Router::new()
        .route("/", get(handle_metrics::<F, R>))
        .route("/metrics", get(handle_metrics::<F, R>))
        .with_state(state)
}

/// Binds `host:port` and serves until the process exits.
pub async fn serve<F, R>(collector: Collector<F, R>, host: &str, port: u16) -> std::io::Result<()>
where
    F: FileSystem + 'static,
    R: CommandRunner + 'static,
{
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Serving metrics on {}", listener.local_addr()?);
    axum::serve(listener, router(collector)).await
}

async fn handle_metrics<F, R>(State(collector): State<SharedCollector<F, R>>) -> Response
where
    F: FileSystem + 'static,
    R: CommandRunner + 'static,
{
    let result = tokio::task::spawn_blocking(move || {
        // Poisoning is ignored: every pass rebuilds its state from scratch.
        let mut collector = collector.lock().unwrap_or_else(|p| p.into_inner());
        collector.collect()
    })
    .await;

    match result {
        Ok(Ok(collection)) => {
            debug!(series = collection.series_count(), "scrape served");
            (
                [(header::CONTENT_TYPE, CONTENT_TYPE)],
                format_prometheus(&collection),
            )
                .into_response()
        }
        Ok(Err(e)) if e.is_fatal() => {
            error!("{}", e);
            std::process::exit(EXIT_FATAL);
        }
        Ok(Err(e)) => {
            error!("Collection failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!(error = %e, "collection panicked in spawn_blocking");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
