use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uservec_core::{config, TextEncoder, VectorStore};
use uservec_server::api::create_router;
use uservec_server::api::handlers::AppState;
use uservec_server::api::metrics;
use uservec_server::encoder::HttpTextEncoder;

#[derive(Parser)]
#[command(name = "uservec", about = "In-memory user vector similarity service")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Embedding dimension shared by every stored and queried vector
    #[arg(short, long, env = "USERVEC_DIMENSION", default_value_t = config::DEFAULT_DIMENSION)]
    dimension: usize,

    /// Text encoder endpoint (e.g. http://encoder:5001/embed); enables the text routes
    #[arg(long, env = "USERVEC_ENCODER_URL")]
    encoder_url: Option<String>,

    /// Timeout for one encoder call in seconds
    #[arg(long, default_value_t = config::ENCODER_TIMEOUT_SECS)]
    encoder_timeout: u64,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    shutdown_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("uservec_server=info".parse()?)
                .add_directive("uservec_core=info".parse()?),
        )
        .init();

    let args = Args::parse();

    if args.port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }

    let store = match VectorStore::new(args.dimension) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let encoder: Option<Arc<dyn TextEncoder>> = match args.encoder_url {
        Some(ref url) => {
            let client =
                HttpTextEncoder::new(url.clone(), Duration::from_secs(args.encoder_timeout))?;
            tracing::info!(url = %client.url(), "Text encoder enabled");
            Some(Arc::new(client) as Arc<dyn TextEncoder>)
        }
        None => {
            tracing::info!("No encoder URL set, text routes will answer 503");
            None
        }
    };

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    metrics::update_vector_count(0);

    let state = AppState::new(store, encoder, prometheus_handle);
    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", args.port);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = args.port,
        dimension = args.dimension,
        text_encoder = args.encoder_url.is_some(),
        "uservec ready"
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let (drain_tx, drain_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        wait_for_signal().await;
        let _ = drain_tx.send(());
    });
    let server = tokio::spawn(async move { server.await });

    let shutdown_timeout = Duration::from_secs(args.shutdown_timeout);
    tokio::select! {
        result = server => result??,
        _ = async {
            if drain_rx.await.is_ok() {
                tokio::time::sleep(shutdown_timeout).await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            tracing::error!(
                "Shutdown timeout ({}s) exceeded, dropping in-flight requests",
                args.shutdown_timeout
            );
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
