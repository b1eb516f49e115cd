//! rest-dispatch server
//!
//! Serves the demo blog (`/users/{name}/posts/{slug}`) through the
//! hierarchical dispatcher.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum router ──▶ Root ──▶ users ──▶ posts
//!                     (trace, id,     mount    instantiate / verb /
//!                      timeout,       table    child / action
//!                      body limit)
//!     ◀────────────── Reply or DispatchError as JSON
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use rest_dispatch::blog::{self, BlogStore};
use rest_dispatch::config::{load_config, ServiceConfig};
use rest_dispatch::observability::{logging, metrics};
use rest_dispatch::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "rest-dispatch")]
#[command(about = "Hierarchical REST dispatch server", long_about = None)]
struct Args {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,

    /// Start with an empty store instead of the demo data.
    #[arg(long)]
    empty: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("rest-dispatch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        max_body_bytes = config.limits.max_body_bytes,
        fail_soft = config.dispatch.fail_soft,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = if args.empty {
        BlogStore::new()
    } else {
        BlogStore::seeded()
    };
    let root = blog::build(Arc::new(store), config.dispatch.options())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let signal_task = shutdown.trigger_on_signal();

    HttpServer::new(config, root)
        .run(listener, shutdown.subscribe())
        .await?;
    signal_task.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
