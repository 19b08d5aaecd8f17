//! Fan-out hub server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin tidings-server
//! cargo run --bin tidings-server -- --port 3000 --predictor sentiment
//! cargo run --bin tidings-server -- --config tidings.json
//! TIDINGS_PORT=3000 TIDINGS_PREDICTOR=noop cargo run --bin tidings-server
//! ```

use std::path::PathBuf;

use clap::Parser;
use tidings_server::{
    config::{ConfigOverrides, ServerConfig},
    infrastructure::predictor::PredictorKind,
    ui::Server,
};
use tidings_shared::logger::setup_logger;

/// Every option can also come from a `TIDINGS_*` environment variable; a flag
/// given on the command line wins over the variable.
#[derive(Parser, Debug)]
#[command(name = "tidings-server")]
#[command(about = "WebSocket fan-out hub with pluggable predictors", long_about = None)]
struct Args {
    /// Path to a JSON config file
    #[arg(short = 'c', long, env = "TIDINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "TIDINGS_HOST")]
    host: Option<String>,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "TIDINGS_PORT")]
    port: Option<u16>,

    /// Predictor implementation (echo, sentiment, noop)
    #[arg(long, env = "TIDINGS_PREDICTOR")]
    predictor: Option<PredictorKind>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let overrides = ConfigOverrides {
        host: args.host,
        port: args.port,
        predictor: args.predictor,
    };
    let config = match ServerConfig::resolve(args.config.as_deref(), overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Loaded configuration: {:?}", config);

    let server = Server::from_config(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
