use clap::Parser;
use log::{error, info};
use server::config::{Config, DEFAULT_HEAD_TIMEOUT};
use server::network::Server;
use shared::DEFAULT_CATALOG_SIZE;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Number of videos in the catalog
    #[arg(short, long, env = "CATALOG_SIZE", default_value_t = DEFAULT_CATALOG_SIZE)]
    catalog_size: u32,

    /// Directory containing index.html and theinbetween.html
    #[arg(long, env = "PAGES_DIR", default_value = "public")]
    pages_dir: String,

    /// Seconds a new connection may stay silent before it is dropped
    #[arg(long, env = "HEAD_TIMEOUT_SECS", default_value_t = DEFAULT_HEAD_TIMEOUT.as_secs())]
    head_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    let config = match Config::new(&args.host, args.port, args.catalog_size, &args.pages_dir) {
        Ok(config) => config.with_head_timeout(Duration::from_secs(args.head_timeout_secs)),
        Err(e) => {
            error!("Refusing to start: {}", e);
            return Err(e.into());
        }
    };

    let server = Server::bind(config).await?;

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                error!("Server stopped: {}", e);
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
