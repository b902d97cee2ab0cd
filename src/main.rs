//! Serves a directory over HTTP/1.1, falling back to an index resource for unknown paths.
//!
//! ```bash
//! staticserve --root ./dist --listen 0.0.0.0:8080
//! RUST_LOG=hyper_staticserve=debug staticserve --root ./dist
//! ```

use std::{net::SocketAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use http::HeaderValue;
use hyper::server::conn::http1;
use hyper_staticserve::{Static, DEFAULT_INDEX, DEFAULT_SERVER_NAME};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "staticserve")]
#[command(about = "Serve static files, with range requests and index fallback")]
#[command(version)]
struct Cli {
    /// Directory to serve files from
    #[arg(short, long, env = "STATICSERVE_ROOT", default_value = ".")]
    root: PathBuf,

    /// Resource served for paths that don't map to a file, relative to the root
    #[arg(short, long, env = "STATICSERVE_INDEX", default_value = DEFAULT_INDEX)]
    index: PathBuf,

    /// Address to listen on
    #[arg(short, long, env = "STATICSERVE_LISTEN", default_value = "127.0.0.1:8080")]
    listen: SocketAddr,

    /// Value of the `server` response header
    #[arg(long, env = "STATICSERVE_SERVER_NAME", default_value = DEFAULT_SERVER_NAME)]
    server_name: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<()> {
    let server_name = HeaderValue::try_from(cli.server_name.as_str())
        .context("invalid --server-name")?;
    let static_ = Static::new(&cli.root)
        .index(&cli.index)
        .server_name(server_name);

    let listener = TcpListener::bind(cli.listen)
        .await
        .with_context(|| format!("failed to bind {}", cli.listen))?;
    info!(
        root = %cli.root.display(),
        index = %cli.index.display(),
        "serving on http://{}",
        listener.local_addr().context("failed to get listener address")?
    );

    loop {
        let (tcp, peer) = listener.accept().await.context("accept failed")?;
        let service = static_.clone();
        tokio::spawn(async move {
            let io = TokioIo::new(tcp);
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!(%peer, %err, "connection error");
            }
        });
    }
}
