use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use promotimer_core::TimerStore;
use promotimer_server::{create_app, AppState};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "promotimer-server", version, about = "Promotimer delivery endpoint")]
struct Args {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Path to the timer database (defaults to the promotimer data dir)
    #[arg(long)]
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let store = match &args.db {
        Some(path) => TimerStore::open_at(path)?,
        None => TimerStore::open()?,
    };

    let app = create_app(AppState::new(store));
    let listener = TcpListener::bind(args.addr).await?;
    info!("promotimer delivery endpoint listening on {}", args.addr);
    axum::serve(listener, app).await?;

    Ok(())
}
