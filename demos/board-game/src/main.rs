//! Board game server.
//!
//! Serves one shared board over WebSocket (the browser client) or
//! length-prefixed TCP (the desktop client). Set a password with
//! `--password` or `SECRET_GAME_PASSWORD` to require `auth` before a
//! client may change the board.

use boardsync::prelude::*;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TransportKind {
    Websocket,
    Tcp,
}

impl TransportKind {
    fn default_port(self) -> u16 {
        match self {
            Self::Websocket => 5555,
            Self::Tcp => 5000,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// IP address to bind to
    #[clap(short = 'H', long, default_value = "0.0.0.0")]
    host: String,
    /// Port to listen on (default 5555 for websocket, 5000 for tcp)
    #[clap(short, long)]
    port: Option<u16>,
    /// Wire transport
    #[clap(short, long, value_enum, default_value_t = TransportKind::Websocket)]
    transport: TransportKind,
    /// Seed for the dice, for reproducible games
    #[clap(short, long)]
    seed: Option<u64>,
    /// Shared password; without one the board is open to everyone
    #[clap(long, env = "SECRET_GAME_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl Args {
    fn bind_addr(&self) -> String {
        let port = self.port.unwrap_or(self.transport.default_port());
        format!("{}:{}", self.host, port)
    }

    /// The shared password, if one was given. An empty value means
    /// the board is open.
    fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    fn store_config(&self) -> StoreConfig {
        StoreConfig {
            seed: self.seed,
            ..StoreConfig::default()
        }
    }
}

async fn serve<A: Authenticator>(args: &Args, auth: A) -> Result<(), BoardsyncError> {
    let builder = BoardServer::builder()
        .bind(&args.bind_addr())
        .store_config(args.store_config());

    match args.transport {
        TransportKind::Websocket => builder.build_websocket(auth).await?.run().await,
        TransportKind::Tcp => builder.build_tcp(auth).await?.run().await,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    tracing::info!(
        addr = %args.bind_addr(),
        transport = ?args.transport,
        gated = args.password().is_some(),
        seeded = args.seed.is_some(),
        "starting board game server"
    );

    match args.password() {
        Some(password) => serve(&args, SharedSecret::new(password)).await?,
        None => serve(&args, OpenAccess).await?,
    }
    Ok(())
}
