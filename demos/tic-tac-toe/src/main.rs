//! Tic-tac-toe server on top of Tabletop.
//!
//! Players authenticate with their numeric id as the token. Run with:
//! ```not_rust
//! cargo run -p tic-tac-toe
//! cargo run -p tic-tac-toe -- --bind 0.0.0.0:9000 --gomoku
//! RUST_LOG=tabletop=debug cargo run -p tic-tac-toe
//! ```

use std::time::Duration;

use clap::Parser;
use tabletop::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tic-tac-toe")]
#[command(about = "Turn-based tic-tac-toe server over WebSocket", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: String,

    /// Close connections that stay silent this long
    #[arg(long, default_value_t = 15)]
    idle_timeout_secs: u64,

    /// Events buffered per connection before new ones are dropped
    #[arg(long, default_value_t = 32)]
    outbound_buffer: usize,

    /// Also serve "gomoku": five in a row on a 15x15 board
    #[arg(long)]
    gomoku: bool,
}

impl Args {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            bind_addr: self.bind.clone(),
            idle_timeout: Duration::from_secs(self.idle_timeout_secs),
            outbound_buffer: self.outbound_buffer,
            ..ServerConfig::default()
        }
    }

    fn rules(&self) -> RuleRegistry {
        let mut rules = RuleRegistry::with_defaults();
        if self.gomoku {
            rules.register(TicTacToe::new("gomoku", 15, 5));
        }
        rules
    }
}

/// Uses the token as the player id.
struct TokenAuth;

impl Authenticator for TokenAuth {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, TabletopError> {
        let id: u64 = token
            .parse()
            .map_err(|_| TabletopError::AuthFailed("token must be a number".into()))?;
        Ok(PlayerId(id))
    }
}

fn setup_logger() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tabletop=info,tic_tac_toe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn build(
    args: &Args,
) -> Result<TabletopServer<MemoryStore, TokenAuth, JsonCodec>, TabletopError> {
    TabletopServerBuilder::new()
        .config(args.config())
        .rules(args.rules())
        .build(TokenAuth, MemoryStore::new())
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_logger();
    let args = Args::parse();

    let server = build(&args).await?;
    tracing::info!(addr = %server.local_addr()?, "tic-tac-toe server listening");

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("shutting down");
        })
        .await?;
    Ok(())
}
