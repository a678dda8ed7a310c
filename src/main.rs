//! Binary entry point - the composition root.
//!
//! Wires logging, `.env` loading, CLI flags, and the token source together,
//! then hands a bound listener to the server.

use clap::Parser;
use tokio::net::TcpListener;

use chutes_proxy::config::{ProxyConfig, TokenSource};
use chutes_proxy::serve;

/// OpenAI-compatible relay proxy for the Chutes AI inference API.
#[derive(Parser)]
#[command(name = "chutes-proxy", version, about)]
struct Cli {
    /// Host to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to.
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Read CHUTES_API_TOKEN from the environment on every request instead
    /// of once at startup.
    #[arg(long)]
    lazy_token: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let token = if cli.lazy_token {
        TokenSource::deferred()
    } else {
        // Missing token aborts startup here.
        TokenSource::startup()?
    };

    let config = ProxyConfig::new(cli.host, cli.port, token);
    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    serve(listener, config).await
}
