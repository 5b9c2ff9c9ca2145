//! rr-proxy: round-robin reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                    rr-proxy                      │
//!                 │                                                  │
//!  Client Request │  ┌───────────┐    ┌────────────┐                 │
//!  ───────────────┼─▶│   http    │───▶│ Dispatcher │                 │
//!                 │  │front door │    │ (cursor +  │                 │
//!                 │  └─────┬─────┘    │  pool)     │                 │
//!                 │        │          └─────┬──────┘                 │
//!                 │        │   select_next  │                        │
//!                 │        ▼                ▼                        │
//!  Client Response│  ┌───────────────────────────┐                   │
//!  ◀──────────────┼──│  Backend::handle (proxy)  │◀──────────────────┼──── Backend
//!                 │  └───────────────────────────┘                   │     Server
//!                 │                                                  │
//!                 │  config · health (liveness) · lifecycle · logs   │
//!                 └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use rr_proxy::config::{load_config, ProxyConfig};
use rr_proxy::http::HttpServer;
use rr_proxy::lifecycle::{signals, startup, Shutdown};
use rr_proxy::observability::init_logging;

#[derive(Parser)]
#[command(name = "rr-proxy")]
#[command(about = "Round-robin reverse proxy load balancer", long_about = None)]
struct Cli {
    /// TOML configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port, overriding the configured bind address's port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(port) = cli.port {
        config.listener.set_port(port)?;
    }

    init_logging(&config.observability)?;

    tracing::info!("rr-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        backends = config.backends.len(),
        upstream_timeout_secs = config.timeouts.upstream_secs,
        "Configuration loaded"
    );

    let dispatcher = match startup::build_dispatcher(&config) {
        Ok(d) => Arc::new(d),
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return Err(e.into());
        }
    };

    let listener = startup::bind_listener(&config.listener).await?;

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(dispatcher);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_accepts_port_and_config() {
        let cli = Cli::try_parse_from(["rr-proxy", "--port", "9090", "-c", "lb.toml"]).unwrap();
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.config, Some(PathBuf::from("lb.toml")));
    }

    #[test]
    fn port_override_keeps_host() {
        let mut config = ProxyConfig::default();
        config.listener.set_port(9090).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:9090");
    }

    #[test]
    fn rejects_non_numeric_port() {
        assert!(Cli::try_parse_from(["rr-proxy", "--port", "http"]).is_err());
    }
}
