//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Build the shared upstream client and the backend pool
//! - Bind the listener
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

use std::net::{AddrParseError, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::{validate_config, ConfigError, ListenerConfig, ProxyConfig};
use crate::health::LivenessSwitch;
use crate::load_balancer::{
    build_client, Backend, BackendError, DispatchError, Dispatcher, HttpClient, SimpleBackend,
};

/// Anything that stops the proxy from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid backend: {0}")]
    Backend(#[from] BackendError),

    #[error("cannot build dispatcher: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("invalid bind address {address:?}: {source}")]
    BindAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Build one `SimpleBackend` per configured entry, preserving order.
pub fn build_backends(
    config: &ProxyConfig,
    client: &HttpClient,
) -> Result<Vec<Arc<dyn Backend>>, BackendError> {
    let upstream_timeout =
        (config.timeouts.upstream_secs > 0).then(|| Duration::from_secs(config.timeouts.upstream_secs));

    config
        .backends
        .iter()
        .map(|entry| {
            let mut backend = SimpleBackend::new(entry.address.clone(), client.clone())?;
            if !entry.alive {
                backend = backend.with_liveness(Arc::new(LivenessSwitch::new(false)));
            }
            if let Some(timeout) = upstream_timeout {
                backend = backend.with_upstream_timeout(timeout);
            }
            Ok(Arc::new(backend) as Arc<dyn Backend>)
        })
        .collect()
}

/// Validate `config` and assemble the dispatcher over its backend pool.
pub fn build_dispatcher(config: &ProxyConfig) -> Result<Dispatcher, StartupError> {
    validate_config(config).map_err(ConfigError::Validation)?;

    let client = build_client(&config.timeouts);
    let dispatcher = Dispatcher::new(build_backends(config, &client)?)?;

    for backend in dispatcher.backends() {
        tracing::info!(
            address = %backend.address(),
            alive = backend.is_alive(),
            "Backend registered"
        );
    }

    Ok(dispatcher)
}

/// Bind the front door's TCP listener.
pub async fn bind_listener(config: &ListenerConfig) -> Result<TcpListener, StartupError> {
    let address = config
        .socket_addr()
        .map_err(|source| StartupError::BindAddress {
            address: config.bind_address.clone(),
            source,
        })?;

    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind { address, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    #[test]
    fn default_config_builds_three_backends() {
        let dispatcher = build_dispatcher(&ProxyConfig::default()).unwrap();
        let addresses: Vec<&str> = dispatcher.backends().iter().map(|b| b.address()).collect();
        assert_eq!(
            addresses,
            [
                "https://www.facebook.com",
                "https://www.bing.com",
                "https://www.google.com"
            ]
        );
    }

    #[test]
    fn empty_pool_does_not_start() {
        let mut config = ProxyConfig::default();
        config.backends.clear();
        assert!(matches!(
            build_dispatcher(&config),
            Err(StartupError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn bad_url_does_not_start() {
        let mut config = ProxyConfig::default();
        config.backends.push(BackendConfig::new("http//missing-colon"));
        assert!(build_dispatcher(&config).is_err());
    }

    #[test]
    fn backends_listed_down_are_skipped() {
        let mut config = ProxyConfig::default();
        config.backends = vec![
            BackendConfig::new("http://10.0.0.1:3000"),
            BackendConfig {
                address: "http://10.0.0.2:3000".into(),
                alive: false,
            },
        ];

        let dispatcher = build_dispatcher(&config).unwrap();
        assert!(dispatcher.backends()[0].is_alive());
        assert!(!dispatcher.backends()[1].is_alive());

        for _ in 0..4 {
            assert_eq!(
                dispatcher.select_next().unwrap().address(),
                "http://10.0.0.1:3000"
            );
        }
    }

    #[tokio::test]
    async fn binds_ephemeral_port() {
        let config = ListenerConfig {
            bind_address: "127.0.0.1:0".into(),
        };
        let listener = bind_listener(&config).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn unparseable_bind_address_fails() {
        let config = ListenerConfig {
            bind_address: "not-an-address".into(),
        };
        assert!(matches!(
            bind_listener(&config).await,
            Err(StartupError::BindAddress { .. })
        ));
    }
}
