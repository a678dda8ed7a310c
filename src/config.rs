//! Relay configuration.
//!
//! The upstream endpoint and timeout are fixed; the only required input is
//! the `CHUTES_API_TOKEN` environment variable holding the bearer token.
//! The token can be resolved once at startup (default) or re-read from the
//! environment on every request (`--lazy-token`), which mirrors the two
//! deployment variants of the original proxy.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Fixed upstream endpoint for chat completions.
pub const CHUTES_API_URL: &str = "https://llm.chutes.ai/v1/chat/completions";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV_VAR: &str = "CHUTES_API_TOKEN";

/// Whole-request timeout for the outbound call. Generous to accommodate
/// slow models; there is no per-chunk timeout.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingToken(String),
}

/// Where and when the bearer token is resolved.
#[derive(Debug, Clone)]
pub enum TokenSource {
    /// Resolved once at startup and held for the process lifetime.
    Static(String),
    /// Read from the named environment variable on every request.
    Env(String),
}

impl TokenSource {
    /// Resolve `CHUTES_API_TOKEN` eagerly. A missing variable is a startup
    /// failure.
    pub fn startup() -> Result<Self, ConfigError> {
        env::var(TOKEN_ENV_VAR)
            .map(Self::Static)
            .map_err(|_| ConfigError::MissingToken(TOKEN_ENV_VAR.to_string()))
    }

    /// Defer resolution to request time.
    pub fn deferred() -> Self {
        Self::Env(TOKEN_ENV_VAR.to_string())
    }

    /// Produce the current token value.
    pub fn resolve(&self) -> Result<String, ConfigError> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::Env(var) => {
                env::var(var).map_err(|_| ConfigError::MissingToken(var.clone()))
            }
        }
    }
}

/// Relay server configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
    /// Upstream chat-completions endpoint. Fixed in production; public so
    /// integration tests can point the relay at a local mock.
    pub upstream_url: String,
    /// Bearer token source.
    pub token: TokenSource,
}

impl ProxyConfig {
    pub fn new(host: String, port: u16, token: TokenSource) -> Self {
        Self {
            host,
            port,
            upstream_url: CHUTES_API_URL.to_string(),
            token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Serializes tests that touch process environment variables.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// RAII guard that restores an environment variable on drop.
    struct EnvVarGuard {
        key: String,
        previous: Option<String>,
    }

    impl EnvVarGuard {
        #[allow(unsafe_code)]
        fn set(key: &str, value: &str) -> Self {
            let previous = env::var(key).ok();
            unsafe {
                env::set_var(key, value);
            }
            Self {
                key: key.to_string(),
                previous,
            }
        }
    }

    impl Drop for EnvVarGuard {
        #[allow(unsafe_code)]
        fn drop(&mut self) {
            if let Some(ref value) = self.previous {
                unsafe {
                    env::set_var(&self.key, value);
                }
            } else {
                unsafe {
                    env::remove_var(&self.key);
                }
            }
        }
    }

    #[test]
    fn static_source_resolves_without_touching_env() {
        let source = TokenSource::Static("tok-123".to_string());
        assert_eq!(source.resolve().unwrap(), "tok-123");
    }

    #[test]
    fn env_source_reads_current_value() {
        let _lock = ENV_LOCK.lock().unwrap();
        let _env = EnvVarGuard::set("CHUTES_TEST_TOKEN_LAZY", "first");

        let source = TokenSource::Env("CHUTES_TEST_TOKEN_LAZY".to_string());
        assert_eq!(source.resolve().unwrap(), "first");

        let _env2 = EnvVarGuard::set("CHUTES_TEST_TOKEN_LAZY", "second");
        assert_eq!(source.resolve().unwrap(), "second");
    }

    #[test]
    fn env_source_fails_when_unset() {
        let source = TokenSource::Env("CHUTES_TEST_TOKEN_NEVER_SET".to_string());
        let err = source.resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingToken(_)));
        assert!(err.to_string().contains("CHUTES_TEST_TOKEN_NEVER_SET"));
    }

    #[test]
    fn startup_source_snapshots_the_token() {
        let _lock = ENV_LOCK.lock().unwrap();
        let source = {
            let _env = EnvVarGuard::set(TOKEN_ENV_VAR, "boot-token");
            TokenSource::startup().unwrap()
        };

        // Variable restored (possibly removed) by the guard; the snapshot
        // still resolves.
        assert_eq!(source.resolve().unwrap(), "boot-token");
    }

    #[test]
    fn config_defaults_to_fixed_upstream() {
        let config = ProxyConfig::new(
            "127.0.0.1".to_string(),
            8000,
            TokenSource::Static("t".to_string()),
        );
        assert_eq!(config.upstream_url, CHUTES_API_URL);
    }
}
