//! Client configuration

use std::path::PathBuf;
use std::time::Duration;

/// Engine.IO handshake path appended to the socket origin
const SOCKET_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// Client configuration for connecting to the restaurant backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST base URL including the `/api` prefix (e.g. "http://localhost:5000/api")
    pub api_base_url: String,

    /// Explicit socket origin; derived from `api_base_url` when unset
    pub socket_url: Option<String>,

    /// Request timeout
    pub timeout: Duration,

    /// Access token to start with (bearer header fallback)
    pub access_token: Option<String>,

    /// First reconnect delay
    pub reconnect_delay: Duration,

    /// Reconnect delay cap (exponential backoff upper bound)
    pub max_reconnect_delay: Duration,

    /// Maximum reconnect attempts (0 means retry forever)
    pub max_reconnect_attempts: u32,

    /// Where the soft identity cache lives; no cache when unset
    pub identity_cache_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into().trim_end_matches('/').to_string(),
            socket_url: None,
            timeout: Duration::from_secs(15),
            access_token: None,
            reconnect_delay: Duration::from_secs(1),
            max_reconnect_delay: Duration::from_secs(5),
            max_reconnect_attempts: 0,
            identity_cache_path: None,
        }
    }

    /// Read configuration from `DINE_*` environment variables
    pub fn from_env() -> Self {
        let base = std::env::var("DINE_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".into());
        let defaults = Self::new(base);
        Self {
            socket_url: std::env::var("DINE_SOCKET_URL").ok(),
            timeout: std::env::var("DINE_REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            reconnect_delay: std::env::var("DINE_RECONNECT_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.reconnect_delay),
            max_reconnect_delay: std::env::var("DINE_RECONNECT_DELAY_MAX_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.max_reconnect_delay),
            identity_cache_path: std::env::var("DINE_IDENTITY_CACHE").ok().map(PathBuf::from),
            ..defaults
        }
    }

    pub fn with_socket_url(mut self, url: impl Into<String>) -> Self {
        self.socket_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set initial delay and cap of the reconnect backoff
    pub fn with_reconnect_backoff(mut self, initial: Duration, max: Duration) -> Self {
        self.reconnect_delay = initial;
        self.max_reconnect_delay = max;
        self
    }

    /// Set maximum reconnect attempts (0 means retry forever)
    pub fn with_max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    pub fn with_identity_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_cache_path = Some(path.into());
        self
    }

    /// Socket origin: the API base with its `/api` suffix removed
    pub fn socket_origin(&self) -> String {
        match &self.socket_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self
                .api_base_url
                .strip_suffix("/api")
                .unwrap_or(&self.api_base_url)
                .to_string(),
        }
    }

    /// Full WebSocket endpoint of the realtime channel
    pub fn websocket_url(&self) -> String {
        let origin = self.socket_origin();
        let origin = if let Some(rest) = origin.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = origin.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            origin
        };
        format!("{origin}{SOCKET_PATH}")
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:5000/api")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.reconnect_delay, Duration::from_secs(1));
        assert_eq!(config.max_reconnect_delay, Duration::from_secs(5));
        assert_eq!(config.max_reconnect_attempts, 0);
    }

    #[test]
    fn test_socket_url_strips_api_suffix() {
        let config = ClientConfig::new("https://dine.example.com/api/");
        assert_eq!(config.socket_origin(), "https://dine.example.com");
        assert_eq!(
            config.websocket_url(),
            "wss://dine.example.com/socket.io/?EIO=4&transport=websocket"
        );

        let config = ClientConfig::new("http://localhost:5000/api")
            .with_socket_url("http://sockets.local:6000/");
        assert_eq!(
            config.websocket_url(),
            "ws://sockets.local:6000/socket.io/?EIO=4&transport=websocket"
        );
    }
}
