//! Server configuration.

use ratefold_fx::{AggregatorConfig, ProvidersConfig};

/// Top-level configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Log level used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Upstream providers.
    pub providers: ProvidersConfig,
    /// Aggregation behaviour.
    pub aggregator: AggregatorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            log_level: "info".to_string(),
            providers: ProvidersConfig::default(),
            aggregator: AggregatorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RATEFOLD_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("RATEFOLD_LISTEN_PORT") {
            config.listen_port = parse_port(&port)?;
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config.providers = ProvidersConfig::from_env().map_err(|e| e.to_string())?;
        config.aggregator = AggregatorConfig::from_env().map_err(|e| e.to_string())?;

        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.listen_addr.trim().is_empty() {
            return Err("Listen address cannot be empty".to_string());
        }

        self.providers.validate()?;
        self.aggregator.validate()
    }

    /// `addr:port` string for binding.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }
}

fn parse_port(value: &str) -> Result<u16, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("invalid RATEFOLD_LISTEN_PORT: {:?}", value))
}
