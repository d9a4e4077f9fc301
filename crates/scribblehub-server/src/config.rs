use serde::Deserialize;

/// Top-level server configuration, loaded from `scribblehub.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Single permitted cross-origin value; `None` falls back to
    /// reflecting `Any` (development default).
    pub cors_origin: Option<String>,
    pub rooms: RoomsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".to_string(),
            cors_origin: None,
            rooms: RoomsConfig::default(),
        }
    }
}

/// Room lifecycle configuration. `idle_timeout_secs` is a resource-hygiene
/// backstop for rooms abandoned via a connection that never produces a
/// clean disconnect; the last-user-leaves rule already destroys rooms in
/// the normal case.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoomsConfig {
    pub idle_timeout_secs: u64,
    pub idle_check_interval_secs: u64,
}

impl Default for RoomsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: 3600,
            idle_check_interval_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Validate configuration, exiting on anything that would make the
    /// server unable to run.
    pub fn validate(&self) {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            tracing::error!(
                addr = %self.listen_addr,
                "listen_addr is not a valid socket address"
            );
            std::process::exit(1);
        }
        if self.rooms.idle_timeout_secs == 0 {
            tracing::error!("rooms.idle_timeout_secs must be > 0");
            std::process::exit(1);
        }
        if self.rooms.idle_check_interval_secs == 0 {
            tracing::error!("rooms.idle_check_interval_secs must be > 0");
            std::process::exit(1);
        }
    }

    /// Load config from `scribblehub.toml` if it exists, then apply
    /// `SCRIBBLEHUB_*` env var overrides.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string("scribblehub.toml") {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from scribblehub.toml");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse scribblehub.toml: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No scribblehub.toml found, using defaults");
                ServerConfig::default()
            },
        };

        if let Ok(addr) = std::env::var("SCRIBBLEHUB_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(origin) = std::env::var("SCRIBBLEHUB_CORS_ORIGIN")
            && !origin.is_empty()
        {
            config.cors_origin = Some(origin);
        }
        if let Ok(val) = std::env::var("SCRIBBLEHUB_IDLE_TIMEOUT_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.rooms.idle_timeout_secs = n;
        }
        if let Ok(val) = std::env::var("SCRIBBLEHUB_IDLE_CHECK_INTERVAL_SECS")
            && let Ok(n) = val.parse::<u64>()
        {
            config.rooms.idle_check_interval_secs = n;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.listen_addr, "0.0.0.0:5000");
        assert!(cfg.cors_origin.is_none());
        assert_eq!(cfg.rooms.idle_timeout_secs, 3600);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
listen_addr = "127.0.0.1:9090"
cors_origin = "https://example.com"
"#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.listen_addr, "127.0.0.1:9090");
        assert_eq!(cfg.cors_origin.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn missing_rooms_section_uses_defaults() {
        let toml_str = r#"listen_addr = "0.0.0.0:5000""#;
        let cfg: ServerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.rooms.idle_timeout_secs, 3600);
        assert_eq!(cfg.rooms.idle_check_interval_secs, 60);
    }

    #[test]
    fn validate_accepts_default_config() {
        ServerConfig::default().validate();
    }

    #[test]
    fn validate_rejects_invalid_addr_condition() {
        let cfg = ServerConfig {
            listen_addr: "not-an-address".to_string(),
            ..ServerConfig::default()
        };
        assert!(cfg.listen_addr.parse::<std::net::SocketAddr>().is_err());
    }
}
