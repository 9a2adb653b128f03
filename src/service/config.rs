use std::{env, sync::Arc};

use crate::config::{Config, LogFormat};

pub trait ConfigService: Send + Sync {
    fn port(&self) -> u16;
    fn values(&self) -> &Config;
}

pub struct ConfigServiceImpl {
    config: Arc<Config>,
}

impl ConfigServiceImpl {
    fn strip_wrapping_quotes(value: &str) -> &str {
        if value.len() >= 2 {
            let bytes = value.as_bytes();
            let first = bytes[0];
            let last = bytes[value.len() - 1];
            if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
                return &value[1..value.len() - 1];
            }
        }
        value
    }

    fn normalize(value: String) -> Option<String> {
        let trimmed = value.trim();
        let normalized = Self::strip_wrapping_quotes(trimmed).trim();
        if normalized.is_empty() {
            None
        } else {
            Some(normalized.to_string())
        }
    }

    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; `new` reads the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).and_then(Self::normalize);
        let parse_u16 = |key: &str| get(key).and_then(|value| value.parse::<u16>().ok());
        let parse_u32 = |key: &str| get(key).and_then(|value| value.parse::<u32>().ok());

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_u16("PORT").unwrap_or(3333);
        let database_url = get("DATABASE_URL");
        let database_max_connections = parse_u32("DATABASE_MAX_CONNECTIONS")
            .filter(|value| *value > 0)
            .unwrap_or(10);
        let log_level = get("RUST_LOG")
            .or_else(|| get("LOG_LEVEL"))
            .unwrap_or_else(|| "info".to_string());
        let log_format = match get("LOG_FORMAT").map(|value| value.to_ascii_lowercase()) {
            Some(value) if value == "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };
        let password_hash_memory_kib = parse_u32("PASSWORD_HASH_MEMORY_KIB").unwrap_or(19_456);
        let password_hash_iterations = parse_u32("PASSWORD_HASH_ITERATIONS").unwrap_or(2);

        Self {
            config: Arc::new(Config {
                host,
                port,
                database_url,
                database_max_connections,
                log_level,
                log_format,
                password_hash_memory_kib,
                password_hash_iterations,
            }),
        }
    }
}

impl ConfigService for ConfigServiceImpl {
    fn port(&self) -> u16 {
        self.config.port
    }

    fn values(&self) -> &Config {
        &self.config
    }
}
