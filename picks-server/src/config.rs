use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub deadline_cache_ttl_seconds: u64,
    pub store_timeout_seconds: u64,
    pub use_legacy_deadline_overrides: bool,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            deadline_cache_ttl_seconds: env::var("DEADLINE_CACHE_TTL_SECONDS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .expect("Invalid DEADLINE_CACHE_TTL_SECONDS"),
            store_timeout_seconds: env::var("STORE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .expect("Invalid STORE_TIMEOUT_SECONDS"),
            use_legacy_deadline_overrides: env::var("USE_LEGACY_DEADLINE_OVERRIDES")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .expect("Invalid USE_LEGACY_DEADLINE_OVERRIDES"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
