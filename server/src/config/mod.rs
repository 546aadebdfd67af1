use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::security_headers;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PURCHASE_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_EVENT_IMAGE: &str = "https://images.unsplash.com/photo-1540575467063-178a50c2df87";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub purchase_timeout_ms: u64,
    pub default_event_image: String,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: parse_var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_connections: parse_var("DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
            purchase_timeout_ms: parse_var("PURCHASE_TIMEOUT_MS")
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.purchase_timeout_ms),
            default_event_image: env::var("DEFAULT_EVENT_IMAGE")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.default_event_image),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/eventix".to_string(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            purchase_timeout_ms: DEFAULT_PURCHASE_TIMEOUT_MS,
            default_event_image: DEFAULT_EVENT_IMAGE.to_string(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Config: ignoring invalid {}={:?}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bind_addr.port(), 3001);
        assert_eq!(config.purchase_timeout_ms, DEFAULT_PURCHASE_TIMEOUT_MS);
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        std::env::set_var("EVENTIX_TEST_TIMEOUT", "soon");
        assert_eq!(parse_var::<u64>("EVENTIX_TEST_TIMEOUT"), None);

        std::env::set_var("EVENTIX_TEST_TIMEOUT", " 2500 ");
        assert_eq!(parse_var::<u64>("EVENTIX_TEST_TIMEOUT"), Some(2500));
        std::env::remove_var("EVENTIX_TEST_TIMEOUT");
    }
}
