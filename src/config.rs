//! Runtime settings read from the environment (and `.env`).

use std::env;
use std::str::FromStr;

use crate::tracker::{config_editor::DEFAULT_DURATION_MINUTES, layout::DEFAULT_TRIANGLE_MAX};

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: String,
    /// `*` allows any origin.
    pub cors_allowed_origin: String,
    pub max_request_body_kb: usize,
    /// Largest round count still drawn as a triangle.
    pub layout_triangle_max: usize,
    pub default_round_duration: i32,
    pub renumber_config_on_delete: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            database_max_connections: 5,
            bind_addr: "0.0.0.0:8000".to_string(),
            cors_allowed_origin: "http://localhost:3000".to_string(),
            max_request_body_kb: 256,
            layout_triangle_max: DEFAULT_TRIANGLE_MAX,
            default_round_duration: DEFAULT_DURATION_MINUTES,
            renumber_config_on_delete: false,
        }
    }
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads settings through `lookup`, so tests can supply a fake
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?;

        Ok(Self {
            database_url,
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            ),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN")
                .unwrap_or(defaults.cors_allowed_origin),
            max_request_body_kb: parse_or(
                &lookup,
                "MAX_REQUEST_BODY_KB",
                defaults.max_request_body_kb,
            ),
            layout_triangle_max: parse_or(
                &lookup,
                "LAYOUT_TRIANGLE_MAX",
                defaults.layout_triangle_max,
            ),
            default_round_duration: parse_or(
                &lookup,
                "DEFAULT_ROUND_DURATION",
                defaults.default_round_duration,
            ),
            renumber_config_on_delete: parse_or(
                &lookup,
                "RENUMBER_CONFIG_ON_DELETE",
                defaults.renumber_config_on_delete,
            ),
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
                default
            }
        },
    }
}
