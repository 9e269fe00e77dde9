//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,

    /// Track labels for agenda categories, in stored index order.
    pub tracks: Vec<String>,

    /// Whether speaker listings are split across pages (default: false).
    pub speakers_multipage: bool,

    /// Base URL of the remote image-asset host. When None, asset
    /// destruction is a logged no-op.
    pub image_host_url: Option<String>,

    /// API key for the image-asset host.
    pub image_host_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
            .unwrap_or_else(|_| vec!["*".to_string()]);

        let tracks = env::var("TRACKS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| vec!["Left".to_string(), "Right".to_string()]);

        let speakers_multipage = env::var("SPEAKERS_MULTIPAGE")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let image_host_url = env::var("IMAGE_HOST_URL").ok();
        let image_host_key = env::var("IMAGE_HOST_KEY").ok();

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            cors_allowed_origins,
            tracks,
            speakers_multipage,
            image_host_url,
            image_host_key,
        })
    }
}
