use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::rating::{Rating, DEFAULT_LOOKUP_TIMEOUT_MS, DEFAULT_RATING};

/// Head-to-head Elo win probability service
#[derive(Parser, Debug, Clone)]
#[command(name = "elo-predictor", version, about)]
pub struct Config {
    /// Dashboard listen address
    #[arg(long, env = "DASHBOARD_ADDR", default_value = "0.0.0.0:8080")]
    pub dashboard_addr: String,

    /// Remote rating lookup base URL; the static table is used alone when unset
    #[arg(long, env = "RATINGS_API_URL")]
    pub ratings_api_url: Option<String>,

    /// Bearer token for the remote rating lookup
    #[arg(long, env = "RATINGS_API_KEY")]
    pub ratings_api_key: Option<String>,

    /// Upper bound on a single remote lookup, in milliseconds
    #[arg(long, env = "LOOKUP_TIMEOUT_MS", default_value_t = DEFAULT_LOOKUP_TIMEOUT_MS)]
    pub lookup_timeout_ms: u64,

    /// JSON file mapping identifiers to ratings, replacing the built-in table
    #[arg(long, env = "RATINGS_FILE")]
    pub ratings_file: Option<PathBuf>,

    /// Rating assigned to identifiers found in neither source
    #[arg(long, env = "DEFAULT_RATING", default_value_t = DEFAULT_RATING)]
    pub default_rating: Rating,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.lookup_timeout_ms == 0 {
            anyhow::bail!("lookup_timeout_ms must be greater than zero");
        }
        if !self.default_rating.is_finite() {
            anyhow::bail!("default_rating must be a finite number");
        }
        if let Some(raw) = &self.ratings_api_url {
            let parsed = url::Url::parse(raw)
                .map_err(|e| anyhow::anyhow!("ratings_api_url '{}' is invalid: {}", raw, e))?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
                anyhow::bail!("ratings_api_url must be an absolute http(s) URL");
            }
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        self.dashboard_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("dashboard_addr '{}' is invalid: {}", self.dashboard_addr, e))
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}
