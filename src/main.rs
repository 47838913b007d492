use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;

mod config;
mod dashboard;
mod predict;
mod rating;

use config::Config;
use dashboard::AppState;
use predict::ResultHolder;
use rating::{HttpRatingSource, RatingResolver, RatingSource, RatingTable};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let table = match &config.ratings_file {
        Some(path) => {
            let table = RatingTable::load(path)?;
            info!("Loaded {} ratings from {}", table.len(), path.display());
            table
        }
        None => {
            let table = RatingTable::builtin();
            info!("Using built-in rating table ({} entries)", table.len());
            table
        }
    };

    let remote: Option<Arc<dyn RatingSource>> = match &config.ratings_api_url {
        Some(url) => {
            let source = HttpRatingSource::new(
                url,
                config.ratings_api_key.clone(),
                config.lookup_timeout(),
            )?;
            info!(
                "Remote ratings enabled: {} (timeout {:?})",
                url,
                config.lookup_timeout()
            );
            Some(Arc::new(source) as Arc<dyn RatingSource>)
        }
        None => {
            info!("No RATINGS_API_URL set – using the static table only");
            None
        }
    };

    let resolver = RatingResolver::new(remote, Arc::new(table))
        .with_default_rating(config.default_rating)
        .with_timeout(config.lookup_timeout());

    let app = dashboard::router(AppState {
        resolver,
        results: ResultHolder::new(),
    });

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Predictor listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
