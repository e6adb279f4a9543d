use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use mintloom_chain::SimulatedChain;
use mintloom_common::Config;
use mintloom_ingest::fixtures::{seed_demo_data, FixtureFeed};
use mintloom_ingest::scheduler;
use mintloom_ingest::{Ingestor, MentionSource, XMentionFeed};
use mintloom_store::ArtifactStore;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("mintloom=info".parse()?))
        .init();

    info!("Mintloom ingest starting...");

    let config = Config::from_env();
    config.log_redacted();

    let store = Arc::new(ArtifactStore::new());
    let chain = Arc::new(SimulatedChain::new());

    if config.seed_fixtures {
        seed_demo_data(store.as_ref(), chain.as_ref()).await?;
    }

    let source: Arc<dyn MentionSource> = match &config.x_bearer_token {
        Some(token) => Arc::new(XMentionFeed::new(
            token.clone(),
            &config.mention_handle,
            config.page_size,
        )),
        None => {
            info!("No X bearer token configured, using fixture feed");
            Arc::new(FixtureFeed::new())
        }
    };

    let ingestor = Arc::new(Ingestor::new(
        store.clone(),
        source,
        chain.clone(),
        &config.mention_handle,
        config.fetch_timeout,
        config.chain_timeout,
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = tokio::spawn(scheduler::run_scheduled(
        ingestor,
        Duration::from_secs(config.poll_interval_minutes * 60),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, finishing in-flight work");
    let _ = shutdown_tx.send(true);
    poller.await?;

    info!("Mintloom ingest stopped");
    Ok(())
}
