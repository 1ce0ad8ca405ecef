use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use accord_common::Result;
use accord_consensus::{Broadcaster, ConsensusEngine, ConsensusNode, RandomCoin};

use crate::api::rest::{router, AppState};
use crate::config::Config;
use crate::readiness::spawn_readiness_probe;
use crate::transport::HttpSender;

/// Wires config into a live node: engine, HTTP sender, readiness probe.
pub fn build_node(config: &Config) -> Result<Arc<ConsensusNode>> {
    let engine = ConsensusEngine::new(
        config.node_id,
        config.params,
        config.initial,
        config.faulty,
        Box::new(RandomCoin),
    );
    let sender = Arc::new(HttpSender::new(config.base_port)?);
    let broadcaster = Broadcaster::new(sender, config.params.n);
    let ready_rx = spawn_readiness_probe(config.base_port, config.params.n);

    Ok(Arc::new(ConsensusNode::new(
        config.node_id,
        engine,
        broadcaster,
        ready_rx,
    )))
}

/// Binds the REST surface and serves until the process exits.
pub async fn run(config: Config) -> Result<()> {
    if !config.params.satisfies_safety_bound() {
        warn!(
            "⚠️ n={} f={} violates n > 3f; agreement is no longer guaranteed",
            config.params.n, config.params.f
        );
    }

    let node = build_node(&config)?;
    let app = router(AppState { node });

    let addr = format!("0.0.0.0:{}", config.port());
    let listener = TcpListener::bind(&addr).await?;
    info!("🌐 Node {} listening on {}", config.node_id, addr);
    axum::serve(listener, app).await?;
    Ok(())
}
