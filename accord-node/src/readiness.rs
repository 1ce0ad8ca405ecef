use std::time::Duration;

use reqwest::Client;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Opens the readiness barrier once every node's HTTP surface answers.
///
/// Any response to `GET /status` counts as reachable: a faulty node answers
/// 500 but is up, which is all the protocol needs before round 1. The probe
/// task exits after the barrier opens; the returned receiver keeps reading
/// `true`.
pub fn spawn_readiness_probe(base_port: u16, n: usize) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        let client = match Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                error!("Readiness probe could not build an HTTP client: {e}");
                return;
            }
        };

        loop {
            let mut unreachable = 0usize;
            for id in 0..n {
                let url = format!("http://127.0.0.1:{}/status", base_port + id as u16);
                if client.get(&url).send().await.is_err() {
                    unreachable += 1;
                }
            }

            if unreachable == 0 {
                info!("✅ All {} nodes reachable, readiness barrier open", n);
                let _ = tx.send(true);
                return;
            }

            debug!("⏳ Readiness barrier waiting on {} nodes", unreachable);
            tokio::time::sleep(Duration::from_millis(200)).await;
        }
    });

    rx
}
