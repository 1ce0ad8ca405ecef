use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use accord_common::{AccordError, NodeId, Result, VoteMessage};
use accord_consensus::ports::MessageSender;

/// Delivers protocol messages over HTTP: one POST per recipient, short
/// timeout, no retry. An error *response* (a faulty peer answers 500)
/// still counts as delivered; only transport failures are reported.
pub struct HttpSender {
    client: Client,
    base_port: u16,
}

impl HttpSender {
    pub fn new(base_port: u16) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(800))
            .build()
            .map_err(|e| AccordError::Other(format!("http client: {e}")))?;
        Ok(Self { client, base_port })
    }

    fn message_url(&self, target: NodeId) -> String {
        format!(
            "http://127.0.0.1:{}/message",
            self.base_port + target.0 as u16
        )
    }
}

#[async_trait]
impl MessageSender for HttpSender {
    async fn send(&self, target: NodeId, msg: VoteMessage) -> std::result::Result<(), String> {
        self.client
            .post(self.message_url(target))
            .json(&msg)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}
