use std::sync::Arc;

use tracing::warn;

use accord_common::{NodeId, VoteMessage};

use crate::ports::MessageSender;

/// Fans one message out to every node in the cluster, self included.
///
/// Sends run as independent detached tasks: unordered, no retry, no
/// backpressure, and a failure towards one peer never blocks the others.
/// The protocol already tolerates up to F unreachable nodes, so send
/// errors are logged and swallowed here.
#[derive(Clone)]
pub struct Broadcaster {
    sender: Arc<dyn MessageSender>,
    n: usize,
}

impl Broadcaster {
    pub fn new(sender: Arc<dyn MessageSender>, n: usize) -> Self {
        Self { sender, n }
    }

    pub fn broadcast(&self, msg: VoteMessage) {
        for id in 0..self.n {
            let target = NodeId(id);
            let sender = Arc::clone(&self.sender);
            let msg = msg.clone();
            tokio::spawn(async move {
                if let Err(e) = sender.send(target, msg).await {
                    warn!("⚠️ Broadcast to node {} failed: {}", target, e);
                }
            });
        }
    }
}
