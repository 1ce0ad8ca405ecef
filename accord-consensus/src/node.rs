use tokio::sync::{watch, Mutex};
use tracing::info;

use accord_common::{AccordError, NodeId, Result, VoteMessage};

use crate::broadcast::Broadcaster;
use crate::consensus::engine::{ConsensusEngine, Progress};
use crate::consensus::state::ConsensusState;

/// Liveness probe answer for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Live,
    Faulty,
}

/// Serialized owner of one node's consensus engine.
///
/// Inbound handlers may race (up to N-1 peers broadcast into a node at
/// once); every event goes through the engine mutex, so quorum counting and
/// its one-shot guard never run concurrently on the same round's data.
/// Broadcasts happen after the lock is released.
pub struct ConsensusNode {
    id: NodeId,
    engine: Mutex<ConsensusEngine>,
    broadcaster: Broadcaster,
    ready_rx: watch::Receiver<bool>,
    stop_tx: watch::Sender<bool>,
    faulty: bool,
}

impl ConsensusNode {
    pub fn new(
        id: NodeId,
        engine: ConsensusEngine,
        broadcaster: Broadcaster,
        ready_rx: watch::Receiver<bool>,
    ) -> Self {
        let (stop_tx, _) = watch::channel(false);
        let faulty = engine.is_faulty();
        Self {
            id,
            engine: Mutex::new(engine),
            broadcaster,
            ready_rx,
            stop_tx,
            faulty,
        }
    }

    /// Blocks until the readiness barrier opens, then enters round 1 and
    /// broadcasts the first decision vote. The wait is a channel receive,
    /// not a spin, and is cancelled if the node is stopped meanwhile.
    pub async fn start(&self) -> Result<()> {
        let mut ready = self.ready_rx.clone();
        let mut stopped = self.stop_tx.subscribe();
        tokio::select! {
            biased;
            _ = stopped.wait_for(|s| *s) => {
                return Err(AccordError::StoppedNode(self.id));
            }
            res = ready.wait_for(|r| *r) => {
                res.map_err(|_| AccordError::Other("readiness signal dropped".into()))?;
            }
        }

        let first = self.engine.lock().await.start()?;
        self.broadcaster.broadcast(first);
        Ok(())
    }

    /// Feeds one inbound message through the engine and broadcasts whatever
    /// the engine asks for.
    pub async fn receive(&self, msg: VoteMessage) -> Result<Progress> {
        let progress = self.engine.lock().await.receive(msg)?;
        match &progress {
            Progress::FinalVote(out) | Progress::NextRound(out) => {
                self.broadcaster.broadcast(out.clone());
            }
            Progress::Pending | Progress::Decided(_) => {}
        }
        Ok(progress)
    }

    /// Stops the node: every future `start`/`receive` fails, and a start
    /// blocked on the readiness barrier wakes up and fails too. An already
    /// dispatched broadcast is not retracted.
    pub async fn stop(&self) {
        self.engine.lock().await.stop();
        let _ = self.stop_tx.send(true);
        info!("🛑 Node {} has been stopped", self.id);
    }

    /// Read-only state snapshot. Two calls with no intervening event return
    /// identical values.
    pub async fn state(&self) -> ConsensusState {
        self.engine.lock().await.state()
    }

    pub fn status(&self) -> NodeStatus {
        if self.faulty {
            NodeStatus::Faulty
        } else {
            NodeStatus::Live
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }
}
