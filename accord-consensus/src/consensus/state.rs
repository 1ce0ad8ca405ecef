use serde::{Deserialize, Serialize};

use accord_common::Value;

/// Snapshot of one node's protocol state, owned exclusively by its engine.
///
/// `round`, `estimate` and `decided` are `None` before the protocol starts
/// or while the node is faulty. Once `decided` is `true` the state is
/// permanently immutable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusState {
    /// Current round number; `None` before `start` or while faulty.
    pub round: Option<u64>,
    /// The node's current working value.
    pub estimate: Option<Value>,
    /// `Some(true)` once a final, immutable decision has been reached.
    pub decided: Option<bool>,
    /// `false` once the node has been administratively stopped. A stopped
    /// node rejects protocol actions but its state remains inspectable.
    pub alive: bool,
}

impl ConsensusState {
    /// Initial state of a correct node: not started, estimate preset.
    pub fn healthy(initial: Value) -> Self {
        Self {
            round: None,
            estimate: Some(initial),
            decided: Some(false),
            alive: true,
        }
    }

    /// A faulty node exposes no protocol state at all.
    pub fn faulted() -> Self {
        Self {
            round: None,
            estimate: None,
            decided: None,
            alive: true,
        }
    }

    /// Wipes the visible fields; used whenever a faulty node is poked.
    pub fn clear(&mut self) {
        self.round = None;
        self.estimate = None;
        self.decided = None;
    }

    pub fn is_decided(&self) -> bool {
        self.decided == Some(true)
    }
}
