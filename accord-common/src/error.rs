use thiserror::Error;

use crate::utils::NodeId;

/// Errors surfaced by the protocol entry points.
///
/// None of these are retried internally: fault tolerance lives in the
/// quorum arithmetic, not in error recovery.
#[derive(Debug, Error)]
pub enum AccordError {
    /// The node is in fault mode and never executes the protocol.
    #[error("Node {0} is faulty")]
    FaultyNode(NodeId),

    /// The node was administratively stopped.
    #[error("Node {0} is stopped")]
    StoppedNode(NodeId),

    /// `start` was called on a node already running a round.
    #[error("Node {0} already started consensus")]
    AlreadyStarted(NodeId),

    /// An inbound message carried a phase the protocol does not know.
    #[error("Unrecognized phase: {0}")]
    UnrecognizedPhase(String),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AccordError>;
