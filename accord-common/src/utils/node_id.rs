use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier of a node inside the cluster, in `[0, N)`.
///
/// Node ids double as transport addresses: node `i` listens on
/// `base_port + i`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<usize> for NodeId {
    fn from(id: usize) -> Self {
        NodeId(id)
    }
}
