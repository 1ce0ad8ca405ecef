pub mod broadcast;
pub mod consensus;
pub mod node;
pub mod ports;

pub use broadcast::Broadcaster;
pub use consensus::engine::{ConsensusEngine, Progress};
pub use consensus::ledger::RoundLedger;
pub use consensus::state::ConsensusState;
pub use node::{ConsensusNode, NodeStatus};
pub use ports::{Coin, MessageSender, RandomCoin};
