use async_trait::async_trait;
use rand::Rng;

use accord_common::{NodeId, Value, VoteMessage};

/// Port for delivering one protocol message to one node.
///
/// Delivery is best-effort: implementations may drop, delay or reorder
/// messages, and the protocol tolerates up to F silent peers. Errors are
/// reported as strings so the broadcaster can log and move on.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, target: NodeId, msg: VoteMessage) -> Result<(), String>;
}

/// Source of the random bit used to break plurality ties between rounds.
///
/// Injectable so tests can make round advancement deterministic.
pub trait Coin: Send {
    fn flip(&mut self) -> Value;
}

/// Fair coin backed by the thread RNG.
#[derive(Debug, Default)]
pub struct RandomCoin;

impl Coin for RandomCoin {
    fn flip(&mut self) -> Value {
        if rand::thread_rng().gen_bool(0.5) {
            Value::One
        } else {
            Value::Zero
        }
    }
}
