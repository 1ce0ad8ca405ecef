pub mod error;
pub mod protocol;
pub mod utils;

pub use error::{AccordError, Result};
pub use protocol::message::VoteMessage;
pub use protocol::types::{ClusterParams, Phase, Value};
pub use utils::NodeId;
