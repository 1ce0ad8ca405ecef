use serde::{Deserialize, Serialize};

use super::types::{Phase, Value};

/// The complete wire shape exchanged between nodes:
/// `{round: integer, value: 0 | 1 | "?", phase: "decision" | "final"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteMessage {
    pub round: u64,
    pub value: Value,
    pub phase: Phase,
}

impl VoteMessage {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_the_wire_contract() {
        let msg = VoteMessage {
            round: 3,
            value: Value::Unknown,
            phase: Phase::Final,
        };
        let json = msg.to_json().unwrap();
        assert_eq!(json, r#"{"round":3,"value":"?","phase":"final"}"#);
        assert_eq!(VoteMessage::from_json(&json).unwrap(), msg);
    }

    #[test]
    fn rejects_unknown_phase_on_decode() {
        let err = VoteMessage::from_json(r#"{"round":1,"value":0,"phase":"commit"}"#);
        assert!(err.is_err());
    }
}
