use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::AccordError;

/// A consensus value carried by votes: a bit, or `Unknown` ("?") when no
/// majority was observed during a phase.
///
/// `Unknown` is a legitimate transient estimate; it is never a final
/// decision. The wire form is `0`, `1` or `"?"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Value {
    Zero,
    One,
    Unknown,
}

impl Value {
    /// The concrete bit, if this value carries one.
    pub fn as_bit(&self) -> Option<u8> {
        match self {
            Value::Zero => Some(0),
            Value::One => Some(1),
            Value::Unknown => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Value::Zero => "0",
            Value::One => "1",
            Value::Unknown => "?",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Value {
    type Err = AccordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "0" => Ok(Value::Zero),
            "1" => Ok(Value::One),
            "?" => Ok(Value::Unknown),
            other => Err(AccordError::Other(format!(
                "invalid consensus value: {other:?}"
            ))),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Zero => serializer.serialize_u64(0),
            Value::One => serializer.serialize_u64(1),
            Value::Unknown => serializer.serialize_str("?"),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("0, 1 or \"?\"")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                match v {
                    0 => Ok(Value::Zero),
                    1 => Ok(Value::One),
                    other => Err(E::custom(format!("invalid vote value: {}", other))),
                }
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                match v {
                    0 => Ok(Value::Zero),
                    1 => Ok(Value::One),
                    other => Err(E::custom(format!("invalid vote value: {}", other))),
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                match v {
                    "?" => Ok(Value::Unknown),
                    other => Err(E::custom(format!("invalid vote value: {:?}", other))),
                }
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

/// Phases of one consensus round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// First phase: nodes exchange their current estimates.
    Decision,
    /// Second phase: nodes exchange the majority verdicts they observed.
    Final,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Decision => "decision",
            Phase::Final => "final",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Phase {
    type Err = AccordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "decision" => Ok(Phase::Decision),
            "final" => Ok(Phase::Final),
            other => Err(AccordError::UnrecognizedPhase(other.to_string())),
        }
    }
}

/// Static sizing of the cluster: `n` nodes total, at most `f` faulty.
///
/// The safety argument assumes `n > 3f`. The type does not enforce the
/// bound; the node layer logs a warning when it is violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterParams {
    pub n: usize,
    pub f: usize,
}

impl ClusterParams {
    pub fn new(n: usize, f: usize) -> Self {
        Self { n, f }
    }

    /// Votes required before a phase outcome can be computed.
    pub fn quorum(&self) -> usize {
        self.n - self.f
    }

    /// Votes required to make a decision permanent in the final phase.
    pub fn supermajority(&self) -> usize {
        self.f + 1
    }

    /// True when `count` is a strict majority of the whole cluster.
    pub fn is_majority(&self, count: usize) -> bool {
        2 * count > self.n
    }

    /// Whether the `n > 3f` safety assumption holds.
    pub fn satisfies_safety_bound(&self) -> bool {
        self.n > 3 * self.f
    }
}
