use std::collections::{HashMap, HashSet};

use accord_common::{Phase, Value};

/// Armazena os votos recebidos por rodada, separados por fase.
///
/// Votes are appended in arrival order and never deduplicated: the protocol
/// counts raw arrivals, assuming each honest node sends one vote per
/// `(round, phase)`. Rounds are never evicted, so past rounds remain
/// available for inspection after their quorum has fired.
#[derive(Debug, Default, Clone)]
pub struct RoundLedger {
    decision_votes: HashMap<u64, Vec<Value>>,
    final_votes: HashMap<u64, Vec<Value>>,
    // (round, phase) pairs whose quorum transition already ran.
    fired: HashSet<(u64, Phase)>,
}

impl RoundLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a vote and returns the running count for that `(round, phase)`.
    pub fn append(&mut self, round: u64, phase: Phase, value: Value) -> usize {
        let bucket = self.bucket_mut(phase).entry(round).or_default();
        bucket.push(value);
        bucket.len()
    }

    /// Votes received so far for a `(round, phase)`, in arrival order.
    pub fn votes(&self, round: u64, phase: Phase) -> &[Value] {
        self.bucket(phase)
            .get(&round)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Counts `(zeros, ones)` among the received votes. `Unknown` votes are
    /// present in the sequence but carry no bit, so they count for neither.
    pub fn tally(&self, round: u64, phase: Phase) -> (usize, usize) {
        let votes = self.votes(round, phase);
        let zeros = votes.iter().filter(|v| **v == Value::Zero).count();
        let ones = votes.iter().filter(|v| **v == Value::One).count();
        (zeros, ones)
    }

    /// Marks the quorum for `(round, phase)` as fired. Returns `true` only
    /// the first time, so the phase transition runs exactly once even when
    /// votes keep arriving past the threshold.
    pub fn try_fire(&mut self, round: u64, phase: Phase) -> bool {
        self.fired.insert((round, phase))
    }

    /// Whether the quorum for `(round, phase)` already fired.
    pub fn has_fired(&self, round: u64, phase: Phase) -> bool {
        self.fired.contains(&(round, phase))
    }

    /// True when no vote was ever recorded.
    pub fn is_empty(&self) -> bool {
        self.decision_votes.is_empty() && self.final_votes.is_empty()
    }

    fn bucket(&self, phase: Phase) -> &HashMap<u64, Vec<Value>> {
        match phase {
            Phase::Decision => &self.decision_votes,
            Phase::Final => &self.final_votes,
        }
    }

    fn bucket_mut(&mut self, phase: Phase) -> &mut HashMap<u64, Vec<Value>> {
        match phase {
            Phase::Decision => &mut self.decision_votes,
            Phase::Final => &mut self.final_votes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_in_arrival_order_without_dedup() {
        let mut ledger = RoundLedger::new();

        assert_eq!(ledger.append(1, Phase::Decision, Value::One), 1);
        assert_eq!(ledger.append(1, Phase::Decision, Value::Zero), 2);
        // Raw arrivals: the same value appended twice counts twice.
        assert_eq!(ledger.append(1, Phase::Decision, Value::One), 3);

        assert_eq!(
            ledger.votes(1, Phase::Decision),
            &[Value::One, Value::Zero, Value::One]
        );
    }

    #[test]
    fn phases_are_independent() {
        let mut ledger = RoundLedger::new();
        ledger.append(1, Phase::Decision, Value::Zero);
        ledger.append(1, Phase::Final, Value::One);

        assert_eq!(ledger.votes(1, Phase::Decision), &[Value::Zero]);
        assert_eq!(ledger.votes(1, Phase::Final), &[Value::One]);
        assert_eq!(ledger.votes(2, Phase::Decision), &[] as &[Value]);
    }

    #[test]
    fn tally_ignores_unknown_votes() {
        let mut ledger = RoundLedger::new();
        ledger.append(2, Phase::Final, Value::Zero);
        ledger.append(2, Phase::Final, Value::Unknown);
        ledger.append(2, Phase::Final, Value::One);
        ledger.append(2, Phase::Final, Value::Zero);

        assert_eq!(ledger.tally(2, Phase::Final), (2, 1));
    }

    #[test]
    fn quorum_fires_exactly_once_per_round_and_phase() {
        let mut ledger = RoundLedger::new();

        assert!(ledger.try_fire(1, Phase::Decision));
        assert!(!ledger.try_fire(1, Phase::Decision));
        assert!(ledger.has_fired(1, Phase::Decision));

        // Same round, other phase: independent guard.
        assert!(ledger.try_fire(1, Phase::Final));
        // Other round: independent guard.
        assert!(ledger.try_fire(2, Phase::Decision));
    }

    #[test]
    fn fired_rounds_stay_inspectable() {
        let mut ledger = RoundLedger::new();
        ledger.append(1, Phase::Decision, Value::One);
        ledger.try_fire(1, Phase::Decision);

        assert_eq!(ledger.votes(1, Phase::Decision), &[Value::One]);
    }
}
