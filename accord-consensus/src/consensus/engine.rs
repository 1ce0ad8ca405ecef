use tracing::info;

use accord_common::{AccordError, ClusterParams, NodeId, Phase, Result, Value, VoteMessage};

use super::ledger::RoundLedger;
use super::state::ConsensusState;
use crate::ports::Coin;

/// Outcome of feeding one event into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// Vote recorded; quorum not reached yet, or already fired for the pair.
    Pending,
    /// Decision-phase quorum fired: the verdict must go out as a final vote.
    FinalVote(VoteMessage),
    /// Final-phase quorum fired without a supermajority: the next round's
    /// decision vote must go out.
    NextRound(VoteMessage),
    /// Final-phase quorum fired with a supermajority: the value is permanent.
    Decided(Value),
}

/// Máquina de estados de consenso de um único nó.
///
/// The engine is purely synchronous: it mutates local state and hands the
/// caller whatever message must be broadcast next. Serializing concurrent
/// receives is the owner's job (see [`crate::node::ConsensusNode`]); the
/// quorum check and its one-shot guard must never race.
pub struct ConsensusEngine {
    id: NodeId,
    params: ClusterParams,
    initial: Value,
    faulty: bool,
    state: ConsensusState,
    ledger: RoundLedger,
    coin: Box<dyn Coin>,
}

impl ConsensusEngine {
    pub fn new(
        id: NodeId,
        params: ClusterParams,
        initial: Value,
        faulty: bool,
        coin: Box<dyn Coin>,
    ) -> Self {
        let state = if faulty {
            ConsensusState::faulted()
        } else {
            ConsensusState::healthy(initial)
        };
        Self {
            id,
            params,
            initial,
            faulty,
            state,
            ledger: RoundLedger::new(),
            coin,
        }
    }

    /// Read-only snapshot of the node state.
    pub fn state(&self) -> ConsensusState {
        self.state.clone()
    }

    /// The vote ledger, kept inspectable even for retired rounds.
    pub fn ledger(&self) -> &RoundLedger {
        &self.ledger
    }

    pub fn is_faulty(&self) -> bool {
        self.faulty
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Enters round 1 and returns the first decision vote for broadcast.
    ///
    /// The caller must have waited on the readiness barrier first. Calling
    /// `start` on a node already in a round is an error: re-broadcasting
    /// round 1 would double-count votes at every peer.
    pub fn start(&mut self) -> Result<VoteMessage> {
        self.guard()?;
        if self.state.round.is_some() {
            return Err(AccordError::AlreadyStarted(self.id));
        }

        self.state.round = Some(1);
        self.state.estimate = Some(self.initial);
        self.state.decided = Some(false);

        info!(
            "🚀 Node {} entering round 1 with estimate {}",
            self.id, self.initial
        );
        tracing::info!(
            target: "consensus",
            "EVENT:START node={} estimate={}",
            self.id,
            self.initial
        );

        Ok(VoteMessage {
            round: 1,
            value: self.initial,
            phase: Phase::Decision,
        })
    }

    /// Feeds one inbound vote into the state machine.
    pub fn receive(&mut self, msg: VoteMessage) -> Result<Progress> {
        self.guard()?;
        tracing::debug!(
            target: "consensus",
            "EVENT:VOTE node={} round={} phase={} value={}",
            self.id,
            msg.round,
            msg.phase,
            msg.value
        );
        match msg.phase {
            Phase::Decision => Ok(self.on_decision(msg.round, msg.value)),
            Phase::Final => Ok(self.on_final(msg.round, msg.value)),
        }
    }

    /// Administratively stops the node. All future protocol calls get
    /// `StoppedNode`; state stays inspectable.
    pub fn stop(&mut self) {
        self.state.alive = false;
    }

    /// Fault and liveness guards shared by every protocol entry point.
    fn guard(&mut self) -> Result<()> {
        if self.faulty {
            // A faulty node wipes its visible state every time it is poked.
            self.state.clear();
            return Err(AccordError::FaultyNode(self.id));
        }
        if !self.state.alive {
            return Err(AccordError::StoppedNode(self.id));
        }
        Ok(())
    }

    fn on_decision(&mut self, round: u64, value: Value) -> Progress {
        let received = self.ledger.append(round, Phase::Decision, value);
        if received < self.params.quorum() || !self.ledger.try_fire(round, Phase::Decision) {
            return Progress::Pending;
        }

        let (zeros, ones) = self.ledger.tally(round, Phase::Decision);
        let verdict = if self.params.is_majority(zeros) {
            Value::Zero
        } else if self.params.is_majority(ones) {
            Value::One
        } else {
            Value::Unknown
        };

        info!(
            "🗳️ Node {} round {}: decision quorum with {} votes ({} zeros / {} ones) -> verdict {}",
            self.id, round, received, zeros, ones, verdict
        );
        tracing::info!(
            target: "consensus",
            "EVENT:QUORUM node={} round={} phase=decision verdict={}",
            self.id,
            round,
            verdict
        );

        Progress::FinalVote(VoteMessage {
            round,
            value: verdict,
            phase: Phase::Final,
        })
    }

    fn on_final(&mut self, round: u64, value: Value) -> Progress {
        let received = self.ledger.append(round, Phase::Final, value);
        if received < self.params.quorum() || !self.ledger.try_fire(round, Phase::Final) {
            return Progress::Pending;
        }

        let (zeros, ones) = self.ledger.tally(round, Phase::Final);

        if self.state.is_decided() {
            // The decision is immutable; a late quorum must not reopen rounds.
            return Progress::Decided(self.state.estimate.unwrap_or(Value::Unknown));
        }

        if ones >= self.params.supermajority() {
            return self.decide(round, Value::One, zeros, ones);
        }
        if zeros >= self.params.supermajority() {
            return self.decide(round, Value::Zero, zeros, ones);
        }

        // No supermajority: take the plurality bit, coin flip on an exact tie
        // (including the all-unknown tally).
        let estimate = if zeros > ones {
            Value::Zero
        } else if ones > zeros {
            Value::One
        } else {
            self.coin.flip()
        };
        let next = round + 1;
        self.state.estimate = Some(estimate);
        self.state.round = Some(next);

        info!(
            "🔁 Node {} advancing to round {} with estimate {} ({} zeros / {} ones)",
            self.id, next, estimate, zeros, ones
        );
        tracing::info!(
            target: "consensus",
            "EVENT:ADVANCE node={} round={} estimate={}",
            self.id,
            next,
            estimate
        );

        Progress::NextRound(VoteMessage {
            round: next,
            value: estimate,
            phase: Phase::Decision,
        })
    }

    fn decide(&mut self, round: u64, value: Value, zeros: usize, ones: usize) -> Progress {
        self.state.estimate = Some(value);
        self.state.decided = Some(true);

        info!(
            "🎉 Node {} DECIDED {} at round {} ({} zeros / {} ones)",
            self.id, value, round, zeros, ones
        );
        tracing::info!(
            target: "consensus",
            "EVENT:DECIDE node={} round={} value={}",
            self.id,
            round,
            value
        );

        Progress::Decided(value)
    }
}
