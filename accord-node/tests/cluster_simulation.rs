use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex, RwLock};

use accord_common::{AccordError, ClusterParams, NodeId, Phase, Value, VoteMessage};
use accord_consensus::ports::{Coin, MessageSender};
use accord_consensus::{Broadcaster, ConsensusEngine, ConsensusNode, Progress};

/// Routes messages straight to in-process nodes, standing in for HTTP.
#[derive(Clone, Default)]
struct MockSender {
    nodes: Arc<RwLock<Vec<Arc<ConsensusNode>>>>,
}

#[async_trait]
impl MessageSender for MockSender {
    async fn send(&self, target: NodeId, msg: VoteMessage) -> Result<(), String> {
        let node = {
            let nodes = self.nodes.read().await;
            nodes.get(target.0).cloned()
        };
        match node {
            Some(node) => {
                // Receiver-side errors (faulty/stopped peers) are part of
                // normal operation, exactly like an HTTP 500.
                let _ = node.receive(msg).await;
                Ok(())
            }
            None => Err(format!("node {} not registered", target)),
        }
    }
}

/// Records every delivery instead of routing it.
#[derive(Clone, Default)]
struct RecordingSender {
    sent: Arc<Mutex<Vec<(NodeId, VoteMessage)>>>,
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, target: NodeId, msg: VoteMessage) -> Result<(), String> {
        self.sent.lock().await.push((target, msg));
        Ok(())
    }
}

/// Deterministic coin so round advancement never depends on luck.
struct FixedCoin(Value);

impl Coin for FixedCoin {
    fn flip(&mut self) -> Value {
        self.0
    }
}

struct ClusterHarness {
    nodes: Vec<Arc<ConsensusNode>>,
    // Keeps the readiness senders alive for the whole test.
    _ready_guards: Vec<watch::Sender<bool>>,
}

async fn build_cluster(n: usize, f: usize, initials: &[Value], faulty: &[bool]) -> ClusterHarness {
    let params = ClusterParams::new(n, f);
    let sender = MockSender::default();

    let mut nodes = Vec::with_capacity(n);
    let mut guards = Vec::with_capacity(n);
    for id in 0..n {
        // Barrier already open: all "nodes" exist before the test starts.
        let (ready_tx, ready_rx) = watch::channel(true);
        guards.push(ready_tx);

        let engine = ConsensusEngine::new(
            NodeId(id),
            params,
            initials[id],
            faulty[id],
            Box::new(FixedCoin(Value::One)),
        );
        let broadcaster = Broadcaster::new(Arc::new(sender.clone()), n);
        nodes.push(Arc::new(ConsensusNode::new(
            NodeId(id),
            engine,
            broadcaster,
            ready_rx,
        )));
    }
    sender.nodes.write().await.extend(nodes.iter().cloned());

    ClusterHarness {
        nodes,
        _ready_guards: guards,
    }
}

/// Polls until `nodes` have all decided, asserting they agree.
async fn await_agreement(nodes: &[Arc<ConsensusNode>]) -> Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let mut decisions = Vec::new();
        for node in nodes {
            let state = node.state().await;
            if state.decided == Some(true) {
                decisions.push(state.estimate.expect("decided without estimate"));
            }
        }
        if decisions.len() == nodes.len() {
            assert!(
                decisions.windows(2).all(|w| w[0] == w[1]),
                "nodes decided different values: {:?}",
                decisions
            );
            return decisions[0];
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "cluster did not decide in time"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn cluster_reaches_agreement_from_split_initials() {
    let initials = [Value::Zero, Value::Zero, Value::One, Value::One];
    let cluster = build_cluster(4, 1, &initials, &[false; 4]).await;

    for node in &cluster.nodes {
        node.start().await.unwrap();
    }

    let decided = await_agreement(&cluster.nodes).await;
    assert!(decided == Value::Zero || decided == Value::One);
}

#[tokio::test]
async fn cluster_with_unanimous_initials_decides_that_value() {
    let initials = [Value::One; 4];
    let cluster = build_cluster(4, 1, &initials, &[false; 4]).await;

    for node in &cluster.nodes {
        node.start().await.unwrap();
    }

    assert_eq!(await_agreement(&cluster.nodes).await, Value::One);
}

#[tokio::test]
async fn faulty_node_never_participates() {
    let initials = [Value::One; 4];
    let faulty = [false, false, false, true];
    let cluster = build_cluster(4, 1, &initials, &faulty).await;

    // The faulty node refuses to start and exposes no state.
    let err = cluster.nodes[3].start().await.unwrap_err();
    assert!(matches!(err, AccordError::FaultyNode(NodeId(3))));
    let state = cluster.nodes[3].state().await;
    assert_eq!(state.round, None);
    assert_eq!(state.estimate, None);
    assert_eq!(state.decided, None);

    for node in &cluster.nodes[..3] {
        node.start().await.unwrap();
    }

    // The three correct nodes still reach quorum (N - F = 3) and decide.
    assert_eq!(await_agreement(&cluster.nodes[..3]).await, Value::One);

    // Feeding the faulty node directly changes nothing either.
    let err = cluster.nodes[3]
        .receive(VoteMessage {
            round: 1,
            value: Value::One,
            phase: Phase::Decision,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccordError::FaultyNode(NodeId(3))));
    let state = cluster.nodes[3].state().await;
    assert_eq!(state.decided, None);
}

#[tokio::test]
async fn stopped_node_rejects_protocol_actions_but_keeps_state() {
    let initials = [Value::One; 4];
    let cluster = build_cluster(4, 1, &initials, &[false; 4]).await;

    cluster.nodes[0].stop().await;

    let err = cluster.nodes[0].start().await.unwrap_err();
    assert!(matches!(err, AccordError::StoppedNode(NodeId(0))));

    let err = cluster.nodes[0]
        .receive(VoteMessage {
            round: 1,
            value: Value::Zero,
            phase: Phase::Decision,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AccordError::StoppedNode(NodeId(0))));

    // State persists for inspection after the stop.
    let state = cluster.nodes[0].state().await;
    assert!(!state.alive);
    assert_eq!(state.estimate, Some(Value::One));
}

#[tokio::test]
async fn decision_quorum_broadcasts_exactly_one_final_round() {
    let params = ClusterParams::new(4, 1);
    let sender = RecordingSender::default();
    let (_ready_tx, ready_rx) = watch::channel(true);

    let engine = ConsensusEngine::new(
        NodeId(0),
        params,
        Value::Zero,
        false,
        Box::new(FixedCoin(Value::One)),
    );
    let node = ConsensusNode::new(
        NodeId(0),
        engine,
        Broadcaster::new(Arc::new(sender.clone()), 4),
        ready_rx,
    );

    let vote = VoteMessage {
        round: 1,
        value: Value::Zero,
        phase: Phase::Decision,
    };

    // N - F - 1 votes: pending, nothing broadcast.
    for _ in 0..2 {
        let progress = node.receive(vote.clone()).await.unwrap();
        assert_eq!(progress, Progress::Pending);
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(sender.sent.lock().await.is_empty());

    // The N - F-th vote fires one broadcast, fanned out to all 4 nodes.
    let progress = node.receive(vote.clone()).await.unwrap();
    assert!(matches!(progress, Progress::FinalVote(_)));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if sender.sent.lock().await.len() == 4 {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "final votes were not fanned out"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    for (_, msg) in sender.sent.lock().await.iter() {
        assert_eq!(
            msg,
            &VoteMessage {
                round: 1,
                value: Value::Zero,
                phase: Phase::Final,
            }
        );
    }

    // Extra votes past the threshold never re-fire the quorum.
    let progress = node.receive(vote).await.unwrap();
    assert_eq!(progress, Progress::Pending);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sender.sent.lock().await.len(), 4);
}

#[tokio::test]
async fn start_blocked_on_readiness_is_cancelled_by_stop() {
    let params = ClusterParams::new(4, 1);
    let sender = RecordingSender::default();
    // Barrier never opens.
    let (_ready_tx, ready_rx) = watch::channel(false);

    let engine = ConsensusEngine::new(
        NodeId(1),
        params,
        Value::Zero,
        false,
        Box::new(FixedCoin(Value::One)),
    );
    let node = Arc::new(ConsensusNode::new(
        NodeId(1),
        engine,
        Broadcaster::new(Arc::new(sender.clone()), 4),
        ready_rx,
    ));

    let starter = {
        let node = Arc::clone(&node);
        tokio::spawn(async move { node.start().await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!starter.is_finished(), "start should wait on the barrier");

    node.stop().await;
    let result = starter.await.unwrap();
    assert!(matches!(result, Err(AccordError::StoppedNode(NodeId(1)))));
    assert!(sender.sent.lock().await.is_empty());
}

#[tokio::test]
async fn state_snapshot_is_idempotent() {
    let cluster = build_cluster(4, 1, &[Value::Zero; 4], &[false; 4]).await;

    let a = cluster.nodes[0].state().await;
    let b = cluster.nodes[0].state().await;
    assert_eq!(a, b);
}
