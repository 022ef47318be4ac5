//! Event-loop integration
//!
//! Runs two complete node runtimes against an in-memory broadcast channel
//! that mimics multicast loopback: every send reaches every endpoint,
//! including the sender, which must filter itself out by origin address.

use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;

use ringchat_core::{ChatLog, ProtocolConfig, RingNode};
use ringchat_runtime::{Broadcast, FaultInjector, NodeRuntime};

// ----------------------------------------------------------------------------
// In-Memory Broadcast Channel
// ----------------------------------------------------------------------------

type Frame = (Vec<u8>, IpAddr);

struct ChannelTransport {
    tx: broadcast::Sender<Frame>,
    rx: broadcast::Receiver<Frame>,
    addr: IpAddr,
}

impl ChannelTransport {
    fn pair_on(tx: &broadcast::Sender<Frame>, host: u8) -> Self {
        Self {
            tx: tx.clone(),
            rx: tx.subscribe(),
            addr: IpAddr::V4(Ipv4Addr::new(10, 0, 0, host)),
        }
    }
}

#[async_trait]
impl Broadcast for ChannelTransport {
    async fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let _ = self.tx.send((bytes.to_vec(), self.addr));
        Ok(())
    }

    async fn recv(&mut self) -> io::Result<Frame> {
        loop {
            match self.rx.recv().await {
                Ok(frame) => return Ok(frame),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    // Peers are gone; park until the runtime is shut down.
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn local_ip(&self) -> Option<IpAddr> {
        Some(self.addr)
    }
}

// ----------------------------------------------------------------------------
// Scenarios
// ----------------------------------------------------------------------------

/// Bootstrap node: gives up joining after ~100ms and founds the ring.
fn founder_config() -> ProtocolConfig {
    ProtocolConfig {
        join_response_timeout: Duration::from_millis(50),
        token_hold_duration: Duration::from_millis(100),
        bootstrap: true,
        ..ProtocolConfig::default()
    }
}

/// Late joiner: retries slowly enough that it always finds the founder's
/// ring instead of racing it into a second one.
fn joiner_config() -> ProtocolConfig {
    ProtocolConfig {
        join_response_timeout: Duration::from_millis(250),
        token_hold_duration: Duration::from_millis(100),
        bootstrap: false,
        ..ProtocolConfig::default()
    }
}

#[tokio::test]
async fn two_nodes_share_a_log_over_the_loop() {
    let (bus, _keepalive) = broadcast::channel::<Frame>(1024);

    let alice = RingNode::new("alice".into(), founder_config(), ChatLog::ephemeral());
    let bob = RingNode::new("bob".into(), joiner_config(), ChatLog::ephemeral());

    let (alice_rt, alice_handle) = NodeRuntime::new(
        alice,
        ChannelTransport::pair_on(&bus, 1),
        FaultInjector::passthrough(),
    );
    let (bob_rt, bob_handle) = NodeRuntime::new(
        bob,
        ChannelTransport::pair_on(&bus, 2),
        FaultInjector::passthrough(),
    );

    let alice_task = tokio::spawn(alice_rt.run());
    let bob_task = tokio::spawn(bob_rt.run());

    // Let alice bootstrap, bob join, and the token make several laps.
    tokio::time::sleep(Duration::from_secs(2)).await;
    alice_handle.shutdown().await;
    bob_handle.shutdown().await;

    let alice = alice_task.await.unwrap().unwrap();
    let bob = bob_task.await.unwrap().unwrap();

    // Both nodes spoke: the token visited each of them.
    assert!(
        alice.log().entries().any(|e| e.sender_name.as_str() == "bob"),
        "alice must have stored messages produced by bob"
    );
    assert!(
        bob.log().entries().any(|e| e.sender_name.as_str() == "alice"),
        "bob must have stored messages produced by alice"
    );

    // Replicas agree wherever they overlap.
    for entry in bob.log().entries() {
        if let Some(other) = alice.log().get(entry.index) {
            assert_eq!(other, entry, "replicas disagree at index {}", entry.index);
        }
    }

    // Reconciliation kept each log contiguous over the produced sequence,
    // which starts at index 1.
    for node in [&alice, &bob] {
        let max = node.log().max_index().expect("log must not be empty");
        let missing: Vec<u64> = (1..=max).filter(|i| !node.log().contains(*i)).collect();
        assert!(
            missing.is_empty(),
            "{} is missing indexes {missing:?}",
            node.name()
        );
    }
}

#[tokio::test]
async fn lone_bootstrap_node_keeps_the_token() {
    let (bus, _keepalive) = broadcast::channel::<Frame>(64);

    let alice = RingNode::new("alice".into(), founder_config(), ChatLog::ephemeral());
    let (runtime, handle) = NodeRuntime::new(
        alice,
        ChannelTransport::pair_on(&bus, 1),
        FaultInjector::passthrough(),
    );

    let task = tokio::spawn(runtime.run());
    tokio::time::sleep(Duration::from_millis(700)).await;
    handle.shutdown().await;

    let alice = task.await.unwrap().unwrap();
    assert!(
        alice.state().is_token_owning(),
        "a sole member never relinquishes the token"
    );
    // Exactly the bootstrap message: hold renewals do not emit.
    assert_eq!(alice.log().len(), 1);
}
