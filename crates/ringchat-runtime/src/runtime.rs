//! Node event loop
//!
//! Drives a [`RingNode`] from its two event sources, inbound datagrams and
//! timer expiries, on one tokio task. Each event is processed to completion
//! before the next is taken, so no protocol state needs synchronization.
//! Effects returned by the core are applied in order: broadcasts go to the
//! transport (failures logged per attempt, no extra retry), timer effects
//! move the single live deadline.

use std::net::IpAddr;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use ringchat_core::{Effect, RingNode, TimerKind, WireCodec};

use crate::errors::Result;
use crate::faults::FaultInjector;
use crate::transport::Broadcast;

// ----------------------------------------------------------------------------
// Runtime Handle
// ----------------------------------------------------------------------------

/// Stop signal for a running [`NodeRuntime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl RuntimeHandle {
    /// Ask the runtime to stop after the event it is currently processing.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

// ----------------------------------------------------------------------------
// Node Runtime
// ----------------------------------------------------------------------------

/// What the select loop woke up for.
enum Tick {
    Inbound(Vec<u8>, IpAddr),
    Delayed(Vec<u8>),
    Timer,
    Shutdown,
    RecvFailed(std::io::Error),
}

/// Single-task event loop binding a protocol core to a transport.
pub struct NodeRuntime {
    node: RingNode,
    transport: Box<dyn Broadcast>,
    faults: FaultInjector,
    /// The single live protocol timer, if any.
    deadline: Option<(TimerKind, Instant)>,
    delayed_tx: mpsc::UnboundedSender<Vec<u8>>,
    delayed_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    shutdown_rx: mpsc::Receiver<()>,
    running: bool,
}

impl NodeRuntime {
    pub fn new(
        node: RingNode,
        transport: impl Broadcast + 'static,
        faults: FaultInjector,
    ) -> (Self, RuntimeHandle) {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (delayed_tx, delayed_rx) = mpsc::unbounded_channel();
        let runtime = Self {
            node,
            transport: Box::new(transport),
            faults,
            deadline: None,
            delayed_tx,
            delayed_rx,
            shutdown_rx,
            running: true,
        };
        (runtime, RuntimeHandle { shutdown_tx })
    }

    /// Run the protocol until shutdown; returns the final node state.
    pub async fn run(mut self) -> Result<RingNode> {
        info!(node = %self.node.name(), "starting protocol");
        let effects = self.node.join_network();
        self.apply(effects).await;

        while self.running {
            let deadline = self.deadline.map(|(_, at)| at);
            let tick = tokio::select! {
                received = self.transport.recv() => match received {
                    Ok((bytes, origin)) => Tick::Inbound(bytes, origin),
                    Err(err) => Tick::RecvFailed(err),
                },
                Some(bytes) = self.delayed_rx.recv() => Tick::Delayed(bytes),
                _ = sleep_until_opt(deadline), if deadline.is_some() => Tick::Timer,
                _ = self.shutdown_rx.recv() => Tick::Shutdown,
            };

            match tick {
                Tick::Inbound(bytes, origin) => self.on_datagram(bytes, origin).await,
                Tick::Delayed(bytes) => self.dispatch_frame(&bytes).await,
                Tick::Timer => self.on_timer().await,
                Tick::Shutdown => {
                    info!(node = %self.node.name(), "stopping protocol");
                    self.running = false;
                }
                Tick::RecvFailed(err) => {
                    error!(error = %err, "transport receive failed");
                }
            }
        }

        Ok(self.node)
    }

    /// Self-filter and fault-inject one raw datagram, then dispatch it.
    async fn on_datagram(&mut self, bytes: Vec<u8>, origin: IpAddr) {
        if self.transport.local_ip() == Some(origin) {
            return;
        }

        if self.faults.should_drop() {
            debug!("simulated datagram loss");
            return;
        }

        match self.faults.delay() {
            Some(delay) => {
                let tx = self.delayed_tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(bytes);
                });
            }
            None => self.dispatch_frame(&bytes).await,
        }
    }

    /// Decode one frame and feed it to the core; malformed input is logged
    /// and dropped, never fatal.
    async fn dispatch_frame(&mut self, bytes: &[u8]) {
        let message = match WireCodec::decode(bytes) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, "dropping malformed datagram");
                return;
            }
        };

        debug!(kind = message.kind(), sender = %message.sender_name(), "dispatching message");
        let effects = self.node.handle_message(message);
        self.apply(effects).await;
    }

    /// Fire the live timer. The core re-validates its state, so a deadline
    /// that raced a state change is harmless.
    async fn on_timer(&mut self) {
        let Some((kind, _)) = self.deadline.take() else {
            return;
        };
        debug!(timer = %kind, "timer expired");
        let effects = self.node.handle_timer(kind);
        self.apply(effects).await;
    }

    async fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Broadcast(message) => {
                    let bytes = match WireCodec::encode(&message) {
                        Ok(bytes) => bytes,
                        Err(err) => {
                            error!(kind = message.kind(), error = %err, "failed to encode message");
                            continue;
                        }
                    };
                    if let Err(err) = self.transport.send(&bytes).await {
                        error!(kind = message.kind(), error = %err, "broadcast failed");
                    }
                }
                Effect::ArmTimer(kind) => {
                    let duration = self.node.config().timer_duration(kind);
                    self.deadline = Some((kind, Instant::now() + duration));
                }
                Effect::CancelTimer => {
                    self.deadline = None;
                }
            }
        }
    }
}

/// Pending future when no timer is armed; the select guard keeps it from
/// being polled in that case.
async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
