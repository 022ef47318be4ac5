//! Membership, token circulation, and chat handling for a single node
//!
//! [`RingNode`] owns the node's [`NetworkState`] and [`ChatLog`] and is the
//! dispatch boundary of the protocol: every validated inbound message and
//! every timer expiry is routed through it. Handlers are guarded partial
//! functions; when the current state does not match a handler's
//! precondition the event is silently ignored. That guard doubles as the
//! staleness check for timers, which may fire after the state they were
//! armed in has already been left.
//!
//! Handlers never perform io. Outbound traffic and timer changes are
//! returned as [`Effect`]s for the runtime to apply.

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::{debug, info};

use crate::config::ProtocolConfig;
use crate::protocol::log::ChatLog;
use crate::protocol::message::{ChatEntry, WireMessage};
use crate::protocol::state::{NetworkState, TimerKind};
use crate::types::NodeName;

// ----------------------------------------------------------------------------
// Effects
// ----------------------------------------------------------------------------

/// Side effects requested by a protocol handler, applied by the runtime in
/// order. Loss-sensitive broadcasts appear multiple times, once per copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send one datagram to the whole group.
    Broadcast(WireMessage),
    /// Arm the given timer, replacing any live one.
    ArmTimer(TimerKind),
    /// Cancel the live timer, if any.
    CancelTimer,
}

// ----------------------------------------------------------------------------
// Ring Node
// ----------------------------------------------------------------------------

/// Protocol state machine for one ring member.
pub struct RingNode {
    name: NodeName,
    config: ProtocolConfig,
    state: NetworkState,
    log: ChatLog,
}

impl RingNode {
    pub fn new(name: NodeName, config: ProtocolConfig, log: ChatLog) -> Self {
        Self {
            name,
            config,
            state: NetworkState::Unconnected,
            log,
        }
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn state(&self) -> &NetworkState {
        &self.state
    }

    pub fn log(&self) -> &ChatLog {
        &self.log
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Ask to join the ring. Only meaningful while `Unconnected`.
    pub fn join_network(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.state != NetworkState::Unconnected {
            return effects;
        }

        info!("sending join network request");
        effects.push(Effect::Broadcast(WireMessage::JoinNetworkRequest {
            sender_name: self.name.clone(),
        }));
        effects.push(Effect::ArmTimer(TimerKind::JoinResponse));
        self.state = NetworkState::Connecting { attempts: 1 };
        effects
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    /// Route a validated inbound message to its handler.
    pub fn handle_message(&mut self, message: WireMessage) -> Vec<Effect> {
        let mut effects = Vec::new();
        match message {
            WireMessage::JoinNetworkRequest { sender_name } => {
                self.on_join_request(sender_name, &mut effects)
            }
            WireMessage::JoinNetworkResponse {
                requester_node_name,
                ..
            } => self.on_join_response(requester_node_name, &mut effects),
            WireMessage::PassToken {
                target,
                message_index,
                node_list,
                ..
            } => self.on_pass_token(target, message_index, node_list, &mut effects),
            WireMessage::ChatMessage(entry) => self.on_chat_message(entry, &mut effects),
            WireMessage::RequestChatMessageHistory {
                requested_indexes, ..
            } => self.on_history_request(&requested_indexes, &mut effects),
            WireMessage::MessageHistoryAnnouncement { messages, .. } => {
                self.on_history_announcement(messages)
            }
        }
        effects
    }

    /// Route a timer expiry to its handler. The handler re-validates the
    /// current state, so a stale firing is a cheap no-op.
    pub fn handle_timer(&mut self, timer: TimerKind) -> Vec<Effect> {
        let mut effects = Vec::new();
        match timer {
            TimerKind::JoinResponse => self.on_join_response_timeout(&mut effects),
            TimerKind::TokenHold => self.on_token_hold_timeout(&mut effects),
        }
        effects
    }

    // ------------------------------------------------------------------------
    // Membership & Token Handlers
    // ------------------------------------------------------------------------

    fn on_join_response_timeout(&mut self, effects: &mut Vec<Effect>) {
        let NetworkState::Connecting { attempts } = self.state else {
            debug!("stale join-response timer, ignoring");
            return;
        };

        if attempts <= self.config.effective_join_attempts() {
            info!(attempt = attempts + 1, "no join response, retrying");
            effects.push(Effect::Broadcast(WireMessage::JoinNetworkRequest {
                sender_name: self.name.clone(),
            }));
            effects.push(Effect::ArmTimer(TimerKind::JoinResponse));
            self.state = NetworkState::Connecting {
                attempts: attempts + 1,
            };
        } else {
            info!("join attempts exhausted, starting a new network");
            self.bootstrap_network(effects);
        }
    }

    /// Become the sole member of a fresh ring and seed it with one message.
    fn bootstrap_network(&mut self, effects: &mut Vec<Effect>) {
        self.state = NetworkState::TokenOwning {
            next_index: self.log.len() as u64,
            ring: vec![self.name.clone()],
        };
        effects.push(Effect::ArmTimer(TimerKind::TokenHold));
        self.emit_chat_message(effects);
    }

    fn on_join_request(&mut self, sender: NodeName, effects: &mut Vec<Effect>) {
        let NetworkState::TokenOwning { ring, .. } = &mut self.state else {
            return;
        };

        if !ring.contains(&sender) {
            ring.push(sender.clone());
            info!(requester = %sender, ring = ?ring, "admitted node to the ring");
        }

        let response = WireMessage::JoinNetworkResponse {
            sender_name: self.name.clone(),
            requester_node_name: sender,
        };
        self.broadcast_redundant(response, effects);
    }

    fn on_join_response(&mut self, requester: NodeName, effects: &mut Vec<Effect>) {
        if requester != self.name {
            return;
        }
        if !matches!(self.state, NetworkState::Connecting { .. }) {
            // Duplicate or late response; we already joined.
            return;
        }

        info!("join accepted, entering the ring");
        effects.push(Effect::CancelTimer);
        self.state = NetworkState::NoTokenOwning;
    }

    fn on_token_hold_timeout(&mut self, effects: &mut Vec<Effect>) {
        let NetworkState::TokenOwning { next_index, ring } = &self.state else {
            debug!("stale token-hold timer, ignoring");
            return;
        };

        if ring.len() < 2 {
            debug!("sole ring member, renewing token hold");
            effects.push(Effect::ArmTimer(TimerKind::TokenHold));
            return;
        }

        let target = Self::next_in_ring(ring, &self.name);
        info!(target = %target, "token hold expired, passing token");

        let pass = WireMessage::PassToken {
            sender_name: self.name.clone(),
            target,
            message_index: *next_index,
            node_list: ring.clone(),
        };
        effects.push(Effect::CancelTimer);
        self.state = NetworkState::NoTokenOwning;
        self.broadcast_redundant(pass, effects);
    }

    fn on_pass_token(
        &mut self,
        target: NodeName,
        message_index: u64,
        node_list: Vec<NodeName>,
        effects: &mut Vec<Effect>,
    ) {
        if target != self.name {
            return;
        }
        if self.state != NetworkState::NoTokenOwning {
            return;
        }

        info!(next_index = message_index, "received the token");
        self.state = NetworkState::TokenOwning {
            next_index: message_index,
            ring: node_list,
        };
        effects.push(Effect::ArmTimer(TimerKind::TokenHold));
        self.emit_chat_message(effects);
    }

    /// Round-robin successor of `name` in the ring.
    fn next_in_ring(ring: &[NodeName], name: &NodeName) -> NodeName {
        let position = ring.iter().position(|n| n == name);
        let next = position.map(|i| (i + 1) % ring.len()).unwrap_or(0);
        ring[next].clone()
    }

    // ------------------------------------------------------------------------
    // Chat & Reconciliation Handlers
    // ------------------------------------------------------------------------

    /// Produce one chat message while holding the token: assign the next
    /// index, persist locally, broadcast redundantly.
    fn emit_chat_message(&mut self, effects: &mut Vec<Effect>) {
        let NetworkState::TokenOwning { next_index, .. } = &mut self.state else {
            return;
        };

        *next_index += 1;
        let entry = ChatEntry {
            sender_name: self.name.clone(),
            message: simulated_text(),
            index: *next_index,
        };

        let size = self.log.append(entry.clone());
        info!(index = entry.index, log_size = size, "broadcasting chat message");
        self.broadcast_redundant(WireMessage::ChatMessage(entry), effects);
    }

    fn on_chat_message(&mut self, entry: ChatEntry, effects: &mut Vec<Effect>) {
        if self.state != NetworkState::NoTokenOwning {
            return;
        }

        let index = entry.index;
        if self.log.contains(index) {
            debug!(index, "duplicate chat message, dropping");
        } else {
            let size = self.log.append(entry);
            info!(index, log_size = size, "stored chat message");
        }

        // A log that tracks the sequence holds exactly index + 1 entries;
        // anything else means something was missed along the way.
        if self.log.len() as u64 != index + 1 {
            self.request_history(effects);
        }
    }

    fn request_history(&mut self, effects: &mut Vec<Effect>) {
        let gaps = self.log.find_gaps();
        info!(missing = ?gaps, "requesting chat message history");
        effects.push(Effect::Broadcast(WireMessage::RequestChatMessageHistory {
            sender_name: self.name.clone(),
            requested_indexes: gaps,
        }));
    }

    fn on_history_request(&mut self, requested: &[u64], effects: &mut Vec<Effect>) {
        if !self.state.is_token_owning() {
            return;
        }

        // Answer strictly from the local view; missing indexes are simply
        // not included and the requester gets no completeness guarantee.
        let messages = self.log.select(requested);
        debug!(
            requested = requested.len(),
            answered = messages.len(),
            "answering history request"
        );
        effects.push(Effect::Broadcast(WireMessage::MessageHistoryAnnouncement {
            sender_name: self.name.clone(),
            messages,
        }));
    }

    fn on_history_announcement(&mut self, messages: Vec<ChatEntry>) {
        for entry in messages {
            if !self.log.contains(entry.index) {
                let index = entry.index;
                let size = self.log.append(entry);
                info!(index, log_size = size, "recovered missing chat message");
            }
        }
    }

    fn broadcast_redundant(&self, message: WireMessage, effects: &mut Vec<Effect>) {
        for _ in 0..self.config.broadcast_redundancy {
            effects.push(Effect::Broadcast(message.clone()));
        }
    }
}

/// Placeholder chat content; the protocol exercises itself rather than
/// carrying user input.
fn simulated_text() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("simulated message {suffix}")
}
