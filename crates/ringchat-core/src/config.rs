//! Protocol configuration
//!
//! Timing parameters and retry budgets for the membership handshake and
//! token circulation. Defaults mirror the reference deployment: a 2 second
//! join-response timeout, three join attempts, a 2.5 second token hold, and
//! threefold redundancy on loss-sensitive broadcasts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::protocol::state::TimerKind;

// ----------------------------------------------------------------------------
// Protocol Configuration
// ----------------------------------------------------------------------------

/// Configuration for a node's protocol state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// How long to wait for a `join_network_response` before retrying.
    pub join_response_timeout: Duration,

    /// Join attempts before unilaterally bootstrapping a fresh network.
    pub max_join_attempts: u32,

    /// How long a node keeps the token before passing it on.
    pub token_hold_duration: Duration,

    /// Copies sent of each loss-sensitive broadcast. The protocol compensates
    /// for datagram loss probabilistically, not adaptively.
    pub broadcast_redundancy: u32,

    /// Marks the designated first member of a cold-started network. A
    /// bootstrap node gives up on joining after a single attempt so the
    /// network forms quickly.
    pub bootstrap: bool,
}

impl ProtocolConfig {
    /// Effective join retry budget, accounting for the bootstrap shortcut.
    pub fn effective_join_attempts(&self) -> u32 {
        if self.bootstrap {
            1
        } else {
            self.max_join_attempts
        }
    }

    /// Duration to arm for a given timer kind.
    pub fn timer_duration(&self, kind: TimerKind) -> Duration {
        match kind {
            TimerKind::JoinResponse => self.join_response_timeout,
            TimerKind::TokenHold => self.token_hold_duration,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            join_response_timeout: Duration::from_secs(2),
            max_join_attempts: 3,
            token_hold_duration: Duration::from_millis(2500),
            broadcast_redundancy: 3,
            bootstrap: false,
        }
    }
}
