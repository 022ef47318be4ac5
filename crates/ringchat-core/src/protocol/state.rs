//! Network state machine states
//!
//! A node is always in exactly one [`NetworkState`]. Transitions are total
//! functions of (current state, event); handlers whose precondition does not
//! match the current state are no-ops, not errors.

use core::fmt;

use crate::types::NodeName;

// ----------------------------------------------------------------------------
// Network State
// ----------------------------------------------------------------------------

/// The node's position in the ring lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkState {
    /// Initial state; the node has not yet asked to join.
    Unconnected,

    /// A join request is outstanding and the join-response timer is armed.
    Connecting { attempts: u32 },

    /// This node holds the token. The ring is only meaningful here: whoever
    /// holds the token has sole write authority over it.
    TokenOwning {
        /// Index of the last chat message emitted on the ring.
        next_index: u64,
        /// Ordered membership defining round-robin hand-off. Append-only.
        ring: Vec<NodeName>,
    },

    /// The token is held elsewhere.
    NoTokenOwning,
}

impl NetworkState {
    pub fn is_token_owning(&self) -> bool {
        matches!(self, Self::TokenOwning { .. })
    }

    /// Stable short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unconnected => "unconnected",
            Self::Connecting { .. } => "connecting",
            Self::TokenOwning { .. } => "token_owning",
            Self::NoTokenOwning => "no_token_owning",
        }
    }
}

impl fmt::Display for NetworkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ----------------------------------------------------------------------------
// Timers
// ----------------------------------------------------------------------------

/// The two protocol timers. They belong to mutually exclusive states, so at
/// most one is ever live; a firing that outlives its state is discarded by
/// the handler's precondition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    /// Bounds the wait for a `join_network_response` while `Connecting`.
    JoinResponse,
    /// Bounds token possession while `TokenOwning`.
    TokenHold,
}

impl fmt::Display for TimerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JoinResponse => f.write_str("join_response"),
            Self::TokenHold => f.write_str("token_hold"),
        }
    }
}
