//! Ringchat Core Protocol Implementation
//!
//! This crate provides the protocol logic for a single node of the ringchat
//! token-ring replicated chat: the membership/join handshake, token-based
//! mutual exclusion for assigning log positions, round-robin token
//! circulation, and pull-based history reconciliation.
//!
//! The crate is deliberately sans-io: handlers consume decoded wire messages
//! and timer expiries, mutate the node's state, and return [`Effect`]s
//! describing outbound broadcasts and timer changes. Sockets, files, and
//! clocks live in `ringchat-runtime`.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod errors;
pub mod protocol;
pub mod types;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::ProtocolConfig;
pub use errors::{ProtocolError, Result};
pub use protocol::log::{ChatLog, LogStore, MemoryStore};
pub use protocol::message::{ChatEntry, WireMessage};
pub use protocol::node::{Effect, RingNode};
pub use protocol::state::{NetworkState, TimerKind};
pub use protocol::wire::WireCodec;
pub use types::NodeName;
