//! Protocol modules for ringchat
//!
//! - [`message`]: the six-variant wire message union
//! - [`wire`]: the JSON codec at the datagram boundary
//! - [`state`]: the node's network state machine states
//! - [`log`]: the replicated chat log and gap detection
//! - [`node`]: the membership/token state machine and dispatch

pub mod log;
pub mod message;
pub mod node;
pub mod state;
pub mod wire;
