//! Ringchat Runtime Engine
//!
//! Everything the sans-io protocol core keeps at arm's length lives here:
//! the UDP multicast transport, the durable append-only message store, the
//! loss/delay fault injector, and the single-task event loop that feeds
//! datagrams and timer expiries into the core and applies the effects it
//! returns.

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod errors;
pub mod faults;
pub mod runtime;
pub mod store;
pub mod transport;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use errors::{Result, RuntimeError};
pub use faults::FaultInjector;
pub use runtime::{NodeRuntime, RuntimeHandle};
pub use store::FileLogStore;
pub use transport::{Broadcast, UdpMulticastTransport};
