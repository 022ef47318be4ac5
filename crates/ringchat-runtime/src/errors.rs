//! Error types for the ringchat runtime

// ----------------------------------------------------------------------------
// Runtime Error
// ----------------------------------------------------------------------------

/// Errors surfaced by the runtime layer. Only transport acquisition is
/// allowed to abort a node; everything else is logged and absorbed by the
/// event loop.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to acquire transport: {0}")]
    TransportSetup(#[source] std::io::Error),

    #[error("failed to open message store: {0}")]
    StoreSetup(#[source] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ringchat_core::ProtocolError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
