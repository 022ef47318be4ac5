//! Error types for the ringchat protocol
//!
//! Wire-level faults are the only errors the core can produce. Everything
//! else the protocol absorbs by design: messages addressed elsewhere and
//! messages arriving in an incompatible state are normal filtering outcomes,
//! not errors, and storage faults are logged without rollback.

// ----------------------------------------------------------------------------
// Protocol Error
// ----------------------------------------------------------------------------

/// Core error types for the ringchat protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed wire message: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("wire encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("frame of {size} bytes exceeds the {limit} byte limit")]
    FrameTooLarge { size: usize, limit: usize },
}

pub type Result<T> = core::result::Result<T, ProtocolError>;
