//! Wire codec for the datagram boundary
//!
//! Encoding and decoding between raw datagram bytes and [`WireMessage`]
//! values. Decoding is a pure function; callers drop and log rejected input,
//! they never treat it as fatal.

use crate::errors::{ProtocolError, Result};
use crate::protocol::message::WireMessage;

// ----------------------------------------------------------------------------
// Constants
// ----------------------------------------------------------------------------

/// Upper bound on an inbound frame. Anything larger is rejected before the
/// JSON parser sees it.
pub const MAX_FRAME_BYTES: usize = 64 * 1024;

// ----------------------------------------------------------------------------
// Wire Codec
// ----------------------------------------------------------------------------

/// JSON encoder/decoder for [`WireMessage`].
pub struct WireCodec;

impl WireCodec {
    /// Encode a message to its wire representation.
    pub fn encode(message: &WireMessage) -> Result<Vec<u8>> {
        serde_json::to_vec(message).map_err(ProtocolError::Encode)
    }

    /// Decode a single datagram into a validated message.
    pub fn decode(bytes: &[u8]) -> Result<WireMessage> {
        if bytes.len() > MAX_FRAME_BYTES {
            return Err(ProtocolError::FrameTooLarge {
                size: bytes.len(),
                limit: MAX_FRAME_BYTES,
            });
        }
        serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
    }
}
