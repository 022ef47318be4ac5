//! Wire message structures
//!
//! The six-variant tagged union exchanged between nodes. Every variant
//! carries the sender's name; "targeted" variants (`join_network_response`,
//! `pass_token`) additionally name their intended receiver, since the
//! transport only broadcasts and receivers filter by name.
//!
//! Field names (including the camelCase `requestedIndexes`) match the wire
//! schema of the reference deployment byte for byte.

use serde::{Deserialize, Serialize};

use crate::types::NodeName;

// ----------------------------------------------------------------------------
// Chat Entry
// ----------------------------------------------------------------------------

/// A single replicated chat message, as it appears both on the wire and in
/// the durable log.
///
/// `index` is a position in the single global sequence; the token holder is
/// the only node permitted to assign new ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub sender_name: NodeName,
    pub message: String,
    pub index: u64,
}

// ----------------------------------------------------------------------------
// Wire Message Union
// ----------------------------------------------------------------------------

/// The tagged union of all datagrams the protocol exchanges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireMessage {
    /// Broadcast by a node that wants to enter the ring.
    JoinNetworkRequest { sender_name: NodeName },

    /// Sent by the current token holder to admit a requester.
    JoinNetworkResponse {
        sender_name: NodeName,
        requester_node_name: NodeName,
    },

    /// A new chat message produced by the token holder.
    ChatMessage(ChatEntry),

    /// Pull request for log positions the sender is missing.
    RequestChatMessageHistory {
        sender_name: NodeName,
        #[serde(rename = "requestedIndexes")]
        requested_indexes: Vec<u64>,
    },

    /// Reply to a history request; carries whatever subset the responder has.
    MessageHistoryAnnouncement {
        sender_name: NodeName,
        messages: Vec<ChatEntry>,
    },

    /// Hands the token (and with it the ring and index cursor) to `target`.
    PassToken {
        sender_name: NodeName,
        target: NodeName,
        message_index: u64,
        node_list: Vec<NodeName>,
    },
}

impl WireMessage {
    /// The name of the node that sent this message.
    pub fn sender_name(&self) -> &NodeName {
        match self {
            Self::JoinNetworkRequest { sender_name }
            | Self::JoinNetworkResponse { sender_name, .. }
            | Self::RequestChatMessageHistory { sender_name, .. }
            | Self::MessageHistoryAnnouncement { sender_name, .. }
            | Self::PassToken { sender_name, .. } => sender_name,
            Self::ChatMessage(entry) => &entry.sender_name,
        }
    }

    /// Stable short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinNetworkRequest { .. } => "join_network_request",
            Self::JoinNetworkResponse { .. } => "join_network_response",
            Self::ChatMessage(_) => "chat_message",
            Self::RequestChatMessageHistory { .. } => "request_chat_message_history",
            Self::MessageHistoryAnnouncement { .. } => "message_history_announcement",
            Self::PassToken { .. } => "pass_token",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_names_match_wire_schema() {
        let msg = WireMessage::JoinNetworkRequest {
            sender_name: "alice".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "join_network_request");
        assert_eq!(json["sender_name"], "alice");
    }

    #[test]
    fn requested_indexes_keeps_camel_case() {
        let msg = WireMessage::RequestChatMessageHistory {
            sender_name: "bob".into(),
            requested_indexes: vec![2, 4],
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["requestedIndexes"][0], 2);
        assert_eq!(json["requestedIndexes"][1], 4);
    }

    #[test]
    fn chat_message_is_internally_tagged() {
        let msg = WireMessage::ChatMessage(ChatEntry {
            sender_name: "carol".into(),
            message: "hello".to_string(),
            index: 7,
        });
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "chat_message");
        assert_eq!(json["message"], "hello");
        assert_eq!(json["index"], 7);
    }

    #[test]
    fn sender_name_is_exposed_for_every_variant() {
        let entry = ChatEntry {
            sender_name: "dave".into(),
            message: "hi".to_string(),
            index: 1,
        };
        let messages = [
            WireMessage::JoinNetworkRequest {
                sender_name: "dave".into(),
            },
            WireMessage::JoinNetworkResponse {
                sender_name: "dave".into(),
                requester_node_name: "erin".into(),
            },
            WireMessage::ChatMessage(entry.clone()),
            WireMessage::RequestChatMessageHistory {
                sender_name: "dave".into(),
                requested_indexes: vec![],
            },
            WireMessage::MessageHistoryAnnouncement {
                sender_name: "dave".into(),
                messages: vec![entry],
            },
            WireMessage::PassToken {
                sender_name: "dave".into(),
                target: "erin".into(),
                message_index: 0,
                node_list: vec!["dave".into(), "erin".into()],
            },
        ];

        for msg in &messages {
            assert_eq!(msg.sender_name().as_str(), "dave", "{}", msg.kind());
        }
    }
}
