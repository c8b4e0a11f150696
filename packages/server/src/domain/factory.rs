//! Identifier factories backed by UUID v4.

use uuid::Uuid;

use super::value_object::{ConnectionId, FileId, MessageId};

fn new_uuid() -> String {
    Uuid::new_v4().to_string()
}

/// Generates fresh message ids
pub struct MessageIdFactory;

impl MessageIdFactory {
    pub fn generate() -> MessageId {
        // A hyphenated UUID is 36 bytes, always a valid id.
        MessageId(new_uuid())
    }
}

/// Generates fresh file ids
pub struct FileIdFactory;

impl FileIdFactory {
    pub fn generate() -> FileId {
        FileId(new_uuid())
    }
}

/// Generates fresh connection ids
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(new_uuid())
    }
}
