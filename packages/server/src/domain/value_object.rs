//! 値オブジェクト
//!
//! 境界で一度だけ検証され、以降は不変な値として扱われます。

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

const MAX_ID_LEN: usize = 128;
const MAX_CONTENT_CHARS: usize = 4000;

fn validate_id(name: &'static str, value: &str) -> Result<(), ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty(name));
    }
    if value.len() > MAX_ID_LEN {
        return Err(ValueObjectError::TooLong {
            name,
            len: value.len(),
            max: MAX_ID_LEN,
        });
    }
    Ok(())
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(pub(super) String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                validate_id($label, &value)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Identity of a user; also the key of the hub registry.
    UserId,
    "user id"
);
string_id!(
    /// Identity of a channel.
    ChannelId,
    "channel id"
);
string_id!(
    /// Identity of a chat message. Assigned once at creation.
    MessageId,
    "message id"
);
string_id!(
    /// Identity of an uploaded file.
    FileId,
    "file id"
);
string_id!(
    /// Identity of a single live connection.
    ///
    /// Two connections of the same user never share one, so a stale connection
    /// cannot unregister a newer one.
    ConnectionId,
    "connection id"
);

/// Body of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::Empty("message content"));
        }
        let chars = value.chars().count();
        if chars > MAX_CONTENT_CHARS {
            return Err(ValueObjectError::TooLong {
                name: "message content",
                len: chars,
                max: MAX_CONTENT_CHARS,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for MessageContent {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MessageContent> for String {
    fn from(value: MessageContent) -> Self {
        value.0
    }
}

/// Unix timestamp in UTC (milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
