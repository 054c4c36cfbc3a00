//! Domain model structs persisted in the board's JSON data file.
//!
//! The serde field names below are the on-disk (and on-wire) names, so a
//! data file written by one process version reloads unchanged in the next.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Name of the channel seeded on first start.
pub const DEFAULT_CHANNEL: &str = "Channel #1";

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single posted message. Immutable once appended to a channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Display name of the poster, already normalized by the store.
    pub sender: String,
    /// Message text. May be empty when the post only carries a file.
    #[serde(rename = "message")]
    pub body: String,
    /// Server receipt time (UTC, stamped at append time).
    #[serde(rename = "time")]
    pub timestamp: DateTime<Utc>,
    /// Storage name of an uploaded file, `null` when the post has none.
    #[serde(rename = "attachmentRef")]
    pub attachment: Option<String>,
}

// ---------------------------------------------------------------------------
// ChannelMap
// ---------------------------------------------------------------------------

/// Channel name -> ordered message list.
///
/// Serialized as a JSON object whose entry order is the channel creation
/// order; the order survives a save/load round trip. Names are unique,
/// exact-match and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMap {
    entries: Vec<(String, Vec<Message>)>,
}

impl ChannelMap {
    /// Number of channels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a channel with this exact name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Messages of the named channel, if it exists.
    pub fn get(&self, name: &str) -> Option<&[Message]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, messages)| messages.as_slice())
    }

    /// Channel names in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Vec<Message>> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, messages)| messages)
    }

    /// Position of a channel in the listing order.
    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(n, _)| n == name)
    }

    /// Append a channel at the end of the listing order. The caller is
    /// responsible for the uniqueness check.
    pub(crate) fn push(&mut self, name: String, messages: Vec<Message>) {
        self.entries.push((name, messages));
    }

    /// Remove and return the last channel in the listing order.
    pub(crate) fn pop(&mut self) -> Option<(String, Vec<Message>)> {
        self.entries.pop()
    }

    /// Remove and return the channel at `index`.
    pub(crate) fn remove_at(&mut self, index: usize) -> (String, Vec<Message>) {
        self.entries.remove(index)
    }

    /// Reinsert a channel at a specific position in the listing order.
    pub(crate) fn insert_at(&mut self, index: usize, name: String, messages: Vec<Message>) {
        self.entries.insert(index, (name, messages));
    }
}

impl Serialize for ChannelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, messages) in &self.entries {
            map.serialize_entry(name, messages)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ChannelMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ChannelMapVisitor;

        impl<'de> Visitor<'de> for ChannelMapVisitor {
            type Value = ChannelMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of channel name to message list")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut channels = ChannelMap::default();
                while let Some((name, messages)) = access.next_entry::<String, Vec<Message>>()? {
                    if channels.contains(&name) {
                        return Err(de::Error::custom(format!(
                            "duplicate channel name: {name}"
                        )));
                    }
                    channels.push(name, messages);
                }
                Ok(channels)
            }
        }

        deserializer.deserialize_map(ChannelMapVisitor)
    }
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// Root aggregate: every channel and message on the board.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Board {
    pub channels: ChannelMap,
}

impl Board {
    /// The cold-start state: one default channel with no messages.
    pub fn seed() -> Self {
        let mut channels = ChannelMap::default();
        channels.push(DEFAULT_CHANNEL.to_string(), Vec::new());
        Self { channels }
    }
}
