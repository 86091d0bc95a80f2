//! Gesture labels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// Every label a frame can carry.
///
/// `Unknown`, `NoHand` and `None` are sentinels: they take part in the
/// filter's run-length bookkeeping but never become confirmed events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Gesture {
    OpenPalm,
    Fist,
    Peace,
    Pinch,
    ThumbsUp,
    ThumbsDown,
    ThumbOnly,
    Unknown,
    NoHand,
    None,
}

impl Gesture {
    pub const ALL: [Gesture; 10] = [
        Gesture::OpenPalm,
        Gesture::Fist,
        Gesture::Peace,
        Gesture::Pinch,
        Gesture::ThumbsUp,
        Gesture::ThumbsDown,
        Gesture::ThumbOnly,
        Gesture::Unknown,
        Gesture::NoHand,
        Gesture::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::OpenPalm => "OPEN_PALM",
            Gesture::Fist => "FIST",
            Gesture::Peace => "PEACE",
            Gesture::Pinch => "PINCH",
            Gesture::ThumbsUp => "THUMBS_UP",
            Gesture::ThumbsDown => "THUMBS_DOWN",
            Gesture::ThumbOnly => "THUMB_ONLY",
            Gesture::Unknown => "UNKNOWN",
            Gesture::NoHand => "NO_HAND",
            Gesture::None => "NONE",
        }
    }

    /// Whether a stable run of this label may be confirmed.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Gesture::Unknown | Gesture::NoHand | Gesture::None)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Gesture::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(label))
            .ok_or_else(|| Error::UnknownGesture(s.to_string()))
    }
}

// Serialized as the bare label so gestures can key TOML tables.
impl Serialize for Gesture {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Gesture {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}
