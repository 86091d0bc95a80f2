//! Frames coming from the hand tracker.
//!
//! The tracker runs as a separate process and writes one JSON object per
//! frame:
//!
//! ```text
//! {"t": 0.033, "width": 640, "height": 480, "landmarks": [{"x": 0.41, "y": 0.62}, ...]}
//! {"t": 0.066, "width": 640, "height": 480, "landmarks": null}
//! ```
//!
//! `landmarks` is `null` or missing when no hand was detected. `t` is an
//! optional timestamp in seconds; when present it replaces the clock, which
//! makes recorded sessions replay deterministically.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::landmarks::Landmark;

/// What the tracker saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    NoHand,
    Hand {
        landmarks: Vec<Landmark>,
        width: f64,
        height: f64,
    },
}

/// One JSON line from the tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Seconds on the tracker's monotonic clock
    #[serde(default, rename = "t", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

impl FrameRecord {
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line).map_err(|e| Error::InvalidFrame(e.to_string()))
    }

    /// The record's timestamp, rejecting negative or non-finite values.
    pub fn timestamp(&self) -> Result<Option<Duration>> {
        self.timestamp
            .map(|t| {
                Duration::try_from_secs_f64(t)
                    .map_err(|_| Error::InvalidFrame(format!("bad timestamp {t}")))
            })
            .transpose()
    }

    pub fn into_frame(self) -> Frame {
        match self.landmarks {
            Some(landmarks) => Frame::Hand {
                landmarks,
                width: self.width,
                height: self.height,
            },
            None => Frame::NoHand,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hand_frame() {
        let points: Vec<String> = (0..21)
            .map(|i| format!(r#"{{"x": 0.{i:02}, "y": 0.5, "z": -0.01}}"#))
            .collect();
        let line = format!(
            r#"{{"t": 1.5, "width": 640, "height": 480, "landmarks": [{}]}}"#,
            points.join(",")
        );
        let record = FrameRecord::parse(&line).unwrap();
        assert_eq!(record.timestamp().unwrap(), Some(Duration::from_millis(1500)));
        match record.into_frame() {
            Frame::Hand {
                landmarks,
                width,
                height,
            } => {
                assert_eq!(landmarks.len(), 21);
                assert_eq!(landmarks[3], Landmark::new(0.03, 0.5));
                assert_eq!(width, 640.0);
                assert_eq!(height, 480.0);
            }
            Frame::NoHand => panic!("expected a hand"),
        }
    }

    #[test]
    fn test_parse_no_hand() {
        let record = FrameRecord::parse(r#"{"width": 640, "height": 480, "landmarks": null}"#).unwrap();
        assert_eq!(record.timestamp().unwrap(), None);
        assert_eq!(record.into_frame(), Frame::NoHand);

        let record = FrameRecord::parse("{}").unwrap();
        assert_eq!(record.into_frame(), Frame::NoHand);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            FrameRecord::parse("not json"),
            Err(Error::InvalidFrame(_))
        ));
        assert!(FrameRecord::parse(r#"{"landmarks": [1, 2]}"#).is_err());

        let record = FrameRecord::parse(r#"{"t": -1.0}"#).unwrap();
        assert!(record.timestamp().is_err());
    }
}
