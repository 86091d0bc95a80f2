//! Hand landmark layout.
//!
//! The tracker reports 21 points per hand in the MediaPipe order. Indices are
//! fixed and carry meaning: the wrist, then four joints per finger from the
//! base of the finger out to the tip.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const LANDMARK_COUNT: usize = 21;

// Slot 1 is the base of the thumb, which no rule looks at.
pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// A single landmark, normalized to `[0, 1]` by the frame width and height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A landmark scaled into pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub fn distance(self, other: Pixel) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Exactly [`LANDMARK_COUNT`] landmarks in canonical order.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    /// Validates the point count and copies the points.
    pub fn new(points: &[Landmark]) -> Result<Self> {
        let points: [Landmark; LANDMARK_COUNT] =
            points.try_into().map_err(|_| Error::InvalidLandmarks {
                expected: LANDMARK_COUNT,
                found: points.len(),
            })?;
        Ok(Self { points })
    }

    pub fn get(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub(crate) fn pixel(&self, index: usize, width: f64, height: f64) -> Pixel {
        let point = self.points[index];
        Pixel {
            x: point.x * width,
            y: point.y * height,
        }
    }
}

impl TryFrom<&[Landmark]> for LandmarkSet {
    type Error = Error;

    fn try_from(points: &[Landmark]) -> Result<Self> {
        Self::new(points)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The four fingers whose extension is judged by the tip/pip/mcp chain.
    pub const NON_THUMB: [Finger; 4] = [
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }

    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// The middle joint. The thumb has no pip, its interphalangeal joint
    /// sits in the same slot.
    pub fn pip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_IP,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }

    pub fn mcp(self) -> usize {
        match self {
            Finger::Thumb => THUMB_MCP,
            Finger::Index => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring => RING_MCP,
            Finger::Pinky => PINKY_MCP,
        }
    }
}

/// Which fingers are extended in a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn is_extended(&self, finger: Finger) -> bool {
        match finger {
            Finger::Thumb => self.thumb,
            Finger::Index => self.index,
            Finger::Middle => self.middle,
            Finger::Ring => self.ring,
            Finger::Pinky => self.pinky,
        }
    }

    pub fn set(&mut self, finger: Finger, extended: bool) {
        match finger {
            Finger::Thumb => self.thumb = extended,
            Finger::Index => self.index = extended,
            Finger::Middle => self.middle = extended,
            Finger::Ring => self.ring = extended,
            Finger::Pinky => self.pinky = extended,
        }
    }

    /// Index, middle, ring and pinky all extended.
    pub fn four_open(&self) -> bool {
        self.index && self.middle && self.ring && self.pinky
    }

    /// Index, middle, ring and pinky all curled.
    pub fn four_closed(&self) -> bool {
        !self.index && !self.middle && !self.ring && !self.pinky
    }
}

/// Lists the extended fingers, e.g. `[index middle]`.
impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extended: Vec<_> = Finger::ALL
            .into_iter()
            .filter(|finger| self.is_extended(*finger))
            .map(Finger::name)
            .collect();
        write!(f, "[{}]", extended.join(" "))
    }
}
