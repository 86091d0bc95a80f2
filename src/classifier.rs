//! Single frame gesture classification.
//!
//! This module maps the 21 landmarks of one hand to a [`Gesture`] using
//! geometric heuristics. It keeps no state between frames.
//!
//! Every distance is divided by the palm scale, the pixel distance between
//! the wrist and the base of the middle finger, so thresholds hold across
//! hand sizes and camera distances.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::gesture::Gesture;
use crate::landmarks::{
    Finger, FingerStates, INDEX_MCP, INDEX_TIP, Landmark, LandmarkSet, MIDDLE_MCP, Pixel,
    THUMB_MCP, THUMB_TIP, WRIST,
};

/// Geometric thresholds, all expressed as multiples of the palm scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
#[serde(default)]
pub struct Thresholds {
    /// Thumb tip to index tip distance below which the hand pinches
    pub pinch: f64,
    /// A finger counts as extended when tip-to-mcp exceeds pip-to-mcp by this factor
    pub finger_extension_ratio: f64,
    /// Minimum thumb tip to thumb mcp distance for an extended thumb
    pub thumb_extension: f64,
    /// Minimum thumb tip to index mcp distance for an extended thumb
    pub thumb_index_clearance: f64,
    /// Vertical thumb tip offset from the wrist that reads as up or down
    pub thumb_direction: f64,
    /// Added to the palm scale so a collapsed hand never divides by zero
    pub scale_epsilon: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            pinch: 0.22,
            finger_extension_ratio: 1.15,
            thumb_extension: 0.55,
            thumb_index_clearance: 0.35,
            thumb_direction: 0.45,
            scale_epsilon: 1e-6,
        }
    }
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        let checks = [
            ("pinch", self.pinch),
            ("finger_extension_ratio", self.finger_extension_ratio),
            ("thumb_extension", self.thumb_extension),
            ("thumb_index_clearance", self.thumb_index_clearance),
            ("thumb_direction", self.thumb_direction),
            ("scale_epsilon", self.scale_epsilon),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "classifier.{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Where the thumb points relative to the wrist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbDirection {
    Up,
    Down,
    Neither,
}

/// Pixel-space view of one hand, with the palm scale precomputed.
struct Hand<'a> {
    landmarks: &'a LandmarkSet,
    width: f64,
    height: f64,
    scale: f64,
}

impl<'a> Hand<'a> {
    fn new(landmarks: &'a LandmarkSet, width: f64, height: f64, epsilon: f64) -> Self {
        let mut hand = Self {
            landmarks,
            width,
            height,
            scale: 1.0,
        };
        hand.scale = hand.at(WRIST).distance(hand.at(MIDDLE_MCP)) + epsilon;
        hand
    }

    fn at(&self, index: usize) -> Pixel {
        self.landmarks.pixel(index, self.width, self.height)
    }

    /// Distance between two landmarks in palm-scale units.
    fn distance(&self, a: usize, b: usize) -> f64 {
        self.at(a).distance(self.at(b)) / self.scale
    }
}

/// Stateless classifier configured with a set of [`Thresholds`].
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    thresholds: Thresholds,
}

impl Classifier {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Classifies one frame.
    ///
    /// Fails when the tracker breaks its contract: a landmark count other than
    /// 21, or a frame size that is not positive. Any well formed hand yields a
    /// label, `Gesture::Unknown` when no rule matches.
    pub fn classify(&self, landmarks: &[Landmark], width: f64, height: f64) -> Result<Gesture> {
        let landmarks = LandmarkSet::new(landmarks)?;
        self.classify_set(&landmarks, width, height)
    }

    /// Classifies an already validated landmark set.
    pub fn classify_set(
        &self,
        landmarks: &LandmarkSet,
        width: f64,
        height: f64,
    ) -> Result<Gesture> {
        check_frame_size(width, height)?;
        let t = &self.thresholds;
        let hand = Hand::new(landmarks, width, height, t.scale_epsilon);

        let states = finger_states_of(&hand, t);
        let is_pinch = hand.distance(THUMB_TIP, INDEX_TIP) < t.pinch;
        let direction = thumb_direction_of(&hand, t);
        trace!("Extended {states} pinch={is_pinch} thumb={direction:?}");

        let four_open = states.four_open();
        let four_closed = states.four_closed();

        // Rule order matters: peace before pinch, pinch before the thumb rules.
        let gesture = if four_open && !is_pinch {
            Gesture::OpenPalm
        } else if four_closed && !states.thumb {
            Gesture::Fist
        } else if states.index && states.middle && !states.ring && !states.pinky {
            Gesture::Peace
        } else if is_pinch {
            Gesture::Pinch
        } else if states.thumb && four_closed {
            match direction {
                ThumbDirection::Up => Gesture::ThumbsUp,
                ThumbDirection::Down => Gesture::ThumbsDown,
                ThumbDirection::Neither => Gesture::ThumbOnly,
            }
        } else if four_closed {
            // This and the next arm only fire if the rules above change.
            Gesture::Fist
        } else if four_open {
            Gesture::OpenPalm
        } else {
            Gesture::Unknown
        };
        Ok(gesture)
    }

    /// Per-finger extension flags for one frame.
    pub fn finger_states(
        &self,
        landmarks: &LandmarkSet,
        width: f64,
        height: f64,
    ) -> Result<FingerStates> {
        check_frame_size(width, height)?;
        let hand = Hand::new(landmarks, width, height, self.thresholds.scale_epsilon);
        Ok(finger_states_of(&hand, &self.thresholds))
    }
}

fn check_frame_size(width: f64, height: f64) -> Result<()> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidFrameSize { width, height })
    }
}

fn finger_states_of(hand: &Hand<'_>, t: &Thresholds) -> FingerStates {
    let mut states = FingerStates::default();
    for finger in Finger::NON_THUMB {
        let (tip, pip, mcp) = (finger.tip(), finger.pip(), finger.mcp());
        // Upright palm: the tip sits above the middle joint in image space.
        let pointing_up = hand.at(tip).y < hand.at(pip).y;
        // Tilted hand: the finger is long compared to its first segment.
        let stretched =
            hand.distance(tip, mcp) > hand.distance(pip, mcp) * t.finger_extension_ratio;
        states.set(finger, pointing_up || stretched);
    }
    states.thumb = hand.distance(THUMB_TIP, THUMB_MCP) > t.thumb_extension
        && hand.distance(THUMB_TIP, INDEX_MCP) > t.thumb_index_clearance;
    states
}

fn thumb_direction_of(hand: &Hand<'_>, t: &Thresholds) -> ThumbDirection {
    let dy = (hand.at(THUMB_TIP).y - hand.at(WRIST).y) / hand.scale;
    if dy < -t.thumb_direction {
        ThumbDirection::Up
    } else if dy > t.thumb_direction {
        ThumbDirection::Down
    } else {
        ThumbDirection::Neither
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic hands on a 100x100 grid, upright palm facing the camera.

    use crate::landmarks::*;

    pub const SIZE: f64 = 100.0;

    const THUMB_CMC: usize = 1;

    /// Landmarks in pixel units on the 100x100 grid.
    pub struct HandBuilder {
        points: [(f64, f64); LANDMARK_COUNT],
        lift: f64,
    }

    fn base_x(finger: Finger) -> f64 {
        match finger {
            Finger::Thumb => 33.0,
            Finger::Index => 40.0,
            Finger::Middle => 50.0,
            Finger::Ring => 60.0,
            Finger::Pinky => 70.0,
        }
    }

    impl HandBuilder {
        /// A fist: all fingers curled, thumb tucked against the index finger.
        pub fn new() -> Self {
            Self::lifted(0.0)
        }

        /// Same hand moved up the frame by `lift` pixels.
        pub fn lifted(lift: f64) -> Self {
            let mut builder = Self {
                points: [(0.0, 0.0); LANDMARK_COUNT],
                lift,
            };
            builder.put(WRIST, 50.0, 90.0);
            builder.put(THUMB_CMC, 38.0, 82.0);
            builder.put(THUMB_MCP, 33.0, 75.0);
            builder.put(THUMB_IP, 30.0, 70.0);
            builder.put(THUMB_TIP, 42.0, 66.0);
            for finger in Finger::NON_THUMB {
                builder.put(finger.mcp(), base_x(finger), 60.0);
                builder = builder.curl(finger);
            }
            builder
        }

        fn put(&mut self, index: usize, x: f64, y: f64) {
            self.points[index] = (x, y - self.lift);
        }

        /// Pip, dip and tip for a finger, tip last.
        fn joints(mut self, finger: Finger, ys: [f64; 3]) -> Self {
            let x = base_x(finger);
            let pip = finger.pip();
            for (offset, y) in ys.into_iter().enumerate() {
                self.put(pip + offset, x, y);
            }
            self
        }

        pub fn curl(self, finger: Finger) -> Self {
            self.joints(finger, [52.0, 56.0, 62.0])
        }

        pub fn extend(self, finger: Finger) -> Self {
            self.joints(finger, [50.0, 40.0, 30.0])
        }

        pub fn extend_all(self) -> Self {
            Finger::NON_THUMB.into_iter().fold(self, Self::extend)
        }

        pub fn thumb_tip(self, x: f64, y: f64) -> Self {
            self.point(THUMB_TIP, x, y)
        }

        pub fn point(mut self, index: usize, x: f64, y: f64) -> Self {
            self.put(index, x, y);
            self
        }

        pub fn build(&self) -> Vec<Landmark> {
            self.points
                .iter()
                .map(|&(x, y)| Landmark::new(x / SIZE, y / SIZE))
                .collect()
        }
    }

    pub fn fist() -> Vec<Landmark> {
        HandBuilder::new().build()
    }

    pub fn open_palm() -> Vec<Landmark> {
        HandBuilder::new().extend_all().thumb_tip(20.0, 65.0).build()
    }

    pub fn peace() -> Vec<Landmark> {
        HandBuilder::new()
            .extend(Finger::Index)
            .extend(Finger::Middle)
            .build()
    }

    /// Peace sign with the thumb tip resting against the index tip.
    pub fn peace_with_pinch() -> Vec<Landmark> {
        HandBuilder::new()
            .extend(Finger::Index)
            .extend(Finger::Middle)
            .thumb_tip(41.0, 32.0)
            .build()
    }

    /// "OK" sign: index curled onto the thumb, the other three extended.
    pub fn pinch() -> Vec<Landmark> {
        HandBuilder::new()
            .extend_all()
            .point(INDEX_PIP, 38.0, 50.0)
            .point(INDEX_DIP, 35.0, 52.0)
            .point(INDEX_TIP, 34.0, 56.0)
            .thumb_tip(33.0, 57.0)
            .build()
    }

    pub fn thumbs_up() -> Vec<Landmark> {
        HandBuilder::new().thumb_tip(30.0, 50.0).build()
    }

    pub fn thumbs_down() -> Vec<Landmark> {
        HandBuilder::lifted(30.0).thumb_tip(30.0, 110.0).build()
    }

    /// Thumb stretched out sideways, level with the wrist.
    pub fn thumb_only() -> Vec<Landmark> {
        HandBuilder::new().thumb_tip(10.0, 88.0).build()
    }

    /// Only the index finger extended.
    pub fn pointing() -> Vec<Landmark> {
        HandBuilder::new().extend(Finger::Index).build()
    }
}
