//! Main application logic and state management.
//!
//! This module contains the per-frame loop: tracker frames are classified,
//! debounced, and confirmed gestures are turned into actions.

use anyhow::{Context, Result};

use log::{debug, error, info, warn};
use notify_rust::Notification;
use std::io::BufRead;
use std::time::Duration;

use crate::classifier::Classifier;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::Error;
use crate::filter::GestureFilter;
use crate::gesture::Gesture;
use crate::input::{Frame, FrameRecord};
use crate::keyboard::Dispatch;

/// Counters for one pass over a frame stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Frames fed to the filter
    pub frames: usize,
    /// Lines or frames dropped because they were malformed
    pub skipped: usize,
    /// Confirmed gestures
    pub confirmed: usize,
}

/// Main application struct that coordinates all components.
///
/// This struct owns the classifier, the debounce filter of the session and
/// the dispatcher that carries out actions.
pub struct App<D: Dispatch> {
    config: Config,
    classifier: Classifier,
    filter: GestureFilter,
    dispatcher: D,
    last_confirmed: Option<Gesture>,
}

impl<D: Dispatch> App<D> {
    /// Creates a new App instance from a validated configuration.
    pub fn new(config: Config, dispatcher: D) -> Result<Self> {
        config.validate()?;
        let classifier = Classifier::new(config.classifier.clone());
        let filter = GestureFilter::new(&config.filter)?;
        info!(
            "Confirming gestures after {} stable frames, cooldown {}s",
            config.filter.stable_frames, config.filter.cooldown_seconds
        );
        Ok(Self {
            config,
            classifier,
            filter,
            dispatcher,
            last_confirmed: None,
        })
    }

    /// Handles a single frame.
    ///
    /// Returns the gesture confirmed on this frame, if any. A frame that
    /// breaks the tracker contract is rejected before it reaches the filter.
    pub fn process_frame(
        &mut self,
        frame: &Frame,
        now: Duration,
    ) -> std::result::Result<Option<Gesture>, Error> {
        let gesture = match frame {
            Frame::NoHand => Gesture::NoHand,
            Frame::Hand {
                landmarks,
                width,
                height,
            } => self.classifier.classify(landmarks, *width, *height)?,
        };
        let confirmed = self.filter.update(gesture, now);
        if let Some(gesture) = confirmed {
            self.handle_confirmed(gesture);
        }
        Ok(confirmed)
    }

    fn handle_confirmed(&mut self, gesture: Gesture) {
        info!("Confirmed gesture {gesture}");
        self.last_confirmed = Some(gesture);
        let Some(action) = self.config.action_for(gesture) else {
            debug!("No action mapped to {gesture}");
            return;
        };
        self.notify(gesture.as_str(), action.as_str());
        if let Err(err) = self.dispatcher.dispatch(action) {
            error!("Could not run {action} for {gesture}: {err}");
        }
    }

    fn notify(&self, summary: &str, content: &str) {
        // Show desktop notification
        if self.config.output.notify {
            if let Err(err) = Notification::new()
                .summary(summary)
                .body(content)
                .icon("input-gaming")
                .show()
            {
                error!("Cannot show notification: {err} , content was : {summary} {content}")
            };
        }
    }

    /// Runs the frame loop until the input is exhausted.
    ///
    /// Each line holds one [`FrameRecord`]. Malformed lines and frames are
    /// logged and skipped. Records without a timestamp are stamped with
    /// `clock`.
    pub fn run<R: BufRead, C: Clock>(&mut self, reader: R, clock: &C) -> Result<Summary> {
        let mut summary = Summary::default();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line.context("Reading tracker input")?;
            if line.trim().is_empty() {
                continue;
            }
            let record = match FrameRecord::parse(&line) {
                Ok(record) => record,
                Err(err) => {
                    warn!("Skipping line {}: {err}", lineno + 1);
                    summary.skipped += 1;
                    continue;
                }
            };
            let now = match record.timestamp() {
                Ok(Some(t)) => t,
                Ok(None) => clock.now(),
                Err(err) => {
                    warn!("Skipping line {}: {err}", lineno + 1);
                    summary.skipped += 1;
                    continue;
                }
            };
            match self.process_frame(&record.into_frame(), now) {
                Ok(confirmed) => {
                    summary.frames += 1;
                    if confirmed.is_some() {
                        summary.confirmed += 1;
                    }
                }
                Err(err) => {
                    warn!("Skipping frame on line {}: {err}", lineno + 1);
                    summary.skipped += 1;
                }
            }
        }

        info!("Input finished, {summary:?}");
        Ok(summary)
    }

    pub fn last_confirmed(&self) -> Option<Gesture> {
        self.last_confirmed
    }

    pub fn filter(&self) -> &GestureFilter {
        &self.filter
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::fixtures::{self, SIZE};
    use crate::clock::ManualClock;
    use crate::keyboard::{Action, DryRun};
    use crate::landmarks::Landmark;

    struct Failing;

    impl Dispatch for Failing {
        fn dispatch(&mut self, action: Action) -> crate::error::Result<()> {
            Err(Error::KeyboardInput(format!("{action} refused")))
        }
    }

    fn config(stable_frames: u32, cooldown_seconds: f64) -> Config {
        let mut config = Config::default();
        config.filter.stable_frames = stable_frames;
        config.filter.cooldown_seconds = cooldown_seconds;
        config
    }

    fn hand(landmarks: Vec<Landmark>) -> Frame {
        Frame::Hand {
            landmarks,
            width: SIZE,
            height: SIZE,
        }
    }

    #[test]
    fn test_confirmed_gesture_dispatches_action() {
        let mut app = App::new(config(3, 1.0), DryRun::new()).unwrap();
        let frame = hand(fixtures::peace());
        assert_eq!(app.process_frame(&frame, Duration::ZERO).unwrap(), None);
        assert_eq!(app.process_frame(&frame, Duration::ZERO).unwrap(), None);
        assert_eq!(
            app.process_frame(&frame, Duration::ZERO).unwrap(),
            Some(Gesture::Peace)
        );
        assert_eq!(app.dispatcher().dispatched(), &[Action::Next]);
        assert_eq!(app.last_confirmed(), Some(Gesture::Peace));
    }

    #[test]
    fn test_unmapped_gesture_is_ignored() {
        let mut app = App::new(config(2, 0.0), DryRun::new()).unwrap();
        let frame = hand(fixtures::open_palm());
        app.process_frame(&frame, Duration::ZERO).unwrap();
        assert_eq!(
            app.process_frame(&frame, Duration::ZERO).unwrap(),
            Some(Gesture::OpenPalm)
        );
        assert!(app.dispatcher().dispatched().is_empty());
        assert_eq!(app.last_confirmed(), Some(Gesture::OpenPalm));
    }

    #[test]
    fn test_no_hand_frames_never_confirm() {
        let mut app = App::new(config(1, 0.0), DryRun::new()).unwrap();
        for i in 0..100 {
            let now = Duration::from_millis(i * 33);
            assert_eq!(app.process_frame(&Frame::NoHand, now).unwrap(), None);
        }
        assert_eq!(app.filter().last_gesture(), Gesture::NoHand);
        assert_eq!(app.last_confirmed(), None);
    }

    #[test]
    fn test_malformed_frame_is_rejected() {
        let mut app = App::new(config(1, 0.0), DryRun::new()).unwrap();
        let mut landmarks = fixtures::fist();
        landmarks.pop();
        let err = app.process_frame(&hand(landmarks), Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::InvalidLandmarks { found: 20, .. }));
        // The filter never saw it
        assert_eq!(app.filter().last_gesture(), Gesture::None);

        let frame = Frame::Hand {
            landmarks: fixtures::fist(),
            width: 0.0,
            height: SIZE,
        };
        assert!(matches!(
            app.process_frame(&frame, Duration::ZERO),
            Err(Error::InvalidFrameSize { .. })
        ));
    }

    #[test]
    fn test_dispatch_failure_is_not_fatal() {
        let mut app = App::new(config(1, 0.0), Failing).unwrap();
        let frame = hand(fixtures::fist());
        assert_eq!(
            app.process_frame(&frame, Duration::ZERO).unwrap(),
            Some(Gesture::Fist)
        );
        assert_eq!(
            app.process_frame(&frame, Duration::ZERO).unwrap(),
            Some(Gesture::Fist)
        );
    }

    #[test]
    fn test_run_uses_clock_without_timestamps() {
        let mut app = App::new(config(2, 1.0), DryRun::new()).unwrap();
        let record = serde_json::to_string(&FrameRecord {
            timestamp: None,
            width: SIZE,
            height: SIZE,
            landmarks: Some(fixtures::fist()),
        })
        .unwrap();
        let input = [record.as_str(); 6].join("\n");
        // Frozen clock: cooldown never elapses after the first confirmation.
        let clock = ManualClock::new(Duration::from_secs(3));
        let summary = app.run(input.as_bytes(), &clock).unwrap();
        assert_eq!(
            summary,
            Summary {
                frames: 6,
                skipped: 0,
                confirmed: 1
            }
        );
        assert_eq!(app.dispatcher().dispatched(), &[Action::Prev]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.filter.stable_frames = 0;
        assert!(App::new(config, DryRun::new()).is_err());
    }
}
