//! Keyboard input simulation for confirmed gestures.
//!
//! This module maps actions to key presses and sends them through `rdev`.
//! A dry-run dispatcher is provided for machines where simulating input is
//! not wanted.

use std::fmt;
use std::time::Duration;

use log::info;
use rdev::{EventType, Key, simulate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// What a confirmed gesture does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Next slide
    Next,
    /// Previous slide
    Prev,
    /// Media toggle, space works in most players
    PlayPause,
    VolumeUp,
    VolumeDown,
}

impl Action {
    /// The name used in the config file, e.g. `PLAY_PAUSE`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Next => "NEXT",
            Action::Prev => "PREV",
            Action::PlayPause => "PLAY_PAUSE",
            Action::VolumeUp => "VOLUME_UP",
            Action::VolumeDown => "VOLUME_DOWN",
        }
    }

    /// The key pressed for this action, if the platform has one.
    pub fn key(&self) -> Option<Key> {
        match self {
            Action::Next => Some(Key::RightArrow),
            Action::Prev => Some(Key::LeftArrow),
            Action::PlayPause => Some(Key::Space),
            Action::VolumeUp => volume_key(true),
            Action::VolumeDown => volume_key(false),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// rdev has no named media keys, go through the raw platform codes.
#[cfg(target_os = "linux")]
fn volume_key(up: bool) -> Option<Key> {
    // XF86AudioRaiseVolume / XF86AudioLowerVolume
    Some(Key::Unknown(if up { 123 } else { 122 }))
}

#[cfg(target_os = "windows")]
fn volume_key(up: bool) -> Option<Key> {
    // VK_VOLUME_UP / VK_VOLUME_DOWN
    Some(Key::Unknown(if up { 0xAF } else { 0xAE }))
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
fn volume_key(_up: bool) -> Option<Key> {
    None
}

/// Receives the actions of confirmed gestures.
pub trait Dispatch {
    fn dispatch(&mut self, action: Action) -> Result<()>;
}

/// Presses real keys.
#[derive(Debug)]
pub struct Keyboard;

impl Keyboard {
    /// Warms up the input handle so the first real press is not swallowed.
    pub fn new() -> Result<Self> {
        simulate(&EventType::KeyPress(Key::ShiftLeft))?;
        std::thread::sleep(Duration::from_millis(2));
        simulate(&EventType::KeyRelease(Key::ShiftLeft))?;
        Ok(Self)
    }
}

impl Dispatch for Keyboard {
    fn dispatch(&mut self, action: Action) -> Result<()> {
        let key = action
            .key()
            .ok_or_else(|| Error::KeyboardInput(format!("{action} is not supported here")))?;
        info!("Pressing {key:?} for {action}");
        simulate(&EventType::KeyPress(key))?;
        std::thread::sleep(Duration::from_millis(2));
        simulate(&EventType::KeyRelease(key))?;
        Ok(())
    }
}

/// Logs actions instead of pressing keys.
#[derive(Debug, Default)]
pub struct DryRun {
    dispatched: Vec<Action>,
}

impl DryRun {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action seen so far, oldest first.
    pub fn dispatched(&self) -> &[Action] {
        &self.dispatched
    }
}

impl Dispatch for DryRun {
    fn dispatch(&mut self, action: Action) -> Result<()> {
        info!("Dry run: would trigger {action}");
        self.dispatched.push(action);
        Ok(())
    }
}
