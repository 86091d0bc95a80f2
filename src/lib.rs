#![doc = include_str!("../README.md")]
pub mod app;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod gesture;
pub mod input;
pub mod keyboard;
pub mod landmarks;
pub mod logging;
