//! Host-testable core of the hsv-picker firmware.
//!
//! Everything here is `no_std`, allocation-free and hardware-agnostic:
//! colour math, the click classifier, the mode state machine, the command
//! parser and the flash record codec. The firmware binary (`main.rs`,
//! `embedded` feature) plugs the nRF52840 peripherals into the small traits
//! defined here ([`led::LedOutput`], [`gesture::Timers`],
//! [`persistence::PersistenceGateway`]).
//!
//! Usage: `cargo test` on the host.
//!
//! Firmware: `cargo run --release --features embedded --target thumbv7em-none-eabihf`

#![cfg_attr(not(test), no_std)]

// Must come first: the logging macros are used by every module below.
mod fmt;

pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod gesture;
pub mod led;
pub mod mode;
pub mod oscillator;
pub mod persistence;

pub use color::{hsv_to_rgb, rgb_to_hsv, Color, Hsv, Rgb};
pub use error::{Error, StorageError, ValidationError};
pub use mode::{AdjustmentMode, ModeController};
