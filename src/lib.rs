// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]

//! # envmon-rs
//! ## A single-device environmental monitor in Rust
//!
//! Features:
//! - Temperature, humidity and pressure monitoring
//! - Adjustable temperature/humidity alert thresholds with a blinking alarm
//! - Timestamped CSV logging to an SD card, with file rotation and card fault recovery
//! - On-device menu driven by three buttons (OK, UP, DOWN)
//! - Low-power sleep from the menu
//!
//! Everything in this library is hardware agnostic: the board binary plugs
//! the sensor, RTC, SD card, buttons and display in through the traits in
//! [`sensors`], [`clock`], [`storage`], [`input`] and [`timer`], plus any
//! `embedded-graphics` draw target.
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib
//! ```

#[macro_use]
mod fmt;

pub mod alerts;
pub mod blink;
pub mod clock;
pub mod config;
pub mod controller;
pub mod input;
pub mod rendering;
pub mod sensors;
pub mod session;
pub mod storage;
pub mod thresholds;
pub mod timer;

#[cfg(test)]
mod mock;
