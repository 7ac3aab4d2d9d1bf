//! RP2040 implementations of the library's hardware traits.

pub mod bme;
pub mod buttons;
pub mod display;
pub mod ds3231;
pub mod sdcard;
pub mod ticker;
