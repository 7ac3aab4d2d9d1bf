//! Button input handling.
//!
//! OK distinguishes short and long presses through [`OkButton`]. UP and DOWN
//! are plain level checks; the controller pauses after each accepted press
//! in place of a hardware debounce.

use crate::config::LONG_PRESS_MS;
use crate::timer::elapsed_ms;

/// Logical buttons. RESET is wired to the MCU reset line and never seen here.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Ok,
    Up,
    Down,
}

/// Raw button levels. Implementations hide the electrical polarity: `true`
/// always means "held down".
pub trait Buttons {
    fn is_pressed(&mut self, button: Button) -> bool;
}

/// Result of feeding one OK sample to the classifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OkEvent {
    NoChange,
    PressStarted,
    /// Held for at least [`LONG_PRESS_MS`]. `long_press_handled` is `false` exactly once
    /// per press: the sample on which the long-press action must fire.
    HeldPastThreshold { long_press_handled: bool },
    ReleasedShort,
    ReleasedAfterLong,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GestureKind {
    Press,
    Release,
    ShortPress,
    LongPress,
}

/// A classified button interaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputGesture {
    pub button: Button,
    pub kind: GestureKind,
}

impl OkEvent {
    /// Gesture carried by this event, if any.
    pub const fn gesture(&self) -> Option<InputGesture> {
        let kind = match self {
            OkEvent::NoChange => return None,
            OkEvent::HeldPastThreshold {
                long_press_handled: true,
            } => return None,
            OkEvent::PressStarted => GestureKind::Press,
            OkEvent::HeldPastThreshold {
                long_press_handled: false,
            } => GestureKind::LongPress,
            OkEvent::ReleasedShort => GestureKind::ShortPress,
            OkEvent::ReleasedAfterLong => GestureKind::Release,
        };
        Some(InputGesture {
            button: Button::Ok,
            kind,
        })
    }
}

/// Press tracking for the OK button.
#[derive(Clone, Copy, Debug, Default)]
pub struct OkButton {
    pressed: bool,
    press_start_ms: u32,
    long_press_handled: bool,
}

impl OkButton {
    pub const fn new() -> OkButton {
        OkButton {
            pressed: false,
            press_start_ms: 0,
            long_press_handled: false,
        }
    }

    /// Classifies one sample of the OK level.
    pub fn sample(&mut self, is_pressed: bool, now_ms: u32) -> OkEvent {
        match (is_pressed, self.pressed) {
            (true, false) => {
                self.pressed = true;
                self.press_start_ms = now_ms;
                self.long_press_handled = false;
                OkEvent::PressStarted
            }
            (true, true) => {
                if elapsed_ms(now_ms, self.press_start_ms) >= LONG_PRESS_MS {
                    let already = self.long_press_handled;
                    self.long_press_handled = true;
                    OkEvent::HeldPastThreshold {
                        long_press_handled: already,
                    }
                } else {
                    OkEvent::NoChange
                }
            }
            (false, true) => {
                self.pressed = false;
                if self.long_press_handled {
                    OkEvent::ReleasedAfterLong
                } else {
                    OkEvent::ReleasedShort
                }
            }
            (false, false) => OkEvent::NoChange,
        }
    }

    /// Marks the button released without emitting an event. Used after the
    /// controller has waited out a press in another screen.
    pub fn resync_released(&mut self) {
        self.pressed = false;
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }
}
