use crate::config::BLINK_INTERVAL_MS;
use crate::timer::IntervalTimer;

/// Alternates the Monitor screen between the alert banner and live values.
///
/// The phase only advances while an alert is active. When the alert clears
/// the state is left as is, so the next alert resumes from the same phase.
pub struct BlinkState {
    on: bool,
    toggle: IntervalTimer,
}

impl Default for BlinkState {
    fn default() -> Self {
        Self::new()
    }
}

impl BlinkState {
    pub const fn new() -> BlinkState {
        BlinkState {
            on: false,
            toggle: IntervalTimer::new(BLINK_INTERVAL_MS),
        }
    }

    /// Advances the phase; returns whether the banner frame should show.
    pub fn update(&mut self, any_alert: bool, now_ms: u32) -> bool {
        if any_alert && self.toggle.poll(now_ms) {
            self.on = !self.on;
        }
        self.on
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    pub fn last_toggle_ms(&self) -> u32 {
        self.toggle.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_every_interval_while_alerting() {
        let mut blink = BlinkState::new();
        assert!(blink.update(true, 801));
        assert!(blink.update(true, 1200));
        assert!(blink.update(true, 1601));
        assert!(!blink.update(true, 1602));
        assert_eq!(blink.last_toggle_ms(), 1602);
    }

    #[test]
    fn frozen_without_alert() {
        let mut blink = BlinkState::new();
        blink.update(true, 900);
        assert!(blink.is_on());

        assert!(blink.update(false, 5000));
        assert!(blink.update(false, 9000));
        assert_eq!(blink.last_toggle_ms(), 900);

        // Resumes from the frozen phase
        assert!(!blink.update(true, 9001));
    }
}
