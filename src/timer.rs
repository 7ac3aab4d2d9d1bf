/// Monotonic millisecond clock.
///
/// The counter is allowed to wrap; every elapsed-time comparison in this crate
/// goes through [`elapsed_ms`], which uses wrapping subtraction.
pub trait Monotonic {
    fn now_ms(&mut self) -> u32;
}

/// Milliseconds from `since` to `now`, tolerant of one counter wrap.
#[inline]
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Repeating interval measured from the moment it last fired.
pub struct IntervalTimer {
    period_ms: u32,
    last_ms: u32,
    /// Due once the full period has passed, rather than strictly more.
    inclusive: bool,
}

impl IntervalTimer {
    /// Due once strictly more than `period_ms` has passed.
    pub const fn new(period_ms: u32) -> IntervalTimer {
        Self {
            period_ms,
            last_ms: 0,
            inclusive: false,
        }
    }

    /// Due as soon as `period_ms` has passed.
    pub const fn at_least(period_ms: u32) -> IntervalTimer {
        Self {
            period_ms,
            last_ms: 0,
            inclusive: true,
        }
    }

    pub fn is_due(&self, now_ms: u32) -> bool {
        let elapsed = elapsed_ms(now_ms, self.last_ms);
        if self.inclusive {
            elapsed >= self.period_ms
        } else {
            elapsed > self.period_ms
        }
    }

    /// Fires and re-arms the interval if it is due.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.is_due(now_ms) {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    pub fn set_last(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }

    pub fn last(&self) -> u32 {
        self.last_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_survives_wraparound() {
        assert_eq!(elapsed_ms(20, u32::MAX - 10), 31);
        assert_eq!(elapsed_ms(1500, 500), 1000);
    }

    #[test]
    fn interval_needs_strictly_more_than_period() {
        let mut t = IntervalTimer::new(1000);
        assert!(!t.poll(1000));
        assert!(t.poll(1001));
        assert_eq!(t.last(), 1001);
        assert!(!t.poll(2001));
        assert!(t.poll(2002));
    }

    #[test]
    fn at_least_fires_on_the_period() {
        let mut t = IntervalTimer::at_least(1000);
        assert!(!t.poll(999));
        assert!(t.poll(1000));
        assert!(!t.poll(1999));
        assert!(t.poll(2000));
        assert_eq!(t.last(), 2000);
    }
}
