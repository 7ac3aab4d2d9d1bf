use embedded_hal::delay::DelayNs;
use envmon_rs::timer::Monotonic;
use rp_pico::hal::Timer;

/// Millisecond clock and blocking delay backed by the RP2040 timer.
#[derive(Clone, Copy)]
pub struct Ticker {
    timer: Timer,
}

impl Ticker {
    pub fn new(timer: Timer) -> Ticker {
        Ticker { timer }
    }
}

impl Monotonic for Ticker {
    fn now_ms(&mut self) -> u32 {
        // Truncating the 64-bit microsecond counter makes this wrap like any
        // other u32 millisecond tick.
        (self.timer.get_counter().ticks() / 1_000) as u32
    }
}

impl DelayNs for Ticker {
    fn delay_ns(&mut self, ns: u32) {
        self.timer.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.timer.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.timer.delay_ms(ms);
    }
}
