use embedded_hal::digital::InputPin;
use envmon_rs::input::{Button, Buttons};
use rp_pico::hal::gpio::bank0::{Gpio20, Gpio21, Gpio22};
use rp_pico::hal::gpio::{FunctionSio, Interrupt, Pin, PullUp, SioInput};

type Input<I> = Pin<I, FunctionSio<SioInput>, PullUp>;

/// The three front-panel buttons. They are wired to ground with the
/// internal pull-ups enabled, so a low level means "pressed".
pub struct PanelButtons {
    pub ok: Input<Gpio20>,
    pub up: Input<Gpio21>,
    pub down: Input<Gpio22>,
}

impl Buttons for PanelButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        let level = match button {
            Button::Ok => self.ok.is_low(),
            Button::Up => self.up.is_low(),
            Button::Down => self.down.is_low(),
        };
        level.unwrap_or(false)
    }
}

impl PanelButtons {
    /// Latches the next OK press as a falling edge, so it can wake the core.
    pub fn arm_wake(&mut self) {
        self.ok.clear_interrupt(Interrupt::EdgeLow);
        self.ok.set_interrupt_enabled(Interrupt::EdgeLow, true);
    }

    pub fn wake_requested(&self) -> bool {
        self.ok.interrupt_status(Interrupt::EdgeLow)
    }
}
