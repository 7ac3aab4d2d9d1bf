use embedded_hal::i2c::I2c;
use envmon_rs::clock::{ClockFault, DateTime, Rtc};

const ADDRESS: u8 = 0x68;
/// First time-keeping register (seconds).
const REG_SECONDS: u8 = 0x00;

/// DS3231 real-time clock. Only reads the time; setting it is left to
/// whatever programmed the chip.
pub struct Ds3231<I> {
    i2c: I,
}

impl<I: I2c> Ds3231<I> {
    pub fn new(i2c: I) -> Ds3231<I> {
        Ds3231 { i2c }
    }

    /// Whether the chip answers on the bus.
    pub fn probe(&mut self) -> bool {
        let mut status = [0u8; 1];
        self.i2c.write_read(ADDRESS, &[REG_SECONDS], &mut status).is_ok()
    }
}

impl<I: I2c> Rtc for Ds3231<I> {
    fn now(&mut self) -> Result<DateTime, ClockFault> {
        let mut regs = [0u8; 7];
        self.i2c
            .write_read(ADDRESS, &[REG_SECONDS], &mut regs)
            .map_err(|_| ClockFault)?;
        DateTime::from_bcd_registers(&regs)
    }
}
