use heapless::String;
use ufmt::uwrite;

/// The real-time clock could not be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockFault;

/// Calendar date and wall-clock time as reported by the RTC.
/// Months and days start at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl Default for DateTime {
    fn default() -> Self {
        // 00:00:00 Jan 1 2000, shown when the RTC is unavailable
        DateTime {
            year: 2000,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        }
    }
}

/// Real-time clock collaborator.
pub trait Rtc {
    fn now(&mut self) -> Result<DateTime, ClockFault>;
}

/// Reads the RTC, degrading to [`DateTime::default`] on failure.
pub fn now_or_default<R: Rtc>(rtc: &mut R) -> DateTime {
    match rtc.now() {
        Ok(now) => now,
        Err(_) => {
            debug!("rtc read failed, using fallback time");
            DateTime::default()
        }
    }
}

impl DateTime {
    /// `YYYY/MM/DD`
    pub fn format_date(&self) -> String<10> {
        let mut out: String<10> = String::new();
        uwrite!(
            out,
            "{}{}/{}/{}",
            pad_year(self.year),
            self.year,
            pad_number(self.month).as_str(),
            pad_number(self.day).as_str()
        )
        .ok();
        out
    }

    /// `HH:MM:SS`
    pub fn format_time(&self) -> String<8> {
        let mut out: String<8> = String::new();
        uwrite!(
            out,
            "{}:{}:{}",
            pad_number(self.hour).as_str(),
            pad_number(self.minute).as_str(),
            pad_number(self.second).as_str()
        )
        .ok();
        out
    }

    /// `HH:MM`, as shown in the status bar
    pub fn format_clock(&self) -> String<5> {
        let mut out: String<5> = String::new();
        uwrite!(out, "{}:{}", pad_number(self.hour).as_str(), pad_number(self.minute).as_str()).ok();
        out
    }
}

impl DateTime {
    /// Decodes the seven BCD time-keeping registers (seconds first) of a
    /// DS3231-style RTC. Fails on out-of-range fields, which is what an
    /// unset or unpowered chip reports.
    pub fn from_bcd_registers(regs: &[u8; 7]) -> Result<DateTime, ClockFault> {
        let hour = if regs[2] & 0x40 != 0 {
            // 12 hour mode, bit 5 is PM
            let h12 = bcd(regs[2] & 0x1F) % 12;
            if regs[2] & 0x20 != 0 {
                h12 + 12
            } else {
                h12
            }
        } else {
            bcd(regs[2] & 0x3F)
        };
        let century = if regs[5] & 0x80 != 0 { 100 } else { 0 };
        let dt = DateTime {
            year: 2000 + century + bcd(regs[6]) as u16,
            month: bcd(regs[5] & 0x1F),
            day: bcd(regs[4] & 0x3F),
            hour,
            minute: bcd(regs[1] & 0x7F),
            second: bcd(regs[0] & 0x7F),
        };
        if dt.is_valid() {
            Ok(dt)
        } else {
            Err(ClockFault)
        }
    }

    fn is_valid(&self) -> bool {
        (1..=12).contains(&self.month)
            && (1..=31).contains(&self.day)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }
}

#[inline]
fn bcd(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

/// Pads a number with a zero before it if < 10
/// NOTE: Only supports values <100
fn pad_number(num: u8) -> String<2> {
    let mut padded = String::new();
    if num < 10 {
        uwrite!(padded, "0{}", num).ok();
    } else {
        uwrite!(padded, "{}", num).ok();
    }
    padded
}

/// Leading zeros needed to print `year` with four digits.
fn pad_year(year: u16) -> &'static str {
    match year {
        0..=9 => "000",
        10..=99 => "00",
        100..=999 => "0",
        _ => "",
    }
}
