//! Threshold alert evaluation.
//!
//! Comparisons are strict (`>`), with no hysteresis: a reading hovering
//! around its threshold may flip the alert every iteration.

use core::fmt::Write;

use heapless::String;

use crate::sensors::Readings;
use crate::thresholds::Thresholds;

/// Which metrics are above their threshold right now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertStatus {
    pub temp_exceeded: bool,
    pub hum_exceeded: bool,
}

/// Compares one reading against its threshold. A missing reading never alerts.
#[inline]
fn exceeds(value: Option<f32>, max: f32) -> bool {
    matches!(value, Some(v) if v > max)
}

/// Evaluates both metrics.
pub fn evaluate(readings: &Readings, thresholds: &Thresholds) -> AlertStatus {
    AlertStatus {
        temp_exceeded: exceeds(readings.temperature_c, thresholds.temp_max),
        hum_exceeded: exceeds(readings.humidity_pct, thresholds.hum_max),
    }
}

impl AlertStatus {
    #[inline]
    pub const fn any(&self) -> bool {
        self.temp_exceeded || self.hum_exceeded
    }

    /// Value of the `Nota` column in the CSV log.
    pub const fn note(&self) -> &'static str {
        match (self.temp_exceeded, self.hum_exceeded) {
            (true, true) => "ALERTA T+H",
            (true, false) => "ALERTA TEMP",
            (false, true) => "ALERTA HUM",
            (false, false) => "",
        }
    }

    /// Name of the exceeded metric(s) on the alert banner.
    pub const fn banner_title(&self) -> &'static str {
        match (self.temp_exceeded, self.hum_exceeded) {
            (true, true) => "TEMP Y HUMEDAD",
            (true, false) => "TEMPERATURA",
            (false, true) => "HUMEDAD",
            (false, false) => "",
        }
    }

    /// Threshold value(s) on the alert banner, e.g. `28.0 C` or `28.0C / 70.0%`.
    pub fn banner_value(&self, thresholds: &Thresholds) -> String<24> {
        let mut out: String<24> = String::new();
        let _ = match (self.temp_exceeded, self.hum_exceeded) {
            (true, true) => write!(out, "{:.1}C / {:.1}%", thresholds.temp_max, thresholds.hum_max),
            (true, false) => write!(out, "{:.1} C", thresholds.temp_max),
            (false, true) => write!(out, "{:.1} %", thresholds.hum_max),
            (false, false) => Ok(()),
        };
        out
    }
}
