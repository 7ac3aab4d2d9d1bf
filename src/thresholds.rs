use crate::config::{DEFAULT_HUM_MAX, DEFAULT_TEMP_MAX, THRESHOLD_STEP};

/// Metric a threshold applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Metric {
    Temperature,
    Humidity,
}

/// Thresholds defines the user-selected alert trigger for each metric.
/// temp_max: alert when the temperature in Celsius goes above this
/// hum_max: alert when the relative humidity percentage goes above this
///
/// Values are not clamped; they can be stepped below zero or past 100 %.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    pub temp_max: f32,
    pub hum_max: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            temp_max: DEFAULT_TEMP_MAX,
            hum_max: DEFAULT_HUM_MAX,
        }
    }
}

impl Thresholds {
    pub fn get(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Temperature => self.temp_max,
            Metric::Humidity => self.hum_max,
        }
    }

    /// Moves a threshold by one step
    /// param metric: which threshold to change
    /// param increment: if the value goes up (not down)
    /// returns the new value
    pub fn step(&mut self, metric: Metric, increment: bool) -> f32 {
        let delta = if increment {
            THRESHOLD_STEP
        } else {
            -THRESHOLD_STEP
        };
        let slot = match metric {
            Metric::Temperature => &mut self.temp_max,
            Metric::Humidity => &mut self.hum_max,
        };
        *slot += delta;
        *slot
    }
}
