/// A sensor read failed or returned a non-finite value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorFault;

/// Temperature/humidity/pressure sensor collaborator.
pub trait Sensor {
    /// Degrees Celsius
    fn read_temperature(&mut self) -> Result<f32, SensorFault>;
    /// Percent relative humidity
    fn read_humidity(&mut self) -> Result<f32, SensorFault>;
    /// Pascal
    fn read_pressure(&mut self) -> Result<f32, SensorFault>;
}

/// Latest values in display units.
/// `None` means the metric has never been read successfully.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Readings {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub pressure_hpa: Option<f32>,
}

impl Readings {
    pub const fn new(temperature_c: f32, humidity_pct: f32, pressure_hpa: f32) -> Readings {
        Readings {
            temperature_c: Some(temperature_c),
            humidity_pct: Some(humidity_pct),
            pressure_hpa: Some(pressure_hpa),
        }
    }

    /// Reads all three metrics. A failed read keeps the last known value.
    pub fn sample<S: Sensor>(&mut self, sensor: &mut S) {
        keep_last(&mut self.temperature_c, sensor.read_temperature());
        keep_last(&mut self.humidity_pct, sensor.read_humidity());
        keep_last(
            &mut self.pressure_hpa,
            sensor.read_pressure().map(|pa| pa / 100.0),
        );
    }
}

fn keep_last(slot: &mut Option<f32>, read: Result<f32, SensorFault>) {
    match read {
        Ok(value) if value.is_finite() => *slot = Some(value),
        _ => debug!("sensor read failed, keeping last value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted {
        temperature: Result<f32, SensorFault>,
        humidity: Result<f32, SensorFault>,
        pressure: Result<f32, SensorFault>,
    }

    impl Sensor for Scripted {
        fn read_temperature(&mut self) -> Result<f32, SensorFault> {
            self.temperature
        }
        fn read_humidity(&mut self) -> Result<f32, SensorFault> {
            self.humidity
        }
        fn read_pressure(&mut self) -> Result<f32, SensorFault> {
            self.pressure
        }
    }

    #[test]
    fn pressure_is_converted_to_hpa() {
        let mut sensor = Scripted {
            temperature: Ok(21.5),
            humidity: Ok(40.0),
            pressure: Ok(101_325.0),
        };
        let mut readings = Readings::default();
        readings.sample(&mut sensor);
        assert_eq!(readings.temperature_c, Some(21.5));
        assert_eq!(readings.humidity_pct, Some(40.0));
        assert!((readings.pressure_hpa.unwrap() - 1013.25).abs() < 0.001);
    }

    #[test]
    fn faults_keep_last_known_value() {
        let mut sensor = Scripted {
            temperature: Ok(22.0),
            humidity: Ok(50.0),
            pressure: Ok(100_000.0),
        };
        let mut readings = Readings::default();
        readings.sample(&mut sensor);

        sensor.temperature = Err(SensorFault);
        sensor.humidity = Ok(f32::NAN);
        sensor.pressure = Ok(99_000.0);
        readings.sample(&mut sensor);

        assert_eq!(readings.temperature_c, Some(22.0));
        assert_eq!(readings.humidity_pct, Some(50.0));
        assert_eq!(readings.pressure_hpa, Some(990.0));
    }

    #[test]
    fn never_read_metric_stays_empty() {
        let mut sensor = Scripted {
            temperature: Err(SensorFault),
            humidity: Ok(55.0),
            pressure: Err(SensorFault),
        };
        let mut readings = Readings::default();
        readings.sample(&mut sensor);
        assert_eq!(readings.temperature_c, None);
        assert_eq!(readings.humidity_pct, Some(55.0));
        assert_eq!(readings.pressure_hpa, None);
    }
}
