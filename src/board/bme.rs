use bme680::{
    Bme680, FieldData, I2CAddress, IIRFilterSize, OversamplingSetting, PowerMode, SettingsBuilder,
};
use defmt::warn;
use envmon_rs::sensors::{Sensor, SensorFault};
use i2c_pio::I2C;
use rp_pico::hal::gpio::bank0::{Gpio8, Gpio9};
use rp_pico::hal::gpio::{FunctionNull, Pin, PullDown};
use rp_pico::hal::pio::SM0;
use rp_pico::hal::Timer;
use rp_pico::pac::PIO0;

pub type BmeBus<'a> =
    I2C<'a, PIO0, SM0, Pin<Gpio8, FunctionNull, PullDown>, Pin<Gpio9, FunctionNull, PullDown>>;

type Bme<'a> = Bme680<BmeBus<'a>, Timer>;

/// BME680 on the PIO I2C bus.
///
/// Every temperature read triggers a forced measurement; humidity and
/// pressure are taken from that same measurement, which matches the order
/// [`Readings::sample`](envmon_rs::sensors::Readings::sample) reads them in.
pub struct BmeSensor<'a> {
    bme: Option<Bme<'a>>,
    delay: Timer,
    last: Option<FieldData>,
}

impl<'a> BmeSensor<'a> {
    /// Brings the sensor up. A sensor that fails here is kept around as
    /// absent and every read reports a fault.
    pub fn new(bus: BmeBus<'a>, mut delay: Timer) -> BmeSensor<'a> {
        let bme = match Bme680::init(bus, &mut delay, I2CAddress::Secondary) {
            Ok(mut bme) => {
                let settings = SettingsBuilder::new()
                    .with_humidity_oversampling(OversamplingSetting::OS2x)
                    .with_pressure_oversampling(OversamplingSetting::OS4x)
                    .with_temperature_oversampling(OversamplingSetting::OS8x)
                    .with_temperature_filter(IIRFilterSize::Size3)
                    .with_run_gas(false)
                    .build();
                if bme.set_sensor_settings(&mut delay, settings).is_err() {
                    warn!("BME680 settings rejected");
                }
                Some(bme)
            }
            Err(_) => {
                warn!("BME680 not found");
                None
            }
        };
        BmeSensor {
            bme,
            delay,
            last: None,
        }
    }

    pub fn is_present(&self) -> bool {
        self.bme.is_some()
    }

    fn measure(&mut self) -> Result<FieldData, SensorFault> {
        let bme = self.bme.as_mut().ok_or(SensorFault)?;
        bme.set_sensor_mode(&mut self.delay, PowerMode::ForcedMode)
            .map_err(|_| SensorFault)?;
        let (data, _condition) = bme
            .get_sensor_data(&mut self.delay)
            .map_err(|_| SensorFault)?;
        Ok(data)
    }
}

impl Sensor for BmeSensor<'_> {
    fn read_temperature(&mut self) -> Result<f32, SensorFault> {
        self.last = self.measure().ok();
        self.last
            .as_ref()
            .map(FieldData::temperature_celsius)
            .ok_or(SensorFault)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorFault> {
        self.last
            .as_ref()
            .map(FieldData::humidity_percent)
            .ok_or(SensorFault)
    }

    fn read_pressure(&mut self) -> Result<f32, SensorFault> {
        self.last
            .as_ref()
            .map(|data| data.pressure_hpa() * 100.0)
            .ok_or(SensorFault)
    }
}
