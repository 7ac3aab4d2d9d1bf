//! 1.14" ST7789 panel, 135x240 glass driven in landscape.

use display_interface_spi::SPIInterface;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;
use mipidsi::models::ST7789;
use mipidsi::options::{ColorInversion, Orientation, Rotation};
use mipidsi::{Builder, NoResetPin};

/// The glass sits inside the controller's 240x320 RAM at this offset.
const OFFSET_X: u16 = 52;
const OFFSET_Y: u16 = 40;

/// Panel on an SPI device plus its data/command pin. The reset line is
/// tied to RUN.
pub type Panel<SPI, DC> = mipidsi::Display<SPIInterface<SPI, DC>, ST7789, NoResetPin>;

/// Initialises the panel rotated to 240x135.
pub fn init_panel<SPI, DC, D>(spi: SPI, dc: DC, delay: &mut D) -> Panel<SPI, DC>
where
    SPI: SpiDevice,
    DC: OutputPin,
    D: DelayNs,
{
    let di = SPIInterface::new(spi, dc);
    // Native size is given before rotation
    Builder::new(ST7789, di)
        .display_size(135, 240)
        .display_offset(OFFSET_X, OFFSET_Y)
        .orientation(Orientation::new().rotate(Rotation::Deg90))
        .invert_colors(ColorInversion::Inverted)
        .init(delay)
        .unwrap()
}
