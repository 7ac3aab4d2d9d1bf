#![no_std]
#![no_main]

mod board;

use bsp::entry;
use defmt::*;
use defmt_rtt as _;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal_bus::spi::ExclusiveDevice;
use panic_probe as _;

// Provide an alias for our BSP so we can switch targets quickly.
// Uncomment the BSP you included in Cargo.toml, the rest of the code does not need to change.
use rp_pico as bsp;

use bsp::hal::{
    clocks::{init_clocks_and_plls, Clock},
    pac,
    watchdog::Watchdog,
};
use envmon_rs::controller::{Controller, Flow};
use envmon_rs::input::{Button, Buttons};
use envmon_rs::storage::Storage;
use i2c_pio::I2C;
use rp_pico::hal;
use rp_pico::hal::fugit::RateExtU32;
use rp_pico::hal::gpio::{FunctionI2C, FunctionSpi, PullUp};
use rp_pico::hal::pio::PIOExt;
use rp_pico::hal::Timer;

use board::bme::BmeSensor;
use board::buttons::PanelButtons;
use board::ds3231::Ds3231;
use board::sdcard::SdStorage;
use board::display::init_panel;
use board::ticker::Ticker;

/// Poll period while waiting for OK to come up before sleeping.
const RELEASE_POLL_MS: u32 = 10;

#[entry]
fn main() -> ! {
    info!("EnvMon starting");
    // Grab our singleton objects
    let mut pac = pac::Peripherals::take().unwrap();
    let mut core = pac::CorePeripherals::take().unwrap();

    // Set up the watchdog driver - needed by the clock setup code
    let mut watchdog = Watchdog::new(pac.WATCHDOG);

    // Configure the clocks
    //
    // The default is to generate a 125 MHz system clock
    let clocks = init_clocks_and_plls(
        rp_pico::XOSC_CRYSTAL_FREQ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The single-cycle I/O block controls our GPIO pins
    let sio = hal::Sio::new(pac.SIO);

    // Set the pins up according to their function on this particular board
    let pins = rp_pico::Pins::new(
        pac.IO_BANK0,
        pac.PADS_BANK0,
        sio.gpio_bank0,
        &mut pac.RESETS,
    );

    let mut delay = Timer::new(pac.TIMER, &mut pac.RESETS, &clocks);

    // Set up BME680 on the PIO I2C bus
    let (mut pio, sm0, _, _, _) = pac.PIO0.split(&mut pac.RESETS);
    let i2c_pio = I2C::new(
        &mut pio,
        pins.gpio8,
        pins.gpio9,
        sm0,
        100.kHz(),
        clocks.system_clock.freq(),
    );
    let sensor = BmeSensor::new(i2c_pio, delay);

    // Set up DS3231 on I2C1
    let i2c1 = hal::I2C::i2c1(
        pac.I2C1,
        pins.gpio18.reconfigure::<FunctionI2C, PullUp>(),
        pins.gpio19.reconfigure::<FunctionI2C, PullUp>(),
        400.kHz(),
        &mut pac.RESETS,
        &clocks.system_clock,
    );
    let mut rtc = Ds3231::new(i2c1);
    let rtc_ok = rtc.probe();
    if !rtc_ok {
        warn!("DS3231 not answering");
    }

    // Set up ST7789 on SPI1
    let display_spi = hal::Spi::<_, _, _, 8>::new(
        pac.SPI1,
        (
            pins.gpio11.into_function::<FunctionSpi>(),
            pins.gpio10.into_function::<FunctionSpi>(),
        ),
    )
    .init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        32.MHz(),
        embedded_hal::spi::MODE_0,
    );
    let display_cs = pins.gpio13.into_push_pull_output();
    let display_dc = pins.gpio12.into_push_pull_output();
    let mut backlight = pins.gpio6.into_push_pull_output();
    let display_device = ExclusiveDevice::new_no_delay(display_spi, display_cs).unwrap();
    let display = init_panel(display_device, display_dc, &mut delay);
    backlight.set_high().unwrap();

    // Set up SD card on SPI0. Cards must be initialised at 400 kHz or less.
    let sd_spi = hal::Spi::<_, _, _, 8>::new(
        pac.SPI0,
        (
            pins.gpio3.into_function::<FunctionSpi>(),
            pins.gpio4.into_function::<FunctionSpi>(),
            pins.gpio2.into_function::<FunctionSpi>(),
        ),
    )
    .init(
        &mut pac.RESETS,
        clocks.peripheral_clock.freq(),
        400.kHz(),
        embedded_hal::spi::MODE_0,
    );
    let sd_cs = pins.gpio5.into_push_pull_output();
    let sd_device = ExclusiveDevice::new_no_delay(sd_spi, sd_cs).unwrap();
    let mut storage = SdStorage::new(embedded_sdmmc::SdCard::new(sd_device, delay));
    let sd_ok = storage.exists("/");
    if !sd_ok {
        warn!("no SD card at boot");
    }

    // Buttons pull to ground when pressed
    let buttons = PanelButtons {
        ok: pins.gpio20.into_pull_up_input(),
        up: pins.gpio21.into_pull_up_input(),
        down: pins.gpio22.into_pull_up_input(),
    };

    let hw_ok = sensor.is_present() && rtc_ok && sd_ok;
    let mut controller = Controller::new(
        display,
        sensor,
        rtc,
        storage,
        buttons,
        Ticker::new(delay),
    );
    controller.boot(hw_ok);

    loop {
        if controller.step() == Flow::Sleep {
            break;
        }
    }

    // Sleep: panel and backlight off, core halted until OK is pressed,
    // then start over
    info!("sleeping");
    controller.display_mut().sleep(&mut delay).ok();
    backlight.set_low().unwrap();
    while controller.buttons_mut().is_pressed(Button::Ok) {
        delay.delay_ms(RELEASE_POLL_MS);
    }
    let buttons = controller.buttons_mut();
    buttons.arm_wake();
    // The GPIO interrupt stays disabled in the NVIC; with SEVONPEND its
    // pending bit alone ends the WFE
    core.SCB.set_sevonpend();
    while !buttons.wake_requested() {
        cortex_m::asm::wfe();
    }
    info!("waking up");
    cortex_m::peripheral::SCB::sys_reset();
}
