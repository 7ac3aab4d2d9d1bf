//! Host-side fakes for the hardware collaborators.
//!
//! Every fake that needs to observe time shares one [`FakeClock`], and pauses
//! advance that clock instead of sleeping, so whole scenarios run instantly
//! and deterministically.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;

use crate::clock::{ClockFault, DateTime, Rtc};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::input::{Button, Buttons};
use crate::sensors::{Sensor, SensorFault};
use crate::storage::{Storage, StorageFault};
use crate::timer::Monotonic;

/// Simulated millisecond clock. Clones share the same time.
#[derive(Clone, Default)]
pub struct FakeClock {
    now: Rc<Cell<u32>>,
}

impl FakeClock {
    pub fn starting_at(ms: u32) -> FakeClock {
        let clock = FakeClock::default();
        clock.now.set(ms);
        clock
    }

    pub fn get(&self) -> u32 {
        self.now.get()
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl Monotonic for FakeClock {
    fn now_ms(&mut self) -> u32 {
        self.now.get()
    }
}

impl DelayNs for FakeClock {
    fn delay_ns(&mut self, ns: u32) {
        self.advance(ns / 1_000_000);
    }

    fn delay_us(&mut self, us: u32) {
        self.advance(us / 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

/// Buttons held during scripted `[start, end)` windows of simulated time.
#[derive(Clone)]
pub struct ScriptedButtons {
    clock: FakeClock,
    presses: Rc<RefCell<Vec<(Button, u32, u32)>>>,
}

impl ScriptedButtons {
    pub fn new(clock: &FakeClock) -> ScriptedButtons {
        ScriptedButtons {
            clock: clock.clone(),
            presses: Rc::default(),
        }
    }

    /// Holds `button` from now for `hold_ms`.
    pub fn press_now(&self, button: Button, hold_ms: u32) {
        let now = self.clock.get();
        self.presses.borrow_mut().push((button, now, now + hold_ms));
    }
}

impl Buttons for ScriptedButtons {
    fn is_pressed(&mut self, button: Button) -> bool {
        let now = self.clock.get();
        self.presses
            .borrow()
            .iter()
            .any(|&(b, start, end)| b == button && start <= now && now < end)
    }
}

/// Sensor returning whatever the test last set.
#[derive(Clone)]
pub struct FakeSensor {
    values: Rc<Cell<Option<(f32, f32, f32)>>>,
}

impl FakeSensor {
    /// Temperature in C, humidity in %, pressure in hPa.
    pub fn new(temperature: f32, humidity: f32, pressure_hpa: f32) -> FakeSensor {
        FakeSensor {
            values: Rc::new(Cell::new(Some((temperature, humidity, pressure_hpa)))),
        }
    }

    pub fn set(&self, temperature: f32, humidity: f32, pressure_hpa: f32) {
        self.values.set(Some((temperature, humidity, pressure_hpa)));
    }

    pub fn fail(&self) {
        self.values.set(None);
    }
}

impl Sensor for FakeSensor {
    fn read_temperature(&mut self) -> Result<f32, SensorFault> {
        self.values.get().map(|v| v.0).ok_or(SensorFault)
    }

    fn read_humidity(&mut self) -> Result<f32, SensorFault> {
        self.values.get().map(|v| v.1).ok_or(SensorFault)
    }

    fn read_pressure(&mut self) -> Result<f32, SensorFault> {
        self.values.get().map(|v| v.2 * 100.0).ok_or(SensorFault)
    }
}

pub struct FakeRtc(pub Option<DateTime>);

impl Rtc for FakeRtc {
    fn now(&mut self) -> Result<DateTime, ClockFault> {
        self.0.ok_or(ClockFault)
    }
}

/// Shared state of the in-memory card.
#[derive(Default)]
pub struct Card {
    pub present: bool,
    /// Whether `reinit` brings a missing card back.
    pub reinit_restores: bool,
    pub fail_open: bool,
    pub reinit_count: u32,
    pub open_files: u32,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl Card {
    pub fn text(&self, path: &str) -> String {
        self.files
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default()
    }
}

pub struct MemFile {
    path: String,
    pos: usize,
}

/// In-memory FAT stand-in. Clones share the same card.
#[derive(Clone)]
pub struct MemStorage {
    pub card: Rc<RefCell<Card>>,
}

impl MemStorage {
    pub fn with_card() -> MemStorage {
        let storage = MemStorage {
            card: Rc::default(),
        };
        storage.card.borrow_mut().present = true;
        storage
    }

    pub fn without_card() -> MemStorage {
        MemStorage {
            card: Rc::default(),
        }
    }

    pub fn touch(&self, path: &str) {
        self.card
            .borrow_mut()
            .files
            .insert(path.to_string(), b"old\n".to_vec());
    }
}

impl Storage for MemStorage {
    type File = MemFile;

    fn exists(&mut self, path: &str) -> bool {
        let card = self.card.borrow();
        card.present && (path == "/" || card.files.contains_key(path))
    }

    fn open_append(&mut self, path: &str) -> Result<MemFile, StorageFault> {
        let mut card = self.card.borrow_mut();
        if !card.present || card.fail_open {
            return Err(StorageFault::OpenFailed);
        }
        card.files.entry(path.to_string()).or_default();
        card.open_files += 1;
        Ok(MemFile {
            path: path.to_string(),
            pos: 0,
        })
    }

    fn size(&mut self, file: &MemFile) -> u32 {
        self.card.borrow().files.get(&file.path).map_or(0, |f| f.len() as u32)
    }

    fn seek(&mut self, file: &mut MemFile, pos: u32) -> Result<(), StorageFault> {
        file.pos = pos as usize;
        Ok(())
    }

    fn write(&mut self, file: &mut MemFile, data: &[u8]) -> Result<(), StorageFault> {
        let mut card = self.card.borrow_mut();
        if !card.present {
            return Err(StorageFault::WriteFailed);
        }
        let contents = card.files.get_mut(&file.path).ok_or(StorageFault::WriteFailed)?;
        contents.truncate(file.pos);
        contents.extend_from_slice(data);
        file.pos += data.len();
        Ok(())
    }

    fn flush(&mut self, _file: &mut MemFile) -> Result<(), StorageFault> {
        Ok(())
    }

    fn close(&mut self, _file: MemFile) {
        self.card.borrow_mut().open_files -= 1;
    }

    fn reinit(&mut self) -> bool {
        let mut card = self.card.borrow_mut();
        card.reinit_count += 1;
        if card.reinit_restores {
            card.present = true;
        }
        card.present
    }
}

/// Full-size RGB565 framebuffer.
pub struct Framebuffer {
    pixels: Vec<Rgb565>,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Framebuffer {
            pixels: vec![Rgb565::BLACK; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
        }
    }
}

impl Framebuffer {
    pub fn count(&self, color: Rgb565) -> usize {
        self.pixels.iter().filter(|&&p| p == color).count()
    }

    /// Pixels of `color` inside rows `[top, bottom)`.
    pub fn count_in_rows(&self, color: Rgb565, top: u32, bottom: u32) -> usize {
        let start = (top * SCREEN_WIDTH) as usize;
        let end = (bottom.min(SCREEN_HEIGHT) * SCREEN_WIDTH) as usize;
        self.pixels[start..end].iter().filter(|&&p| p == color).count()
    }

    pub fn is_blank(&self) -> bool {
        self.count(Rgb565::BLACK) == self.pixels.len()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < SCREEN_WIDTH
                && (point.y as u32) < SCREEN_HEIGHT
            {
                self.pixels[(point.y as u32 * SCREEN_WIDTH + point.x as u32) as usize] = color;
            }
        }
        Ok(())
    }
}
