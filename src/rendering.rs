//! Screen rendering.
//!
//! Every frame is made of two layers: the status bar (HUD) across the top and
//! a content region owned by the current screen. All text is drawn with a
//! black background so a redraw overwrites the previous glyphs in place.

use core::fmt::Write;

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_6X10};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::{BinaryColor, Rgb565};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{
    Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle,
};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::alerts::AlertStatus;
use crate::clock::DateTime;
use crate::config::{
    CONTENT_TOP, HUD_HEIGHT, MENU_FIRST_ROW_Y, MENU_ROWS, MENU_ROW_GAP, SCREEN_HEIGHT,
    SCREEN_WIDTH,
};
use crate::sensors::Readings;
use crate::thresholds::{Metric, Thresholds};

pub const BLACK: Rgb565 = Rgb565::BLACK;
pub const WHITE: Rgb565 = Rgb565::WHITE;
pub const RED: Rgb565 = Rgb565::RED;
pub const GREEN: Rgb565 = Rgb565::GREEN;
pub const BLUE: Rgb565 = Rgb565::BLUE;
pub const YELLOW: Rgb565 = Rgb565::YELLOW;
pub const CYAN: Rgb565 = Rgb565::CYAN;
pub const MAGENTA: Rgb565 = Rgb565::MAGENTA;
pub const SILVER: Rgb565 = Rgb565::new(24, 48, 24);
pub const DARK_GREY: Rgb565 = Rgb565::new(15, 31, 15);

const SMALL: &MonoFont<'static> = &FONT_6X10;
const MEDIUM: &MonoFont<'static> = &FONT_10X20;
const LARGE: &MonoFont<'static> = &profont::PROFONT_24_POINT;

const LOGO_WIDTH: u32 = 32;
const LOGO_HEIGHT: u32 = 32;

#[rustfmt::skip]
const LOGO: [u8; 128] = [
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
    0x03, 0xF0, 0x00, 0x00,
    0x02, 0x10, 0x00, 0x00,
    0x02, 0x10, 0x00, 0x00,
    0x02, 0x10, 0x01, 0x00,
    0x02, 0x10, 0x01, 0x00,
    0x02, 0x10, 0x02, 0x80,
    0x02, 0x10, 0x02, 0x80,
    0x02, 0x10, 0x04, 0x40,
    0x02, 0x10, 0x04, 0x40,
    0x02, 0xD0, 0x0C, 0x60,
    0x02, 0xD0, 0x08, 0x20,
    0x02, 0xD0, 0x08, 0x20,
    0x02, 0xD0, 0x17, 0xD0,
    0x02, 0xD0, 0x18, 0x30,
    0x02, 0xD0, 0x30, 0x18,
    0x02, 0xD0, 0x20, 0x08,
    0x02, 0xD0, 0x40, 0x04,
    0x02, 0xD0, 0x42, 0x04,
    0x02, 0xD0, 0x40, 0x04,
    0x04, 0xC8, 0x40, 0x04,
    0x09, 0xE4, 0x40, 0x04,
    0x0B, 0xF4, 0x20, 0x08,
    0x0B, 0xF4, 0x30, 0x18,
    0x0B, 0xF4, 0x18, 0x30,
    0x0B, 0xF4, 0x07, 0xC0,
    0x09, 0xE4, 0x00, 0x00,
    0x04, 0x08, 0x00, 0x00,
    0x03, 0xF0, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00,
];

/// What the Monitor content region shows this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MonitorView {
    /// Alert banner for the exceeded metric(s)
    Alert(AlertStatus),
    /// Live temperature, humidity and pressure
    Values,
}

/// Picks the Monitor frame: the banner only on the "on" half of the blink
/// cycle while an alert is active, live values otherwise.
pub fn monitor_view(alerts: AlertStatus, blink_on: bool) -> MonitorView {
    if alerts.any() && blink_on {
        MonitorView::Alert(alerts)
    } else {
        MonitorView::Values
    }
}

fn style(font: &'static MonoFont<'static>, color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyleBuilder::new()
        .font(font)
        .text_color(color)
        .background_color(BLACK)
        .build()
}

fn text<D>(display: &mut D, s: &str, x: i32, y: i32, font: &'static MonoFont<'static>, color: Rgb565)
where
    D: DrawTarget<Color = Rgb565>,
{
    Text::with_baseline(s, Point::new(x, y), style(font, color), Baseline::Top)
        .draw(display)
        .ok();
}

fn fill<D>(display: &mut D, x: i32, y: i32, w: u32, h: u32)
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(Point::new(x, y), Size::new(w, h))
        .into_styled(PrimitiveStyle::with_fill(BLACK))
        .draw(display)
        .ok();
}

fn frame<D>(display: &mut D, x: i32, y: i32, w: u32, h: u32, color: Rgb565)
where
    D: DrawTarget<Color = Rgb565>,
{
    RoundedRectangle::with_equal_corners(
        Rectangle::new(Point::new(x, y), Size::new(w, h)),
        Size::new(5, 5),
    )
    .into_styled(PrimitiveStyle::with_stroke(color, 1))
    .draw(display)
    .ok();
}

pub fn clear<D>(display: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    display.clear(BLACK).ok();
}

/// Renders the logo with its top-left corner at `(x, y)`.
pub fn draw_logo<D>(display: &mut D, x: i32, y: i32)
where
    D: DrawTarget<Color = Rgb565>,
{
    let raw: ImageRaw<BinaryColor> = ImageRaw::new(&LOGO, LOGO_WIDTH);
    Image::new(&raw, Point::new(x, y))
        .draw(&mut display.color_converted())
        .ok();
}

/// Draws the status bar: clock, recording indicator and thresholds.
/// param now: current RTC time
/// param logging: if a logging session is active
/// param thresholds: current alert thresholds
/// param degraded: if some hardware failed to initialise at boot
pub fn draw_hud<D>(
    display: &mut D,
    now: &DateTime,
    logging: bool,
    thresholds: &Thresholds,
    degraded: bool,
) where
    D: DrawTarget<Color = Rgb565>,
{
    fill(display, 0, 0, SCREEN_WIDTH, HUD_HEIGHT);

    text(display, &now.format_clock(), 5, 5, SMALL, SILVER);

    if logging {
        text(display, "REC", 60, 5, SMALL, RED);
        Circle::with_center(Point::new(85, 8), 7)
            .into_styled(PrimitiveStyle::with_fill(RED))
            .draw(display)
            .ok();
    } else {
        text(display, "IDLE", 60, 5, SMALL, GREEN);
    }

    let mut limits: String<24> = String::new();
    let _ = write!(limits, "Mx:{:.0}/{:.0}", thresholds.temp_max, thresholds.hum_max);
    text(display, &limits, 110, 5, SMALL, WHITE);

    if degraded {
        text(display, "!", 230, 5, SMALL, RED);
    }

    Line::new(
        Point::new(0, HUD_HEIGHT as i32),
        Point::new(SCREEN_WIDTH as i32, HUD_HEIGHT as i32),
    )
    .into_styled(PrimitiveStyle::with_stroke(DARK_GREY, 1))
    .draw(display)
    .ok();
}

/// `T: 23.4 C`, or `T: -- C` when the metric has no reading yet.
pub fn reading_line(label: &str, value: Option<f32>, decimals: usize, unit: &str) -> String<24> {
    let mut line: String<24> = String::new();
    let _ = match value {
        Some(v) => write!(line, "{}: {:.*} {}", label, decimals, v, unit),
        None => write!(line, "{}: -- {}", label, unit),
    };
    line
}

/// Draws the Monitor content region.
pub fn draw_monitor<D>(
    display: &mut D,
    view: MonitorView,
    readings: &Readings,
    thresholds: &Thresholds,
) where
    D: DrawTarget<Color = Rgb565>,
{
    fill(
        display,
        0,
        CONTENT_TOP,
        SCREEN_WIDTH,
        SCREEN_HEIGHT - CONTENT_TOP as u32,
    );

    match view {
        MonitorView::Alert(alerts) => {
            frame(display, 20, 35, 200, 90, RED);
            text(display, "ALERTA!", 80, 50, MEDIUM, RED);

            let title_x = match (alerts.temp_exceeded, alerts.hum_exceeded) {
                (true, true) => 45,
                (true, false) => 50,
                _ => 70,
            };
            text(display, alerts.banner_title(), title_x, 80, MEDIUM, WHITE);

            let value_x = if alerts.temp_exceeded && alerts.hum_exceeded {
                35
            } else {
                75
            };
            text(display, &alerts.banner_value(thresholds), value_x, 105, MEDIUM, WHITE);
        }
        MonitorView::Values => {
            let t = reading_line("T", readings.temperature_c, 1, "C");
            let h = reading_line("H", readings.humidity_pct, 1, "%");
            let p = reading_line("P", readings.pressure_hpa, 0, "hPa");
            text(display, &t, 20, 45, MEDIUM, GREEN);
            text(display, &h, 20, 80, MEDIUM, YELLOW);
            text(display, &p, 20, 115, MEDIUM, MAGENTA);
        }
    }
}

/// Text of one menu row, with the `> ` marker on the cursor row.
pub fn menu_row(index: u8, selected: bool, thresholds: &Thresholds) -> String<24> {
    let marker = if selected { "> " } else { "  " };
    let mut row: String<24> = String::new();
    let _ = match index {
        0 => write!(row, "{}TEMP MAX  {:.1}", marker, thresholds.temp_max),
        1 => write!(row, "{}HUM MAX   {:.1}", marker, thresholds.hum_max),
        _ => write!(row, "{}APAGAR", marker),
    };
    row
}

/// Renders the menu with the cursor row highlighted
/// param cursor: selected row (0 temp, 1 humidity, 2 sleep)
pub fn draw_menu<D>(display: &mut D, cursor: u8, thresholds: &Thresholds)
where
    D: DrawTarget<Color = Rgb565>,
{
    text(display, "MENU", 95, 25, MEDIUM, DARK_GREY);
    Line::new(Point::new(20, 45), Point::new(220, 45))
        .into_styled(PrimitiveStyle::with_stroke(DARK_GREY, 1))
        .draw(display)
        .ok();

    for index in 0..MENU_ROWS {
        let selected = index == cursor;
        let color = match (selected, index) {
            (false, _) => DARK_GREY,
            (true, 2) => RED,
            (true, _) => GREEN,
        };
        let y = MENU_FIRST_ROW_Y + MENU_ROW_GAP * index as i32;
        text(display, &menu_row(index, selected, thresholds), 20, y, MEDIUM, color);
    }
}

/// Renders the threshold editing screen for `metric`.
pub fn draw_config<D>(display: &mut D, metric: Metric, value: f32)
where
    D: DrawTarget<Color = Rgb565>,
{
    let (title, title_x, color) = match metric {
        Metric::Temperature => ("TEMP MAX", 55, CYAN),
        Metric::Humidity => ("HUM MAX", 65, YELLOW),
    };
    text(display, title, title_x, 30, MEDIUM, WHITE);

    let mut shown: String<12> = String::new();
    let _ = write!(shown, "{:.1}", value);
    // The value can shrink by a digit, wipe the whole row
    fill(display, 0, 60, SCREEN_WIDTH, 40);
    text(display, &shown, 75, 60, LARGE, color);

    text(display, "UP/DOWN: +/- 0.5", 80, 105, SMALL, SILVER);
    text(display, "OK: SALIR", 95, 120, SMALL, SILVER);
}

/// Draws a framed message in the middle of a cleared screen.
pub fn draw_notice<D>(display: &mut D, message: &str, color: Rgb565)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear(display);
    frame(display, 20, 45, 200, 50, color);
    let half_width = (message.len() as i32) * (MEDIUM.character_size.width as i32) / 2;
    let x = (SCREEN_WIDTH as i32 / 2 - half_width).max(25);
    text(display, message, x, 60, MEDIUM, color);
}

/// Boot screen: logo, title and an optional hardware warning.
pub fn draw_splash<D>(display: &mut D, hw_ok: bool)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear(display);
    draw_logo(display, (SCREEN_WIDTH - LOGO_WIDTH) as i32 / 2, 10);
    let title_y = 10 + LOGO_HEIGHT as i32 + 5;
    text(display, "EnvMon", 90, title_y, MEDIUM, BLUE);
    if !hw_ok {
        text(display, "ERROR HW SENSOR", 45, title_y + 30, MEDIUM, RED);
    }
}

/// Logo alone in the middle of the screen, shown when entering the menu.
pub fn draw_transition<D>(display: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    clear(display);
    draw_logo(
        display,
        (SCREEN_WIDTH - LOGO_WIDTH) as i32 / 2,
        (SCREEN_HEIGHT - LOGO_HEIGHT) as i32 / 2,
    );
}

/// Number of frames in the sleep animation.
pub const SLEEP_FRAMES: u32 = (SCREEN_HEIGHT / 2).div_ceil(4);

/// One frame of the closing animation before sleep; frames close in from
/// the top and bottom edges.
pub fn draw_sleep_frame<D>(display: &mut D, frame_index: u32)
where
    D: DrawTarget<Color = Rgb565>,
{
    let inset = frame_index * 4;
    if inset * 2 >= SCREEN_HEIGHT {
        return;
    }
    Rectangle::new(
        Point::new(0, inset as i32),
        Size::new(SCREEN_WIDTH, SCREEN_HEIGHT - inset * 2),
    )
    .into_styled(PrimitiveStyle::with_stroke(DARK_GREY, 1))
    .draw(display)
    .ok();
}
