//! The UI/logging state machine.
//!
//! [`Controller::step`] runs one iteration of the main loop for the current
//! [`SystemState`]. Time only passes inside the explicit pauses issued
//! through the injected timer.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal::delay::DelayNs;

use crate::alerts::{self, AlertStatus};
use crate::blink::BlinkState;
use crate::clock::{now_or_default, Rtc};
use crate::config::{
    DEFAULT_HUM_MAX, DEFAULT_TEMP_MAX, EDIT_BUTTON_DELAY, EDIT_SELECT_DELAY, IDLE_TIMEOUT_MS,
    MENU_BUTTON_DELAY, MENU_ROWS, MENU_SELECT_DELAY, MONITOR_LOOP_DELAY, NOTIFY_DURATION_MS,
    RELEASE_POLL_DELAY, SLEEP_FRAME_DELAY, SPLASH_DURATION_MS, SPLASH_ERROR_DURATION_MS,
    TRANSITION_DURATION_MS,
};
use crate::input::{Button, Buttons, GestureKind, OkButton};
use crate::rendering::{self, GREEN, RED};
use crate::sensors::{Readings, Sensor};
use crate::session::LogSession;
use crate::storage::{Storage, StorageFault};
use crate::thresholds::{Metric, Thresholds};
use crate::timer::{elapsed_ms, Monotonic};

/// Screen the controller is currently driving.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SystemState {
    Monitor,
    Menu,
    ConfigTemp,
    ConfigHum,
}

/// What the main loop should do after a [`Controller::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flow {
    Continue,
    /// The user picked APAGAR. The board must enter its low-power halt.
    Sleep,
}

/// Notification shown when starting a session fails.
pub const fn start_fault_message(fault: StorageFault) -> &'static str {
    match fault {
        StorageFault::NoCard => "NO HAY SD!",
        StorageFault::OpenFailed | StorageFault::WriteFailed => "ERROR FILE",
        StorageFault::NamesExhausted => "SD LLENA",
    }
}

/// Everything the controller mutates between iterations.
pub struct ControllerState {
    state: SystemState,
    thresholds: Thresholds,
    menu_cursor: u8,
    last_input_ms: u32,
    ok: OkButton,
    blink: BlinkState,
    session: LogSession,
    readings: Readings,
    /// Some hardware failed to initialise at boot.
    degraded: bool,
    last_notice: Option<&'static str>,
}

impl Default for ControllerState {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerState {
    pub const fn new() -> ControllerState {
        ControllerState {
            state: SystemState::Monitor,
            thresholds: Thresholds {
                temp_max: DEFAULT_TEMP_MAX,
                hum_max: DEFAULT_HUM_MAX,
            },
            menu_cursor: 0,
            last_input_ms: 0,
            ok: OkButton::new(),
            blink: BlinkState::new(),
            session: LogSession::new(),
            readings: Readings {
                temperature_c: None,
                humidity_pct: None,
                pressure_hpa: None,
            },
            degraded: false,
            last_notice: None,
        }
    }

    pub fn state(&self) -> SystemState {
        self.state
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn menu_cursor(&self) -> u8 {
        self.menu_cursor
    }

    pub fn session(&self) -> &LogSession {
        &self.session
    }

    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Text of the most recent notification overlay.
    pub fn last_notice(&self) -> Option<&'static str> {
        self.last_notice
    }
}

/// Owns the collaborators and drives them from one [`ControllerState`].
pub struct Controller<D, S, R, F, B, T> {
    display: D,
    sensor: S,
    rtc: R,
    storage: F,
    buttons: B,
    timer: T,
    state: ControllerState,
}

impl<D, S, R, F, B, T> Controller<D, S, R, F, B, T>
where
    D: DrawTarget<Color = Rgb565>,
    S: Sensor,
    R: Rtc,
    F: Storage,
    B: Buttons,
    T: Monotonic + DelayNs,
{
    pub fn new(display: D, sensor: S, rtc: R, storage: F, buttons: B, timer: T) -> Self {
        Controller {
            display,
            sensor,
            rtc,
            storage,
            buttons,
            timer,
            state: ControllerState::new(),
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn buttons_mut(&mut self) -> &mut B {
        &mut self.buttons
    }

    /// Shows the splash screen and leaves the HUD on a cleared screen.
    /// param hw_ok: if every peripheral came up at boot
    pub fn boot(&mut self, hw_ok: bool) {
        self.state.degraded = !hw_ok;
        rendering::draw_splash(&mut self.display, hw_ok);
        if hw_ok {
            self.timer.delay_ms(SPLASH_DURATION_MS);
        } else {
            warn!("hardware init incomplete, running degraded");
            self.timer.delay_ms(SPLASH_ERROR_DURATION_MS);
        }
        rendering::clear(&mut self.display);
        self.draw_hud();
        self.state.last_input_ms = self.timer.now_ms();
        info!("EnvMon ready");
    }

    /// Runs one loop iteration.
    pub fn step(&mut self) -> Flow {
        match self.state.state {
            SystemState::Monitor => {
                self.step_monitor();
                Flow::Continue
            }
            SystemState::Menu => self.step_menu(),
            SystemState::ConfigTemp => {
                self.step_config(Metric::Temperature);
                Flow::Continue
            }
            SystemState::ConfigHum => {
                self.step_config(Metric::Humidity);
                Flow::Continue
            }
        }
    }

    fn step_monitor(&mut self) {
        let now = self.timer.now_ms();
        let pressed = self.buttons.is_pressed(Button::Ok);
        match self.state.ok.sample(pressed, now).gesture().map(|g| g.kind) {
            Some(GestureKind::LongPress) => {
                self.enter_menu();
                return;
            }
            Some(GestureKind::ShortPress) => self.toggle_logging(),
            _ => {}
        }

        self.state.readings.sample(&mut self.sensor);
        let alerts = alerts::evaluate(&self.state.readings, &self.state.thresholds);
        let blink_on = self.state.blink.update(alerts.any(), self.timer.now_ms());

        rendering::draw_monitor(
            &mut self.display,
            rendering::monitor_view(alerts, blink_on),
            &self.state.readings,
            &self.state.thresholds,
        );
        self.draw_hud();

        self.log_record(&alerts);
        self.timer.delay_ms(MONITOR_LOOP_DELAY);
    }

    fn log_record(&mut self, alerts: &AlertStatus) {
        let now = self.timer.now_ms();
        let result = self.state.session.tick(
            &mut self.storage,
            &mut self.rtc,
            now,
            &self.state.readings,
            alerts,
        );
        if result.is_err() {
            self.notify("SD ERROR", RED);
            self.draw_hud();
        }
    }

    fn toggle_logging(&mut self) {
        if self.state.session.is_active() {
            self.state.session.stop();
            self.notify("PAUSA", RED);
        } else {
            match self.state.session.start(&mut self.storage) {
                Ok(()) => self.notify("GRABANDO", GREEN),
                Err(fault) => self.notify(start_fault_message(fault), RED),
            }
        }
        self.draw_hud();
    }

    fn enter_menu(&mut self) {
        info!("entering menu");
        self.state.state = SystemState::Menu;
        self.state.menu_cursor = 0;
        self.state.last_input_ms = self.timer.now_ms();

        rendering::draw_transition(&mut self.display);
        self.timer.delay_ms(TRANSITION_DURATION_MS);
        rendering::clear(&mut self.display);

        self.wait_for_release();
    }

    fn idle_expired(&mut self) -> bool {
        elapsed_ms(self.timer.now_ms(), self.state.last_input_ms) > IDLE_TIMEOUT_MS
    }

    fn touch_input(&mut self) {
        self.state.last_input_ms = self.timer.now_ms();
    }

    fn step_menu(&mut self) -> Flow {
        if self.idle_expired() {
            debug!("menu idle, back to monitor");
            self.state.state = SystemState::Monitor;
            rendering::clear(&mut self.display);
            return Flow::Continue;
        }

        rendering::draw_menu(
            &mut self.display,
            self.state.menu_cursor,
            &self.state.thresholds,
        );

        if self.buttons.is_pressed(Button::Down) {
            self.state.menu_cursor = (self.state.menu_cursor + 1) % MENU_ROWS;
            self.touch_input();
            self.timer.delay_ms(MENU_BUTTON_DELAY);
        }
        if self.buttons.is_pressed(Button::Up) {
            self.state.menu_cursor = (self.state.menu_cursor + MENU_ROWS - 1) % MENU_ROWS;
            self.touch_input();
            self.timer.delay_ms(MENU_BUTTON_DELAY);
        }

        if self.buttons.is_pressed(Button::Ok) {
            self.timer.delay_ms(MENU_SELECT_DELAY);
            self.state.state = match self.state.menu_cursor {
                0 => SystemState::ConfigTemp,
                1 => SystemState::ConfigHum,
                _ => {
                    self.go_to_sleep();
                    return Flow::Sleep;
                }
            };
            info!("editing {}", self.state.state);
            self.touch_input();
            rendering::clear(&mut self.display);
            self.wait_for_release();
        }
        Flow::Continue
    }

    fn step_config(&mut self, metric: Metric) {
        if self.idle_expired() {
            debug!("config idle, back to monitor");
            self.state.state = SystemState::Monitor;
            return;
        }

        rendering::draw_config(&mut self.display, metric, self.state.thresholds.get(metric));

        if self.buttons.is_pressed(Button::Up) {
            self.state.thresholds.step(metric, true);
            self.touch_input();
            self.timer.delay_ms(EDIT_BUTTON_DELAY);
        }
        if self.buttons.is_pressed(Button::Down) {
            self.state.thresholds.step(metric, false);
            self.touch_input();
            self.timer.delay_ms(EDIT_BUTTON_DELAY);
        }

        if self.buttons.is_pressed(Button::Ok) {
            self.timer.delay_ms(EDIT_SELECT_DELAY);
            info!(
                "thresholds saved: {} C / {} %",
                self.state.thresholds.temp_max,
                self.state.thresholds.hum_max
            );
            self.notify("GUARDADO", GREEN);
            self.state.state = SystemState::Monitor;
            self.draw_hud();
            self.wait_for_release();
        }
    }

    /// Plays the closing animation. The session is stopped so nothing is
    /// left half-done if the board never comes back to the loop.
    fn go_to_sleep(&mut self) {
        info!("going to sleep");
        self.state.session.stop();
        rendering::clear(&mut self.display);
        for frame in 0..rendering::SLEEP_FRAMES {
            rendering::draw_sleep_frame(&mut self.display, frame);
            self.timer.delay_ms(SLEEP_FRAME_DELAY);
        }
        rendering::clear(&mut self.display);
    }

    /// Blocks until OK is up, then forgets the press so it cannot fire
    /// again in the next screen.
    fn wait_for_release(&mut self) {
        while self.buttons.is_pressed(Button::Ok) {
            self.timer.delay_ms(RELEASE_POLL_DELAY);
        }
        self.state.ok.resync_released();
    }

    /// Full-screen message overlay: draw, hold, clear.
    fn notify(&mut self, message: &'static str, color: Rgb565) {
        info!("notice: {=str}", message);
        self.state.last_notice = Some(message);
        rendering::draw_notice(&mut self.display, message, color);
        self.timer.delay_ms(NOTIFY_DURATION_MS);
        rendering::clear(&mut self.display);
    }

    fn draw_hud(&mut self) {
        let now = now_or_default(&mut self.rtc);
        rendering::draw_hud(
            &mut self.display,
            &now,
            self.state.session.is_active(),
            &self.state.thresholds,
            self.state.degraded,
        );
    }
}
