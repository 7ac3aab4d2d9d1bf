//! Compile-time configuration.
//!
//! Timings are in milliseconds against the [`Monotonic`](crate::timer::Monotonic)
//! clock. Layout values target a 240x135 landscape panel.

// =============================================================================
// Timing
// =============================================================================

/// Holding OK this long opens the menu.
pub const LONG_PRESS_MS: u32 = 3000;

/// Alert banner / live values alternate at this period.
pub const BLINK_INTERVAL_MS: u32 = 800;

/// Minimum spacing between two CSV records.
pub const SAVE_INTERVAL_MS: u32 = 1000;

/// Menu and config screens fall back to Monitor after this much inactivity.
pub const IDLE_TIMEOUT_MS: u32 = 30_000;

/// Pause at the end of every Monitor iteration.
pub const MONITOR_LOOP_DELAY: u32 = 100;

/// Cooldown after UP/DOWN in the menu.
pub const MENU_BUTTON_DELAY: u32 = 200;

/// Cooldown after UP/DOWN while editing a threshold.
pub const EDIT_BUTTON_DELAY: u32 = 150;

/// Pause before acting on OK in the menu.
pub const MENU_SELECT_DELAY: u32 = 150;

/// Pause before acting on OK in a config screen.
pub const EDIT_SELECT_DELAY: u32 = 100;

/// Poll period while waiting for OK to be released.
pub const RELEASE_POLL_DELAY: u32 = 10;

/// How long a notification overlay stays up.
pub const NOTIFY_DURATION_MS: u32 = 1000;

/// How long the logo stays up when entering the menu.
pub const TRANSITION_DURATION_MS: u32 = 1000;

/// Step between frames of the sleep animation.
pub const SLEEP_FRAME_DELAY: u32 = 10;

/// Splash screen time after a clean boot.
pub const SPLASH_DURATION_MS: u32 = 2000;

/// Splash screen time when some hardware failed to initialise.
pub const SPLASH_ERROR_DURATION_MS: u32 = 3000;

const _: () = assert!(BLINK_INTERVAL_MS < LONG_PRESS_MS);
const _: () = assert!(LONG_PRESS_MS < IDLE_TIMEOUT_MS);
const _: () = assert!(EDIT_BUTTON_DELAY <= MENU_BUTTON_DELAY);

// =============================================================================
// Thresholds
// =============================================================================

pub const DEFAULT_TEMP_MAX: f32 = 28.0;
pub const DEFAULT_HUM_MAX: f32 = 70.0;

/// Amount one UP/DOWN press moves a threshold.
pub const THRESHOLD_STEP: f32 = 0.5;

// =============================================================================
// Log files
// =============================================================================

/// First index tried when allocating `/data_NNN.csv`.
pub const FIRST_FILE_INDEX: u16 = 1;

/// Highest index that still fits the three-digit file name.
pub const LAST_FILE_INDEX: u16 = 999;

const _: () = assert!(FIRST_FILE_INDEX <= LAST_FILE_INDEX);

pub const CSV_HEADER: &str = "Fecha,Hora,Temp_C,Hum_%,Pres_hPa,Nota";

// =============================================================================
// Layout
// =============================================================================

pub const SCREEN_WIDTH: u32 = 240;
pub const SCREEN_HEIGHT: u32 = 135;

/// Height of the status bar; the divider line sits on this row.
pub const HUD_HEIGHT: u32 = 20;

/// Top of the Monitor content region.
pub const CONTENT_TOP: i32 = 30;

pub const MENU_ROWS: u8 = 3;
pub const MENU_FIRST_ROW_Y: i32 = 50;
pub const MENU_ROW_GAP: i32 = 30;

const _: () = assert!(HUD_HEIGHT as i32 <= CONTENT_TOP);
