//! Application-wide constants and compile-time configuration.
//!
//! All pin assignments, timing parameters, colour defaults and storage
//! layout live here so they can be tuned in one place.

// Timing

/// Period of the scheduling tick that drives LED animation (ms).
pub const TICK_MS: u64 = 10;

/// Delay between a raw press edge and trusting it as a click (ms).
pub const DEBOUNCE_MS: u32 = 50;

/// Window after a first click in which a second click makes a double-click (ms).
///
/// Earlier board revisions used 500 ms; 300 ms feels snappier when holding
/// the button right after the first click.
pub const DOUBLE_CLICK_MS: u32 = 300;

// PWM

/// PWM counter top value; every duty written to the LEDs is clamped to it.
pub const PWM_TOP: u16 = 255;

/// Brightest duty the indicator LED reaches (90 % of top).
pub const INDICATOR_MAX_DUTY: u16 = PWM_TOP * 9 / 10;

/// Indicator duty step per tick while blinking slowly (hue mode).
pub const INDICATOR_SLOW_STEP: u16 = 5;

/// Indicator duty step per tick while blinking fast (saturation mode).
pub const INDICATOR_FAST_STEP: u16 = 20;

// Colour adjustment

/// Hue / saturation / brightness change per tick while the button is held.
pub const HSV_STEP: u16 = 1;

/// Upper bound of hue (degrees, inclusive).
pub const HUE_MAX: u16 = 360;

/// Upper bound of saturation and value (percent, inclusive).
pub const PERCENT_MAX: u8 = 100;

/// Colour shown on first boot (nothing stored yet): hue, saturation, value.
pub const DEFAULT_HSV: (u16, u8, u8) = (63, 100, 100);

// GPIO pin assignments (nRF52840 Dongle, PCA10059)
//
// These are logical names; the actual `embassy_nrf::peripherals::*` are
// picked in `main.rs`.
//
//   SW1         → P1.06 (active low, internal pull-up)
//   LED1        → P0.06 (active low)
//   LED2 red    → P0.08 (active low)
//   LED2 green  → P1.09 (active low)
//   LED2 blue   → P0.12 (active low)

/// The Dongle LEDs sink current: a low pin lights them.
pub const LEDS_ACTIVE_LOW: bool = true;

// Saved colours

/// Maximum number of named colours kept in flash.
pub const MAX_SAVED_COLORS: usize = 10;

/// Maximum colour-name length in bytes.
pub const COLOR_NAME_MAX_LEN: usize = 31;

/// Flash page index where colour storage starts (4 KB pages).
///
/// Pages 220..224 sit right below the Open USB bootloader at 0xE0000.
pub const STORAGE_FLASH_PAGE_START: u32 = 220;

/// Number of flash pages reserved for colour storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;

// USB

/// USB VID/PID - "pid.codes" open-source test VID.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "hsv-picker";
pub const USB_PRODUCT: &str = "HSV Picker CLI";
pub const USB_SERIAL_NUMBER: &str = "4163";

/// CDC-ACM bulk endpoint packet size.
pub const USB_PACKET_SIZE: u16 = 64;

// Command line

/// Longest accepted command line (bytes, without terminator).
pub const CLI_LINE_MAX: usize = 64;

/// Capacity of one formatted reply.
pub const CLI_REPLY_MAX: usize = 768;
