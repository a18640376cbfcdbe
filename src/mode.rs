//! Top-level state machine: adjustment mode, current colour, animation.
//!
//! Double-clicks cycle the adjustment mode:
//!
//! ```text
//! NoInput ──► Hue ──► Saturation ──► Brightness ──┐
//!    ▲                                            │ (save last colour)
//!    └────────────────────────────────────────────┘
//! ```
//!
//! While a mode other than `NoInput` is active and a confirmed single click
//! is held down, every scheduling tick moves the matching HSV component one
//! step along its ping-pong oscillator.

use crate::color::{Color, Hsv, Rgb};
use crate::config::{HSV_STEP, HUE_MAX, PERCENT_MAX};
use crate::gesture::{Gesture, GestureDetector, TimerId, Timers};
use crate::led::{write_rgb, Indicator, IndicatorPattern, LedChannel, LedOutput};
use crate::oscillator::Oscillator;
use crate::persistence::PersistenceGateway;

/// Which colour component the button currently adjusts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AdjustmentMode {
    #[default]
    NoInput,
    Hue,
    Saturation,
    Brightness,
}

impl AdjustmentMode {
    /// Next mode in the cycle; `Brightness` wraps to `NoInput`.
    pub fn next(self) -> Self {
        match self {
            AdjustmentMode::NoInput => AdjustmentMode::Hue,
            AdjustmentMode::Hue => AdjustmentMode::Saturation,
            AdjustmentMode::Saturation => AdjustmentMode::Brightness,
            AdjustmentMode::Brightness => AdjustmentMode::NoInput,
        }
    }

    /// Indicator pattern shown while this mode is active.
    pub fn indicator(self) -> IndicatorPattern {
        match self {
            AdjustmentMode::NoInput => IndicatorPattern::ConstOff,
            AdjustmentMode::Hue => IndicatorPattern::BlinkSlow,
            AdjustmentMode::Saturation => IndicatorPattern::BlinkFast,
            AdjustmentMode::Brightness => IndicatorPattern::ConstOn,
        }
    }
}

pub struct ModeController {
    mode: AdjustmentMode,
    color: Color,
    gesture: GestureDetector,
    hue: Oscillator,
    saturation: Oscillator,
    brightness: Oscillator,
    indicator: Indicator,
}

impl ModeController {
    pub fn new(color: Color) -> Self {
        let hsv = color.hsv();
        Self {
            mode: AdjustmentMode::NoInput,
            color,
            gesture: GestureDetector::new(),
            hue: Oscillator::new(hsv.hue, 0, HUE_MAX, HSV_STEP),
            saturation: Oscillator::new(hsv.saturation as u16, 0, PERCENT_MAX as u16, HSV_STEP),
            brightness: Oscillator::new(hsv.value as u16, 0, PERCENT_MAX as u16, HSV_STEP),
            indicator: Indicator::new(),
        }
    }

    pub fn mode(&self) -> AdjustmentMode {
        self.mode
    }

    pub fn color(&self) -> &Color {
        &self.color
    }

    pub fn indicator_pattern(&self) -> IndicatorPattern {
        self.indicator.pattern()
    }

    pub fn gesture(&self) -> &GestureDetector {
        &self.gesture
    }

    /// Take over the colour stored at the last mode-cycle wrap, if any.
    pub fn restore(&mut self, gateway: &mut impl PersistenceGateway) -> bool {
        match gateway.load_last_color() {
            Some(rgb) => {
                log_info!("Restored last color {}", rgb);
                self.set_rgb(rgb);
                true
            }
            None => {
                log_info!("No stored color, using default");
                false
            }
        }
    }

    /// Replace the colour, RGB authoritative.
    pub fn set_rgb(&mut self, rgb: Rgb) {
        self.color.set_rgb(rgb);
        self.sync_oscillators();
    }

    /// Replace the colour, HSV authoritative.
    pub fn set_hsv(&mut self, hsv: Hsv) {
        self.color.set_hsv(hsv);
        self.sync_oscillators();
    }

    fn sync_oscillators(&mut self) {
        let hsv = self.color.hsv();
        self.hue.set_value(hsv.hue);
        self.saturation.set_value(hsv.saturation as u16);
        self.brightness.set_value(hsv.value as u16);
    }

    /// Push the current colour to the RGB channels.
    pub fn refresh(&self, out: &mut impl LedOutput) {
        write_rgb(out, self.color.rgb());
    }

    /// Raw press edge from the button.
    pub fn on_press_edge(&mut self, timers: &mut impl Timers) {
        self.gesture.on_press_edge(timers);
    }

    /// A gesture timer fired. Double-clicks advance the mode.
    pub fn on_timer_expired(
        &mut self,
        id: TimerId,
        timers: &mut impl Timers,
        gateway: &mut impl PersistenceGateway,
    ) -> Gesture {
        let gesture = self.gesture.on_timer_expired(id, timers);
        match gesture {
            Gesture::DoubleClick => {
                self.on_double_click(gateway);
            }
            Gesture::SingleClick => log_debug!("Single click"),
            Gesture::None => {}
        }
        gesture
    }

    /// Advance to the next adjustment mode.
    ///
    /// Wrapping back to `NoInput` stores the current colour; a storage
    /// failure is logged and the cycle carries on.
    pub fn on_double_click(&mut self, gateway: &mut impl PersistenceGateway) -> AdjustmentMode {
        let previous = self.mode;
        self.mode = previous.next();
        self.indicator.set_pattern(self.mode.indicator());
        log_info!("Mode: {} -> {}", previous, self.mode);

        if self.mode == AdjustmentMode::NoInput {
            let rgb = self.color.rgb();
            match gateway.save_last_color(rgb) {
                Ok(()) => log_info!("Saved last color {}", rgb),
                Err(e) => log_error!("Saving last color failed: {}", e),
            }
        }
        self.mode
    }

    /// Periodic animation step.
    ///
    /// `pressed` is the current button level.
    pub fn on_scheduling_tick(&mut self, pressed: bool, out: &mut impl LedOutput) {
        out.set_duty(LedChannel::Indicator, self.indicator.tick());

        if self.mode == AdjustmentMode::NoInput || !pressed || !self.gesture.single_confirmed() {
            return;
        }

        let mut hsv = self.color.hsv();
        match self.mode {
            AdjustmentMode::Hue => hsv.hue = self.hue.tick(),
            AdjustmentMode::Saturation => hsv.saturation = self.saturation.tick() as u8,
            AdjustmentMode::Brightness => hsv.value = self.brightness.tick() as u8,
            AdjustmentMode::NoInput => return,
        }
        self.color.set_hsv(hsv);
        write_rgb(out, self.color.rgb());
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(Color::default())
    }
}
