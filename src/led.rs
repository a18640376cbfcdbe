//! PWM output sink interface and the indicator LED blink driver.
//!
//! The core never touches PWM registers: it writes duty values through
//! [`LedOutput`], already clamped to [`PWM_TOP`].

use crate::color::Rgb;
use crate::config::{INDICATOR_FAST_STEP, INDICATOR_MAX_DUTY, INDICATOR_SLOW_STEP, PWM_TOP};
use crate::oscillator::Oscillator;

/// The four PWM channels of the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LedChannel {
    /// Single-colour indicator (LED1).
    Indicator,
    Red,
    Green,
    Blue,
}

impl LedChannel {
    /// Index of the channel on the 4-channel PWM peripheral.
    pub const fn index(self) -> usize {
        match self {
            LedChannel::Indicator => 0,
            LedChannel::Red => 1,
            LedChannel::Green => 2,
            LedChannel::Blue => 3,
        }
    }
}

/// Something that can set a PWM duty cycle.
pub trait LedOutput {
    /// `duty` is in `0..=PWM_TOP`, 0 = off.
    fn set_duty(&mut self, channel: LedChannel, duty: u16);
}

/// Push an RGB colour to the three colour channels.
pub fn write_rgb(out: &mut impl LedOutput, rgb: Rgb) {
    out.set_duty(LedChannel::Red, clamp_duty(rgb.red as u16));
    out.set_duty(LedChannel::Green, clamp_duty(rgb.green as u16));
    out.set_duty(LedChannel::Blue, clamp_duty(rgb.blue as u16));
}

pub fn clamp_duty(duty: u16) -> u16 {
    duty.min(PWM_TOP)
}

/// How the indicator LED shows the current adjustment mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorPattern {
    #[default]
    ConstOff,
    BlinkSlow,
    BlinkFast,
    ConstOn,
}

/// Indicator LED state: a pattern plus the duty oscillator used to blink.
#[derive(Clone, Copy, Debug)]
pub struct Indicator {
    pattern: IndicatorPattern,
    duty: Oscillator,
}

impl Indicator {
    pub const fn new() -> Self {
        Self {
            pattern: IndicatorPattern::ConstOff,
            duty: Oscillator::new(0, 0, INDICATOR_MAX_DUTY, INDICATOR_SLOW_STEP),
        }
    }

    pub fn pattern(&self) -> IndicatorPattern {
        self.pattern
    }

    /// Switch pattern. Blinking restarts from dark.
    pub fn set_pattern(&mut self, pattern: IndicatorPattern) {
        if pattern == self.pattern {
            return;
        }
        self.pattern = pattern;
        match pattern {
            IndicatorPattern::BlinkSlow => self.duty.set_step(INDICATOR_SLOW_STEP),
            IndicatorPattern::BlinkFast => self.duty.set_step(INDICATOR_FAST_STEP),
            IndicatorPattern::ConstOff | IndicatorPattern::ConstOn => {}
        }
        self.duty.reset();
    }

    /// Advance one tick and return the duty to output.
    pub fn tick(&mut self) -> u16 {
        match self.pattern {
            IndicatorPattern::ConstOff => 0,
            IndicatorPattern::ConstOn => INDICATOR_MAX_DUTY,
            IndicatorPattern::BlinkSlow | IndicatorPattern::BlinkFast => self.duty.tick(),
        }
    }
}

impl Default for Indicator {
    fn default() -> Self {
        Self::new()
    }
}
