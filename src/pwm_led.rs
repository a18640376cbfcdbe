//! PWM0 driving LED1 and the RGB LED.
//!
//! Channel layout matches [`LedChannel::index`]:
//! 0 = LED1, 1 = red, 2 = green, 3 = blue.

use embassy_nrf::peripherals::PWM0;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use hsv_picker::config::{LEDS_ACTIVE_LOW, PWM_TOP};
use hsv_picker::led::{clamp_duty, LedChannel, LedOutput};

pub struct PwmLeds {
    pwm: SimplePwm<'static, PWM0>,
}

impl PwmLeds {
    /// Take over a 4-channel PWM: 500 kHz base clock, counter top `PWM_TOP`,
    /// every LED dark.
    pub fn new(mut pwm: SimplePwm<'static, PWM0>) -> Self {
        // 16 MHz / 32 = 500 kHz, ~1.96 kHz PWM period with top 255.
        pwm.set_prescaler(Prescaler::Div32);
        pwm.set_max_duty(PWM_TOP);

        let mut leds = Self { pwm };
        for channel in [
            LedChannel::Indicator,
            LedChannel::Red,
            LedChannel::Green,
            LedChannel::Blue,
        ] {
            leds.set_duty(channel, 0);
        }
        leds
    }
}

impl LedOutput for PwmLeds {
    fn set_duty(&mut self, channel: LedChannel, duty: u16) {
        let duty = clamp_duty(duty);
        // The dongle LEDs light while the pin is low.
        let raw = if LEDS_ACTIVE_LOW { PWM_TOP - duty } else { duty };
        self.pwm.set_duty(channel.index(), raw);
    }
}
