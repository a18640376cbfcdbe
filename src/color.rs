//! RGB / HSV colour model.
//!
//! RGB channels are 8-bit. HSV uses integer degrees for hue (0..=360, where
//! 0 and 360 are both red) and integer percent for saturation and value.
//! Converting between the two is lossy at the integer boundaries; a
//! round-trip may move a channel by a few units.

use crate::config::{DEFAULT_HSV, HUE_MAX, PERCENT_MAX};
use crate::error::ValidationError;

/// 8-bit-per-channel RGB colour.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build from unvalidated numbers, e.g. parsed command arguments.
    pub fn try_from_parts(red: u32, green: u32, blue: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            red: channel(red)?,
            green: channel(green)?,
            blue: channel(blue)?,
        })
    }
}

fn channel(v: u32) -> Result<u8, ValidationError> {
    u8::try_from(v).map_err(|_| ValidationError::OutOfRange { max: u8::MAX as u16 })
}

/// HSV colour: hue in degrees, saturation and value in percent.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hsv {
    pub hue: u16,
    pub saturation: u8,
    pub value: u8,
}

impl Hsv {
    pub const fn new(hue: u16, saturation: u8, value: u8) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }

    /// Build from unvalidated numbers, e.g. parsed command arguments.
    pub fn try_from_parts(hue: u32, saturation: u32, value: u32) -> Result<Self, ValidationError> {
        Ok(Self {
            hue: bounded(hue, HUE_MAX)?,
            saturation: bounded(saturation, PERCENT_MAX as u16)? as u8,
            value: bounded(value, PERCENT_MAX as u16)? as u8,
        })
    }
}

fn bounded(v: u32, max: u16) -> Result<u16, ValidationError> {
    if v > max as u32 {
        return Err(ValidationError::OutOfRange { max });
    }
    Ok(v as u16)
}

/// Convert HSV to RGB.
///
/// Hue 360 (or anything above) wraps to the red sector; saturation and value
/// above 100 are treated as 100. Channels are truncated, not rounded.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let hue = hsv.hue % HUE_MAX;
    let s = hsv.saturation.min(PERCENT_MAX) as f32 / 100.0;
    let v = hsv.value.min(PERCENT_MAX) as f32 / 100.0;

    let h = hue as f32 / 60.0;
    let sector = h as u8;
    let f = h - sector as f32;

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb::new(scale(r), scale(g), scale(b))
}

/// `[0,1]` → `[0,255]`, truncating. The cast saturates, so float noise can
/// never wrap a channel.
fn scale(x: f32) -> u8 {
    (x * 255.0) as u8
}

/// Convert RGB to HSV using integer arithmetic only.
///
/// Black yields saturation 0 and greys yield hue 0; no path divides by zero.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let (r, g, b) = (rgb.red as i32, rgb.green as i32, rgb.blue as i32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let value = div_round(max * 100, 255) as u8;

    let saturation = if max == 0 {
        0
    } else {
        div_round(delta * 100, max) as u8
    };

    if delta == 0 {
        return Hsv::new(0, saturation, value);
    }

    let hue = if r == max {
        div_round(60 * (g - b), delta)
    } else if g == max {
        120 + div_round(60 * (b - r), delta)
    } else {
        240 + div_round(60 * (r - g), delta)
    };

    Hsv::new(((hue + 360) % 360) as u16, saturation, value)
}

/// Integer division rounding half away from zero. `d` must be positive.
fn div_round(n: i32, d: i32) -> i32 {
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

/// Which representation of a [`Color`] was set last and is exact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorSource {
    Rgb,
    Hsv,
}

/// A colour kept in both representations.
///
/// One side is authoritative; the other is re-derived every time the
/// authoritative side is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Color {
    rgb: Rgb,
    hsv: Hsv,
    source: ColorSource,
}

impl Color {
    pub fn from_rgb(rgb: Rgb) -> Self {
        Self {
            rgb,
            hsv: rgb_to_hsv(rgb),
            source: ColorSource::Rgb,
        }
    }

    pub fn from_hsv(hsv: Hsv) -> Self {
        Self {
            rgb: hsv_to_rgb(hsv),
            hsv,
            source: ColorSource::Hsv,
        }
    }

    pub fn set_rgb(&mut self, rgb: Rgb) {
        *self = Self::from_rgb(rgb);
    }

    pub fn set_hsv(&mut self, hsv: Hsv) {
        *self = Self::from_hsv(hsv);
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn hsv(&self) -> Hsv {
        self.hsv
    }

    pub fn source(&self) -> ColorSource {
        self.source
    }
}

impl Default for Color {
    fn default() -> Self {
        let (hue, saturation, value) = DEFAULT_HSV;
        Self::from_hsv(Hsv::new(hue, saturation, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_channel_error(a: Rgb, b: Rgb) -> u8 {
        a.red
            .abs_diff(b.red)
            .max(a.green.abs_diff(b.green))
            .max(a.blue.abs_diff(b.blue))
    }

    // ════════════════════════════════════════════════════════════════════════
    // HSV → RGB
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn hsv_primaries() {
        assert_eq!(hsv_to_rgb(Hsv::new(0, 100, 100)), Rgb::new(255, 0, 0));
        assert_eq!(hsv_to_rgb(Hsv::new(120, 100, 100)), Rgb::new(0, 255, 0));
        assert_eq!(hsv_to_rgb(Hsv::new(240, 100, 100)), Rgb::new(0, 0, 255));
    }

    #[test]
    fn hsv_360_wraps_to_red() {
        assert_eq!(
            hsv_to_rgb(Hsv::new(360, 100, 100)),
            hsv_to_rgb(Hsv::new(0, 100, 100))
        );
    }

    #[test]
    fn hsv_default_color_matches_boot_rgb() {
        assert_eq!(hsv_to_rgb(Hsv::new(63, 100, 100)), Rgb::new(242, 255, 0));
    }

    #[test]
    fn hsv_zero_saturation_is_grey() {
        assert_eq!(hsv_to_rgb(Hsv::new(0, 0, 100)), Rgb::new(255, 255, 255));
        assert_eq!(hsv_to_rgb(Hsv::new(200, 0, 0)), Rgb::BLACK);
    }

    #[test]
    fn hsv_mid_values_truncate() {
        assert_eq!(hsv_to_rgb(Hsv::new(200, 50, 50)), Rgb::new(63, 106, 127));
    }

    #[test]
    fn hsv_out_of_range_inputs_do_not_panic() {
        // 65535 % 360 = 15 degrees
        assert_eq!(
            hsv_to_rgb(Hsv::new(u16::MAX, u8::MAX, u8::MAX)),
            hsv_to_rgb(Hsv::new(15, 100, 100))
        );
        assert_eq!(hsv_to_rgb(Hsv::new(0, 200, 200)), Rgb::new(255, 0, 0));
    }

    #[test]
    fn hsv_full_domain_stays_in_range() {
        // The type bounds channels to 0..=255; this checks nothing panics and
        // that full value always lights at least one channel fully.
        for hue in 0..=360u16 {
            for saturation in (0..=100u8).step_by(5) {
                let rgb = hsv_to_rgb(Hsv::new(hue, saturation, 100));
                let max = rgb.red.max(rgb.green).max(rgb.blue);
                assert_eq!(max, 255, "h={} s={}", hue, saturation);
            }
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // RGB → HSV
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn rgb_black_is_all_zero() {
        assert_eq!(rgb_to_hsv(Rgb::BLACK), Hsv::new(0, 0, 0));
    }

    #[test]
    fn rgb_white_is_unsaturated_full_value() {
        let hsv = rgb_to_hsv(Rgb::new(255, 255, 255));
        assert_eq!(hsv.saturation, 0);
        assert_eq!(hsv.value, 100);
    }

    #[test]
    fn rgb_grey_rounds_value() {
        assert_eq!(rgb_to_hsv(Rgb::new(128, 128, 128)), Hsv::new(0, 0, 50));
        assert_eq!(rgb_to_hsv(Rgb::new(129, 129, 129)), Hsv::new(0, 0, 51));
    }

    #[test]
    fn rgb_hue_branches() {
        assert_eq!(rgb_to_hsv(Rgb::new(255, 0, 0)), Hsv::new(0, 100, 100));
        assert_eq!(rgb_to_hsv(Rgb::new(0, 255, 0)), Hsv::new(120, 100, 100));
        assert_eq!(rgb_to_hsv(Rgb::new(0, 0, 255)), Hsv::new(240, 100, 100));
        assert_eq!(rgb_to_hsv(Rgb::new(255, 255, 0)), Hsv::new(60, 100, 100));
        assert_eq!(rgb_to_hsv(Rgb::new(255, 0, 255)), Hsv::new(300, 100, 100));
        assert_eq!(rgb_to_hsv(Rgb::new(242, 255, 0)), Hsv::new(63, 100, 100));
    }

    #[test]
    fn rgb_dark_blue_grey() {
        assert_eq!(rgb_to_hsv(Rgb::new(10, 20, 30)), Hsv::new(210, 67, 12));
    }

    #[test]
    fn rgb_hue_never_reaches_360() {
        // Red-max with blue slightly above green gives a negative raw hue.
        let hsv = rgb_to_hsv(Rgb::new(255, 0, 1));
        assert!(hsv.hue < 360);
        assert_eq!(hsv.hue, 0);
        assert_eq!(rgb_to_hsv(Rgb::new(255, 0, 10)).hue, 358);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Round trip
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn rgb_round_trip_is_bounded() {
        // Integer-percent HSV cannot represent every RGB; across the whole
        // cube the worst channel error is 4.
        for r in (0..=255u8).step_by(3) {
            for g in (0..=255u8).step_by(3) {
                for b in (0..=255u8).step_by(3) {
                    let rgb = Rgb::new(r, g, b);
                    let back = hsv_to_rgb(rgb_to_hsv(rgb));
                    assert!(
                        max_channel_error(rgb, back) <= 4,
                        "{:?} -> {:?}",
                        rgb,
                        back
                    );
                }
            }
        }
    }

    #[test]
    fn rgb_round_trip_exact_for_saturated_primaries() {
        for rgb in [
            Rgb::new(255, 0, 0),
            Rgb::new(0, 255, 0),
            Rgb::new(0, 0, 255),
            Rgb::new(255, 255, 255),
            Rgb::BLACK,
        ] {
            assert_eq!(hsv_to_rgb(rgb_to_hsv(rgb)), rgb);
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Validation & Color
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn try_from_parts_bounds() {
        assert_eq!(Rgb::try_from_parts(1, 2, 3), Ok(Rgb::new(1, 2, 3)));
        assert_eq!(
            Rgb::try_from_parts(300, 0, 0),
            Err(ValidationError::OutOfRange { max: 255 })
        );
        assert_eq!(Hsv::try_from_parts(360, 100, 100), Ok(Hsv::new(360, 100, 100)));
        assert_eq!(
            Hsv::try_from_parts(361, 0, 0),
            Err(ValidationError::OutOfRange { max: 360 })
        );
        assert_eq!(
            Hsv::try_from_parts(0, 101, 0),
            Err(ValidationError::OutOfRange { max: 100 })
        );
    }

    #[test]
    fn color_tracks_authoritative_side() {
        let mut color = Color::from_rgb(Rgb::new(10, 20, 30));
        assert_eq!(color.source(), ColorSource::Rgb);
        assert_eq!(color.rgb(), Rgb::new(10, 20, 30));
        assert_eq!(color.hsv(), Hsv::new(210, 67, 12));

        color.set_hsv(Hsv::new(120, 100, 100));
        assert_eq!(color.source(), ColorSource::Hsv);
        assert_eq!(color.rgb(), Rgb::new(0, 255, 0));
    }

    #[test]
    fn color_default_is_boot_color() {
        let color = Color::default();
        assert_eq!(color.hsv(), Hsv::new(63, 100, 100));
        assert_eq!(color.rgb(), Rgb::new(242, 255, 0));
    }
}
