//! Integration tests for hsv-picker host-testable logic.
//!
//! A small bench drives the mode controller the way the control task does:
//! press edges, gesture timer expiries and the 10 ms tick, against a
//! simulated millisecond clock.

use hsv_picker::cli::{handle_line, LineBuffer};
use hsv_picker::config::{PWM_TOP, TICK_MS};
use hsv_picker::gesture::{TimerId, Timers};
use hsv_picker::led::{IndicatorPattern, LedChannel, LedOutput};
use hsv_picker::persistence::{MemoryGateway, PersistenceGateway};
use hsv_picker::{rgb_to_hsv, AdjustmentMode, Error, ModeController, Rgb, StorageError};

#[derive(Default)]
struct Clock {
    now: u32,
    debounce: Option<u32>,
    window: Option<u32>,
}

impl Timers for Clock {
    fn start(&mut self, id: TimerId, after_ms: u32) {
        let at = Some(self.now + after_ms);
        match id {
            TimerId::Debounce => self.debounce = at,
            TimerId::DoubleClick => self.window = at,
        }
    }

    fn stop(&mut self, id: TimerId) {
        match id {
            TimerId::Debounce => self.debounce = None,
            TimerId::DoubleClick => self.window = None,
        }
    }
}

#[derive(Default)]
struct Leds([u16; 4]);

impl LedOutput for Leds {
    fn set_duty(&mut self, channel: LedChannel, duty: u16) {
        self.0[channel.index()] = duty;
    }
}

struct Bench {
    ctrl: ModeController,
    clock: Clock,
    gateway: MemoryGateway,
    leds: Leds,
    pressed: bool,
}

impl Bench {
    fn new() -> Self {
        Self {
            ctrl: ModeController::default(),
            clock: Clock::default(),
            gateway: MemoryGateway::default(),
            leds: Leds::default(),
            pressed: false,
        }
    }

    fn press(&mut self) {
        self.pressed = true;
        self.ctrl.on_press_edge(&mut self.clock);
    }

    fn release(&mut self) {
        self.pressed = false;
    }

    /// Advance the clock one millisecond at a time, firing due timers and
    /// ticks in the same order the control task would.
    fn advance(&mut self, ms: u32) {
        for _ in 0..ms {
            self.clock.now += 1;
            for id in [TimerId::Debounce, TimerId::DoubleClick] {
                let due = match id {
                    TimerId::Debounce => self.clock.debounce,
                    TimerId::DoubleClick => self.clock.window,
                };
                if due.is_some_and(|at| at <= self.clock.now) {
                    self.clock.stop(id);
                    self.ctrl
                        .on_timer_expired(id, &mut self.clock, &mut self.gateway);
                }
            }
            if self.clock.now % TICK_MS as u32 == 0 {
                self.ctrl.on_scheduling_tick(self.pressed, &mut self.leds);
            }
        }
    }

    fn click(&mut self) {
        self.press();
        self.advance(80);
        self.release();
    }

    fn double_click(&mut self) {
        self.click();
        self.advance(40);
        self.click();
        // Let the window lapse so the next gesture starts clean.
        self.advance(400);
    }

    fn command(&mut self, line: &str) -> String {
        let mut reply = heapless::String::<768>::new();
        handle_line(line, &mut self.ctrl, &mut self.gateway, &mut reply).unwrap();
        self.ctrl.refresh(&mut self.leds);
        reply.as_str().to_owned()
    }
}

#[test]
fn double_clicks_cycle_modes_and_save_once_on_wrap() {
    let mut bench = Bench::new();
    let expected = [
        (AdjustmentMode::Hue, IndicatorPattern::BlinkSlow),
        (AdjustmentMode::Saturation, IndicatorPattern::BlinkFast),
        (AdjustmentMode::Brightness, IndicatorPattern::ConstOn),
        (AdjustmentMode::NoInput, IndicatorPattern::ConstOff),
    ];

    for (mode, pattern) in expected {
        bench.double_click();
        assert_eq!(bench.ctrl.mode(), mode);
        assert_eq!(bench.ctrl.indicator_pattern(), pattern);
    }

    assert_eq!(bench.gateway.last_color_saves, 1);
    assert_eq!(bench.gateway.last, Some(bench.ctrl.color().rgb()));
}

#[test]
fn slow_presses_are_single_clicks() {
    let mut bench = Bench::new();
    bench.click();
    bench.advance(600);
    bench.click();
    bench.advance(600);
    assert_eq!(bench.ctrl.mode(), AdjustmentMode::NoInput);
    assert!(bench.ctrl.gesture().single_confirmed());
}

#[test]
fn holding_after_single_click_sweeps_hue() {
    let mut bench = Bench::new();
    bench.double_click();
    assert_eq!(bench.ctrl.mode(), AdjustmentMode::Hue);
    let before = bench.ctrl.color().hsv();

    bench.press();
    bench.advance(1000);
    bench.release();

    let after = bench.ctrl.color().hsv();
    assert!(after.hue > before.hue, "hue {} -> {}", before.hue, after.hue);
    assert_eq!(after.saturation, before.saturation);
    assert_eq!(after.value, before.value);

    // Released: no further change.
    bench.advance(500);
    assert_eq!(bench.ctrl.color().hsv(), after);
}

#[test]
fn holding_in_no_input_mode_changes_nothing() {
    let mut bench = Bench::new();
    let before = *bench.ctrl.color();
    bench.press();
    bench.advance(1000);
    bench.release();
    assert_eq!(bench.ctrl.color().rgb(), before.rgb());
}

#[test]
fn indicator_blinks_in_hue_mode() {
    let mut bench = Bench::new();
    bench.double_click();
    let mut seen = Vec::new();
    for _ in 0..60 {
        bench.advance(TICK_MS as u32);
        seen.push(bench.leds.0[LedChannel::Indicator.index()]);
    }
    assert!(seen.iter().any(|&d| d > 0));
    assert!(seen.iter().all(|&d| d <= PWM_TOP));
}

#[test]
fn auto_save_failure_does_not_stall_the_cycle() {
    let mut bench = Bench::new();
    bench.gateway.fail_writes = Some(StorageError::Flash);
    for _ in 0..4 {
        bench.double_click();
    }
    assert_eq!(bench.ctrl.mode(), AdjustmentMode::NoInput);
    assert_eq!(bench.gateway.last_color_saves, 0);

    bench.double_click();
    assert_eq!(bench.ctrl.mode(), AdjustmentMode::Hue);
}

#[test]
fn restore_uses_last_saved_color() {
    let mut gateway = MemoryGateway::default();
    gateway.save_last_color(Rgb::new(1, 2, 3)).unwrap();

    let mut ctrl = ModeController::default();
    assert!(ctrl.restore(&mut gateway));
    assert_eq!(ctrl.color().rgb(), Rgb::new(1, 2, 3));

    let mut empty = MemoryGateway::default();
    let mut ctrl = ModeController::default();
    assert!(!ctrl.restore(&mut empty));
    assert_eq!(ctrl.color().rgb(), Rgb::new(242, 255, 0));
}

#[test]
fn cli_rgb_sets_color_and_leds() {
    let mut bench = Bench::new();
    let reply = bench.command("rgb 10 20 30");

    let hsv = rgb_to_hsv(Rgb::new(10, 20, 30));
    assert_eq!(bench.ctrl.color().rgb(), Rgb::new(10, 20, 30));
    assert_eq!(bench.ctrl.color().hsv(), hsv);
    assert_eq!(
        reply,
        format!(
            "OK rgb 10 20 30 hsv {} {} {}\r\n",
            hsv.hue, hsv.saturation, hsv.value
        )
    );
    assert_eq!(&bench.leds.0[1..], &[10, 20, 30]);
}

#[test]
fn cli_rejects_out_of_range_without_change() {
    let mut bench = Bench::new();
    let before = *bench.ctrl.color();
    let reply = bench.command("rgb 300 0 0");
    assert!(reply.starts_with("ERROR:"), "{reply}");
    assert_eq!(*bench.ctrl.color(), before);
}

#[test]
fn cli_long_name_never_reaches_storage() {
    let mut bench = Bench::new();
    // Any write would fail loudly with a storage error.
    bench.gateway.fail_writes = Some(StorageError::Full);
    let name = "n".repeat(32);
    let reply = bench.command(&format!("add_current_color {name}"));
    assert_eq!(reply, "ERROR: invalid input: name longer than 31 characters\r\n");
    assert!(bench.gateway.list_saved_colors().is_empty());
}

#[test]
fn cli_save_list_and_apply() {
    let mut bench = Bench::new();
    bench.command("rgb 255 0 0");
    assert!(bench.command("add_current_color red").starts_with("OK saved 'red'"));
    bench.command("hsv 120 100 100");
    assert!(bench.command("add_current_color green").starts_with("OK saved"));

    let list = bench.command("list_colors");
    assert!(list.contains("red: rgb 255 0 0"), "{list}");
    assert!(list.contains("green: rgb 0 255 0"), "{list}");

    let reply = bench.command("apply_color red");
    assert!(reply.starts_with("OK applied 'red' rgb 255 0 0"), "{reply}");
    assert_eq!(bench.ctrl.color().rgb(), Rgb::new(255, 0, 0));

    assert!(bench.command("apply_color blue").starts_with("ERROR:"));
    assert!(bench.command("add_current_color red").starts_with("ERROR:"));
}

#[test]
fn cli_save_with_unreadable_list_keeps_saved_colors() {
    let mut bench = Bench::new();
    bench.command("rgb 255 0 0");
    bench.command("add_current_color red");

    bench.gateway.fail_reads = Some(StorageError::Corrupted);
    let reply = bench.command("add_current_color other");
    assert_eq!(reply, "ERROR: storage failure: stored data corrupted\r\n");

    bench.gateway.fail_reads = None;
    let list = bench.command("list_colors");
    assert!(list.contains("red: rgb 255 0 0"), "{list}");
    assert!(!list.contains("other"), "{list}");
}

#[test]
fn serial_bytes_to_command() {
    let mut bench = Bench::new();
    let mut line = LineBuffer::<64>::new();
    let mut finished = None;
    for &byte in b"hsv 0 100 5\x08100\r" {
        if let Some(result) = line.push(byte) {
            finished = Some(result);
        }
    }
    let text = finished.unwrap().unwrap();
    assert_eq!(text.as_str(), "hsv 0 100 100");

    bench.command(&text);
    assert_eq!(bench.ctrl.color().rgb(), Rgb::new(255, 0, 0));
}

#[test]
fn overlong_serial_line_is_reported() {
    let mut line = LineBuffer::<8>::new();
    let mut result = None;
    for &byte in b"rgb 100 100 100\r" {
        if let Some(r) = line.push(byte) {
            result = Some(r);
        }
    }
    let err = Error::from(result.unwrap().unwrap_err());
    assert_eq!(err.to_string(), "invalid input: line too long");
}
