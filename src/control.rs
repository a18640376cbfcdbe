//! The control task: sole owner of the colour state, the LEDs and flash.
//!
//! Four event sources are multiplexed onto one loop, so the mode controller
//! never needs a lock:
//!   - press edges from the button task
//!   - the 10 ms scheduling tick
//!   - the earliest armed gesture timer (debounce or double-click window)
//!   - command lines from the serial task

use core::sync::atomic::AtomicBool;

use defmt::{debug, warn};
use embassy_futures::select::{select4, Either4};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Receiver;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Ticker, Timer};
use heapless::String;
use hsv_picker::cli::handle_line;
use hsv_picker::config::{CLI_LINE_MAX, CLI_REPLY_MAX, TICK_MS};
use hsv_picker::gesture::{TimerId, Timers};
use hsv_picker::ModeController;

use crate::button::{is_pressed, PressEdge};
use crate::pwm_led::PwmLeds;
use crate::storage::{FlashGateway, InternalFlash};

pub type CliLine = String<CLI_LINE_MAX>;
pub type CliReply = String<CLI_REPLY_MAX>;

/// One-shot gesture timers as absolute deadlines.
#[derive(Default)]
struct Deadlines {
    debounce: Option<Instant>,
    window: Option<Instant>,
}

impl Deadlines {
    fn slot(&mut self, id: TimerId) -> &mut Option<Instant> {
        match id {
            TimerId::Debounce => &mut self.debounce,
            TimerId::DoubleClick => &mut self.window,
        }
    }

    /// The timer due first, if any is armed.
    fn next(&self) -> Option<(TimerId, Instant)> {
        match (self.debounce, self.window) {
            (Some(d), Some(w)) if w < d => Some((TimerId::DoubleClick, w)),
            (Some(d), _) => Some((TimerId::Debounce, d)),
            (None, Some(w)) => Some((TimerId::DoubleClick, w)),
            (None, None) => None,
        }
    }
}

impl Timers for Deadlines {
    fn start(&mut self, id: TimerId, after_ms: u32) {
        *self.slot(id) = Some(Instant::now() + Duration::from_millis(after_ms as u64));
    }

    fn stop(&mut self, id: TimerId) {
        *self.slot(id) = None;
    }
}

async fn expiry(next: Option<(TimerId, Instant)>) -> TimerId {
    match next {
        Some((id, at)) => {
            Timer::at(at).await;
            id
        }
        None => core::future::pending().await,
    }
}

#[embassy_executor::task]
pub async fn control_task(
    mut ctrl: ModeController,
    mut leds: PwmLeds,
    mut gateway: FlashGateway<InternalFlash>,
    edges: Receiver<'static, CriticalSectionRawMutex, PressEdge, 4>,
    held: &'static AtomicBool,
    requests: Receiver<'static, CriticalSectionRawMutex, CliLine, 1>,
    replies: &'static Signal<CriticalSectionRawMutex, CliReply>,
) -> ! {
    let mut deadlines = Deadlines::default();
    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));

    ctrl.refresh(&mut leds);

    loop {
        let next = deadlines.next();
        let event = select4(
            edges.receive(),
            ticker.next(),
            expiry(next),
            requests.receive(),
        )
        .await;

        match event {
            Either4::First(PressEdge) => ctrl.on_press_edge(&mut deadlines),
            Either4::Second(()) => ctrl.on_scheduling_tick(is_pressed(held), &mut leds),
            Either4::Third(id) => {
                *deadlines.slot(id) = None;
                let gesture = ctrl.on_timer_expired(id, &mut deadlines, &mut gateway);
                debug!("Timer {} expired: {}", id, gesture);
            }
            Either4::Fourth(line) => {
                let mut reply = CliReply::new();
                if handle_line(&line, &mut ctrl, &mut gateway, &mut reply).is_err() {
                    warn!("CLI reply truncated");
                }
                ctrl.refresh(&mut leds);
                replies.signal(reply);
            }
        }
    }
}
