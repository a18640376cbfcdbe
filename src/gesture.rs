//! Click classifier: debounce + double-click window.
//!
//! The detector is a plain state machine. Timing is delegated to a
//! [`Timers`] service: the detector arms one-shot timers and the caller
//! feeds expiries back through [`GestureDetector::on_timer_expired`].
//!
//! ```text
//!  press edge ──► debounce (50 ms) ──► 1st click: awaiting, window (300 ms)
//!                                      2nd click: DoubleClick
//!  window expiry while awaiting ─────► SingleClick, single_confirmed = true
//! ```
//!
//! There is no triple click: a third press simply starts a new cycle.

use crate::config::{DEBOUNCE_MS, DOUBLE_CLICK_MS};

/// The two one-shot timers the detector uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    Debounce,
    DoubleClick,
}

/// One-shot timer service.
///
/// Starting a running timer re-arms it; stopping an idle one is a no-op.
pub trait Timers {
    fn start(&mut self, id: TimerId, after_ms: u32);
    fn stop(&mut self, id: TimerId);
}

/// Classified gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Gesture {
    None,
    SingleClick,
    DoubleClick,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GestureDetector {
    awaiting_second_click: bool,
    single_confirmed: bool,
}

impl GestureDetector {
    pub const fn new() -> Self {
        Self {
            awaiting_second_click: false,
            single_confirmed: false,
        }
    }

    /// Raw press edge from the button interrupt.
    pub fn on_press_edge(&mut self, timers: &mut impl Timers) {
        // A new press invalidates a click confirmed before it.
        self.single_confirmed = false;
        timers.start(TimerId::Debounce, DEBOUNCE_MS);
    }

    /// A timer armed by this detector fired.
    pub fn on_timer_expired(&mut self, id: TimerId, timers: &mut impl Timers) -> Gesture {
        match id {
            TimerId::Debounce => self.on_click_confirmed(timers),
            TimerId::DoubleClick => {
                if !self.awaiting_second_click {
                    return Gesture::None;
                }
                self.awaiting_second_click = false;
                self.single_confirmed = true;
                Gesture::SingleClick
            }
        }
    }

    fn on_click_confirmed(&mut self, timers: &mut impl Timers) -> Gesture {
        if self.awaiting_second_click {
            self.awaiting_second_click = false;
            timers.stop(TimerId::DoubleClick);
            Gesture::DoubleClick
        } else {
            self.awaiting_second_click = true;
            self.single_confirmed = false;
            timers.start(TimerId::DoubleClick, DOUBLE_CLICK_MS);
            Gesture::None
        }
    }

    pub fn awaiting_second_click(&self) -> bool {
        self.awaiting_second_click
    }

    /// Last press was a single click that is still held or recent.
    pub fn single_confirmed(&self) -> bool {
        self.single_confirmed
    }
}

/// How the button watcher picks up the next press once a release has been
/// debounced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NextPress {
    /// Pin is up: the press will arrive as a falling edge.
    WaitForEdge,
    /// Pin went down during the debounce; its edge is already gone.
    AlreadyDown,
}

impl NextPress {
    pub fn after_release_debounce(pressed: bool) -> Self {
        if pressed {
            NextPress::AlreadyDown
        } else {
            NextPress::WaitForEdge
        }
    }
}
