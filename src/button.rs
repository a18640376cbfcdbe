//! SW1 push button: GPIOTE edges and level tracking.
//!
//! The button is active-low with the internal pull-up. Every press edge is
//! queued for the control task, which runs the click classifier. The held
//! level is published through an atomic flag; it is the only state shared
//! between tasks.

use core::sync::atomic::{AtomicBool, Ordering};

use defmt::{debug, warn};
use embassy_nrf::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_time::{Duration, Timer};
use hsv_picker::config::DEBOUNCE_MS;
use hsv_picker::gesture::NextPress;

/// A raw press edge, no payload.
#[derive(Clone, Copy, defmt::Format)]
pub struct PressEdge;

/// Watch the button forever.
///
/// Waits for the falling edge (press), queues it, then waits for release.
/// The release is debounced so contact bounce cannot fake a new press; a
/// pin already low once the debounce ends counts as the next press.
#[embassy_executor::task]
pub async fn button_task(
    mut btn: Input<'static>,
    edges: Sender<'static, CriticalSectionRawMutex, PressEdge, 4>,
    held: &'static AtomicBool,
) -> ! {
    loop {
        match NextPress::after_release_debounce(btn.is_low()) {
            NextPress::WaitForEdge => btn.wait_for_falling_edge().await,
            NextPress::AlreadyDown => debug!("Button: pressed during release debounce"),
        }
        held.store(true, Ordering::Relaxed);
        debug!("Button: press edge");

        if edges.try_send(PressEdge).is_err() {
            warn!("Button: edge queue full, press dropped");
        }

        Timer::after(Duration::from_millis(DEBOUNCE_MS as u64)).await;
        btn.wait_for_high().await;
        held.store(false, Ordering::Relaxed);

        // Debounce release.
        Timer::after(Duration::from_millis(DEBOUNCE_MS as u64)).await;
    }
}

/// Reads the level published by [`button_task`].
pub fn is_pressed(held: &AtomicBool) -> bool {
    held.load(Ordering::Relaxed)
}
