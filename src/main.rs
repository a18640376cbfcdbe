//! hsv-picker firmware for the nRF52840 Dongle (PCA10059).
//!
//! Task layout:
//!   - `button_task`: SW1 edges and held level
//!   - `control_task`: mode machine, LED PWM, gesture timers, flash
//!   - `usb_device_task`: USB stack
//!   - `cli_task`: USB serial line discipline
//!
//! Flash with the Nordic DFU bootloader (nrfutil) or probe-rs.

#![no_std]
#![no_main]

use core::sync::atomic::AtomicBool;

use defmt::info;
use embassy_embedded_hal::adapter::BlockingAsync;
use embassy_executor::Spawner;
use embassy_nrf::config::{Config, HfclkSource};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::nvmc::Nvmc;
use embassy_nrf::pwm::SimplePwm;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use hsv_picker::ModeController;
use {defmt_rtt as _, panic_probe as _};

mod button;
mod control;
mod pwm_led;
mod storage;
mod usb;

use button::{button_task, PressEdge};
use control::{control_task, CliLine, CliReply};
use pwm_led::PwmLeds;
use storage::FlashGateway;
use usb::cli::cli_task;
use usb::usb_device_task;

/// Button press edges, button task → control task.
static PRESS_EDGES: Channel<CriticalSectionRawMutex, PressEdge, 4> = Channel::new();

/// Current SW1 level, written by the button task only.
static BUTTON_HELD: AtomicBool = AtomicBool::new(false);

/// Command lines, serial task → control task.
static CLI_REQUESTS: Channel<CriticalSectionRawMutex, CliLine, 1> = Channel::new();

/// Formatted replies, control task → serial task.
static CLI_REPLIES: Signal<CriticalSectionRawMutex, CliReply> = Signal::new();

/// USB requires the external 32 MHz crystal.
fn configure_clock() -> Config {
    let mut config = Config::default();
    config.hfclk_source = HfclkSource::ExternalXtal;
    config
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("hsv-picker starting...");

    let p = embassy_nrf::init(configure_clock());

    // SW1, active low.
    let button = Input::new(p.P1_06, Pull::Up);

    // LED1, red, green, blue.
    let pwm = SimplePwm::new_4ch(p.PWM0, p.P0_06, p.P0_08, p.P1_09, p.P0_12);
    let leds = PwmLeds::new(pwm);

    let mut gateway = FlashGateway::new(BlockingAsync::new(Nvmc::new(p.NVMC)));
    let mut ctrl = ModeController::default();
    if !ctrl.restore(&mut gateway) {
        info!("Starting from the default color");
    }

    let usb = usb::init(p.USBD);

    spawner.must_spawn(button_task(button, PRESS_EDGES.sender(), &BUTTON_HELD));
    spawner.must_spawn(control_task(
        ctrl,
        leds,
        gateway,
        PRESS_EDGES.receiver(),
        &BUTTON_HELD,
        CLI_REQUESTS.receiver(),
        &CLI_REPLIES,
    ));
    spawner.must_spawn(usb_device_task(usb.device));
    spawner.must_spawn(cli_task(usb.class, CLI_REQUESTS.sender(), &CLI_REPLIES));

    info!("Ready!");
}
