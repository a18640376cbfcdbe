//! Serial side of the command line.
//!
//! Echoes typed characters, assembles lines, hands each complete line to the
//! control task and writes back whatever it answers. The command itself is
//! executed by the control task, which owns the colour state and flash.

use defmt::{info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Sender;
use embassy_sync::signal::Signal;
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::EndpointError;
use heapless::Vec;
use hsv_picker::cli::{write_error, LineBuffer};
use hsv_picker::config::{CLI_LINE_MAX, USB_PACKET_SIZE};
use hsv_picker::Error;

use super::UsbDriver;
use crate::control::{CliLine, CliReply};

const PACKET: usize = USB_PACKET_SIZE as usize;

const BANNER: &[u8] = b"\r\nhsv-picker ready, type 'help'\r\n";
const PROMPT: &[u8] = b"> ";

#[embassy_executor::task]
pub async fn cli_task(
    mut class: CdcAcmClass<'static, UsbDriver>,
    requests: Sender<'static, CriticalSectionRawMutex, CliLine, 1>,
    replies: &'static Signal<CriticalSectionRawMutex, CliReply>,
) -> ! {
    loop {
        class.wait_connection().await;
        info!("Serial terminal connected");
        if serve(&mut class, &requests, replies).await.is_err() {
            info!("Serial terminal disconnected");
        }
    }
}

async fn serve(
    class: &mut CdcAcmClass<'static, UsbDriver>,
    requests: &Sender<'static, CriticalSectionRawMutex, CliLine, 1>,
    replies: &'static Signal<CriticalSectionRawMutex, CliReply>,
) -> Result<(), EndpointError> {
    let mut packet = [0u8; PACKET];
    let mut line = LineBuffer::<CLI_LINE_MAX>::new();

    write_all(class, BANNER).await?;
    write_all(class, PROMPT).await?;

    loop {
        let n = class.read_packet(&mut packet).await?;
        write_all(class, &echo(&packet[..n])).await?;

        for &byte in &packet[..n] {
            match line.push(byte) {
                None => continue,
                Some(Ok(text)) => {
                    replies.reset();
                    requests.send(text).await;
                    let reply = replies.wait().await;
                    write_all(class, reply.as_bytes()).await?;
                }
                Some(Err(e)) => {
                    warn!("Serial line rejected: {}", e);
                    let mut reply = CliReply::new();
                    // A single error line always fits.
                    let _ = write_error(&Error::from(e), &mut reply);
                    write_all(class, reply.as_bytes()).await?;
                }
            }
            write_all(class, PROMPT).await?;
        }
    }
}

/// Terminal echo: CR becomes CRLF, backspace erases the cell.
fn echo(input: &[u8]) -> Vec<u8, { PACKET * 3 }> {
    let mut out = Vec::new();
    for &byte in input {
        let bytes: &[u8] = match byte {
            b'\r' | b'\n' => b"\r\n",
            0x08 | 0x7F => b"\x08 \x08",
            b' '..=b'~' => core::slice::from_ref(&byte),
            _ => &[],
        };
        // Capacity covers the worst case of three bytes per input byte.
        let _ = out.extend_from_slice(bytes);
    }
    out
}

/// Write a buffer as full-size packets, closing with a ZLP when the last
/// packet is exactly full.
async fn write_all(
    class: &mut CdcAcmClass<'static, UsbDriver>,
    data: &[u8],
) -> Result<(), EndpointError> {
    if data.is_empty() {
        return Ok(());
    }
    for chunk in data.chunks(PACKET) {
        class.write_packet(chunk).await?;
    }
    if data.len() % PACKET == 0 {
        class.write_packet(&[]).await?;
    }
    Ok(())
}
