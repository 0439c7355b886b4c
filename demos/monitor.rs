//! Monitor - print CM160 records as JSON lines.
//!
//! This example demonstrates:
//! - Opening the tty the USB-serial driver exposes for the CM160
//! - Starting a monitor with the builder pattern
//! - Encoding decoded records with `JsonCodec`
//!
//! # Running
//!
//! The port is opened at the CM160 line speed (250000 baud):
//!
//! ```sh
//! cargo run --example monitor -- /dev/ttyUSB0
//! ```

use std::io::Write;

use owl_cm160::codec::JsonCodec;
use owl_cm160::protocol::device;
use owl_cm160::transport::{open_tty, DEFAULT_TTY_PATH};
use owl_cm160::{Monitor, MonitorEvent};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_TTY_PATH.to_string());

    let port = open_tty(&path, device::BAUD_RATE)?;
    let mut monitor = Monitor::builder().start_on(port);

    let stdout = std::io::stdout();
    while let Some(event) = monitor.next_event().await {
        match event {
            MonitorEvent::Ready => eprintln!("connected to {}", path),
            MonitorEvent::Live(record) | MonitorEvent::Db(record) => {
                let line = JsonCodec::encode_line(&record)?;
                stdout.lock().write_all(line.as_bytes())?;
            }
            MonitorEvent::WordError(err) => eprintln!("{}", err),
            MonitorEvent::WriteFailed(failure) => {
                eprintln!("ack {:#04x} not sent: {}", failure.byte, failure.error)
            }
        }
    }

    monitor.wait_for_shutdown().await?;
    Ok(())
}
