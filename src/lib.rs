//! # owl-cm160
//!
//! Decoder for the serial protocol of the OWL CM160 home energy monitor.
//!
//! The CM160 talks over a USB-serial bridge in fixed 11-byte words. This
//! crate turns the raw byte stream into [`EnergyRecord`]s and answers the
//! device's handshake frames.
//!
//! ## Architecture
//!
//! - **Word buffer** ([`protocol::WordBuffer`]): slices transport chunks into words
//! - **Word decoder** ([`decoder::WordDecoder`]): handshake, checksum, record decode, month correction
//! - **Monitor** ([`Monitor`]): async loop wiring a transport to the decoder
//!
//! USB enumeration belongs to the USB-serial driver; [`transport::open_tty`]
//! opens the resulting tty at the device line speed.
//!
//! ## Example
//!
//! ```ignore
//! use owl_cm160::{Monitor, MonitorEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let port = owl_cm160::transport::open_tty("/dev/ttyUSB0", 250_000)?;
//!     let mut monitor = Monitor::builder().start_on(port);
//!
//!     while let Some(event) = monitor.next_event().await {
//!         match event {
//!             MonitorEvent::Live(record) => println!("live: {} W", record.watts),
//!             MonitorEvent::Db(record) => println!("db: {} Wh", record.wh),
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod decoder;
pub mod error;
pub mod protocol;
pub mod transport;
pub mod writer;

mod monitor;

pub use decoder::{WordDecoder, WordEvent};
pub use error::{OwlError, WordError};
pub use monitor::{
    Monitor, MonitorBuilder, MonitorConfig, MonitorEvent, DEFAULT_EVENT_CAPACITY,
    DEFAULT_READ_BUFFER_SIZE,
};
pub use protocol::EnergyRecord;
