//! Transport helpers.
//!
//! The monitor works on any tokio `AsyncRead + AsyncWrite`. On Linux the
//! `cp210x` driver exposes the CM160 bridge as a tty device node, opened here
//! as a `serial2_tokio::SerialPort` at the device line speed. The port is a
//! full-duplex stream: an acknowledgement can be written while a read is
//! still pending, which the handshake depends on.
//!
//! # Example
//!
//! ```ignore
//! use owl_cm160::protocol::device;
//! use owl_cm160::transport::{open_tty, DEFAULT_TTY_PATH};
//!
//! let port = open_tty(DEFAULT_TTY_PATH, device::BAUD_RATE)?;
//! let monitor = owl_cm160::Monitor::builder().start_on(port);
//! ```

use std::path::Path;

pub use serial2_tokio::SerialPort;

use crate::error::Result;

/// Device node the bridge usually shows up as.
#[cfg(unix)]
pub const DEFAULT_TTY_PATH: &str = "/dev/ttyUSB0";
#[cfg(windows)]
pub const DEFAULT_TTY_PATH: &str = "COM3";

/// Open a serial device in raw mode (8N1, no flow control).
///
/// Must be called from within a tokio runtime.
pub fn open_tty<P: AsRef<Path>>(path: P, baud_rate: u32) -> Result<SerialPort> {
    let path = path.as_ref();
    let port = SerialPort::open(path, baud_rate)?;
    // Needed for windows, but should not hurt on Linux
    port.set_dtr(true)?;
    port.set_rts(true)?;
    tracing::debug!("Opened {} at {} baud", path.display(), baud_rate);
    Ok(port)
}
