//! Monitor builder and runtime loop.
//!
//! The [`MonitorBuilder`] configures framing and queue sizes. The [`Monitor`]
//! manages the lifecycle of one device connection:
//! 1. Spawn the acknowledgement writer on the write half
//! 2. Signal [`MonitorEvent::Ready`]
//! 3. Read chunks, split them into words, and classify each word
//! 4. Forward records and errors as [`MonitorEvent`]s
//!
//! The transport is anything implementing tokio's `AsyncRead` and
//! `AsyncWrite`. It must be full duplex: the read loop always has a read
//! outstanding while acknowledgements are written.
//!
//! # Example
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
//!         if let MonitorEvent::Live(record) = event {
//!             println!("{} W", record.watts);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::decoder::{WordDecoder, WordEvent};
use crate::error::{OwlError, Result, WordError};
use crate::protocol::{EnergyRecord, Framing, WordBuffer};
use crate::writer::{spawn_ack_writer, AckFailure, AckHandle, DEFAULT_ACK_CAPACITY};

/// Default read buffer size.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Notification from a running monitor.
#[derive(Debug)]
pub enum MonitorEvent {
    /// The transport is connected. Sent once, before anything else.
    Ready,
    /// Live reading.
    Live(EnergyRecord),
    /// Stored record.
    Db(EnergyRecord),
    /// A word was rejected and skipped.
    WordError(WordError),
    /// An acknowledgement could not be written.
    WriteFailed(AckFailure),
}

/// Monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// How chunk boundaries are treated.
    pub framing: Framing,
    /// Bytes requested per read.
    pub read_buffer_size: usize,
    /// Capacity of the event channel.
    pub event_capacity: usize,
    /// Capacity of the acknowledgement queue.
    pub ack_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            framing: Framing::PerChunk,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            ack_capacity: DEFAULT_ACK_CAPACITY,
        }
    }
}

/// Builder for configuring and starting a [`Monitor`].
#[derive(Debug, Clone, Default)]
pub struct MonitorBuilder {
    config: MonitorConfig,
}

impl MonitorBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how chunk boundaries are treated.
    ///
    /// Default: [`Framing::PerChunk`]
    pub fn framing(mut self, framing: Framing) -> Self {
        self.config.framing = framing;
        self
    }

    /// Set the read buffer size.
    ///
    /// Default: 4096
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.config.read_buffer_size = size;
        self
    }

    /// Set the event channel capacity.
    ///
    /// Default: 1024
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Set the acknowledgement queue capacity.
    ///
    /// Default: 16
    pub fn ack_capacity(mut self, capacity: usize) -> Self {
        self.config.ack_capacity = capacity;
        self
    }

    /// Configuration built so far.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Start on separate read and write halves.
    ///
    /// Must be called within a tokio runtime.
    pub fn start<R, W>(self, reader: R, writer: W) -> Monitor
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        Monitor::start(reader, writer, self.config)
    }

    /// Start on a single bidirectional stream.
    pub fn start_on<S>(self, stream: S) -> Monitor
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (reader, writer) = tokio::io::split(stream);
        self.start(reader, writer)
    }
}

/// A running monitor for one device connection.
pub struct Monitor {
    events: mpsc::Receiver<MonitorEvent>,
    read_task: JoinHandle<Result<()>>,
    _writer_task: JoinHandle<()>,
}

impl Monitor {
    /// Create a new monitor builder.
    pub fn builder() -> MonitorBuilder {
        MonitorBuilder::new()
    }

    /// Spawn the writer task and the read loop.
    pub fn start<R, W>(reader: R, writer: W, config: MonitorConfig) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (events_tx, events) = mpsc::channel(config.event_capacity.max(1));

        let failures_tx = events_tx.clone();
        let (ack, writer_task) = spawn_ack_writer(writer, config.ack_capacity, move |failure| {
            if failures_tx
                .try_send(MonitorEvent::WriteFailed(failure))
                .is_err()
            {
                tracing::warn!("Event channel unavailable, write failure not delivered");
            }
        });

        let read_task = tokio::spawn(async move {
            let result = read_loop(reader, ack, events_tx, config).await;
            if let Err(e) = &result {
                tracing::error!("Read loop error: {}", e);
            }
            result
        });

        Monitor {
            events,
            read_task,
            _writer_task: writer_task,
        }
    }

    /// Next event, or `None` once the transport has closed and every
    /// pending event has been delivered.
    pub async fn next_event(&mut self) -> Option<MonitorEvent> {
        self.events.recv().await
    }

    /// Discard remaining events and wait for the transport to close.
    ///
    /// Returns the read error, if the connection ended with one.
    pub async fn wait_for_shutdown(mut self) -> Result<()> {
        while self.events.recv().await.is_some() {}
        self.read_task.await?
    }
}

/// Main read loop - reads chunks and classifies their words.
async fn read_loop<R>(
    mut reader: R,
    ack: AckHandle,
    events: mpsc::Sender<MonitorEvent>,
    config: MonitorConfig,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = WordDecoder::new();
    let mut buffer = WordBuffer::with_framing(config.framing);
    let mut buf = vec![0u8; config.read_buffer_size.max(1)];

    tracing::info!("connected");
    if events.send(MonitorEvent::Ready).await.is_err() {
        return Ok(());
    }

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => return Ok(()),
            Ok(n) => n,
            Err(e) => return Err(OwlError::Io(e)),
        };

        for event in decoder.process_chunk(&mut buffer, &buf[..n]) {
            let out = match event {
                WordEvent::Ack { byte, .. } => match ack.try_send(byte) {
                    Ok(()) => continue,
                    Err(error) => {
                        tracing::error!("Error sending command {:#04x}: {}", byte, error);
                        MonitorEvent::WriteFailed(AckFailure { byte, error })
                    }
                },
                WordEvent::Live(record) => MonitorEvent::Live(record),
                WordEvent::Db(record) => MonitorEvent::Db(record),
                WordEvent::Error(err) => MonitorEvent::WordError(err),
            };

            if events.send(out).await.is_err() {
                // Nobody is listening any more
                return Ok(());
            }
        }
    }
}
