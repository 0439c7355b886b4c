//! Dedicated writer task for acknowledgement bytes.
//!
//! Acknowledgements are fire-and-forget: the read loop enqueues a byte and
//! moves on to the next word without waiting for the write to complete.
//!
//! ```text
//! Read loop ─► mpsc::Sender<u8> ─► Writer Task ─► Transport
//!                                       │
//!                                       └─► failure callback
//! ```
//!
//! A failed write is handed to the failure callback and logged; the task
//! keeps serving later acknowledgements.

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{OwlError, Result};

/// Default acknowledgement queue capacity.
pub const DEFAULT_ACK_CAPACITY: usize = 16;

/// An acknowledgement that could not be written.
#[derive(Debug)]
pub struct AckFailure {
    /// The byte that was not delivered.
    pub byte: u8,
    /// Why.
    pub error: OwlError,
}

/// Handle for enqueueing acknowledgement bytes.
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct AckHandle {
    tx: mpsc::Sender<u8>,
}

impl AckHandle {
    /// Enqueue a byte without waiting.
    ///
    /// Returns `Err(AckQueueFull)` immediately if the queue is at capacity.
    pub fn try_send(&self, byte: u8) -> Result<()> {
        self.tx.try_send(byte).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => OwlError::AckQueueFull,
            mpsc::error::TrySendError::Closed(_) => OwlError::ConnectionClosed,
        })
    }
}

/// Spawn the writer task.
///
/// `on_failure` is called once per acknowledgement that could not be written.
/// The task ends when every [`AckHandle`] is dropped.
pub fn spawn_ack_writer<W, F>(
    writer: W,
    capacity: usize,
    on_failure: F,
) -> (AckHandle, JoinHandle<()>)
where
    W: AsyncWrite + Unpin + Send + 'static,
    F: FnMut(AckFailure) + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let task = tokio::spawn(writer_loop(rx, writer, on_failure));
    let handle = AckHandle { tx };

    (handle, task)
}

async fn writer_loop<W, F>(
    mut rx: mpsc::Receiver<u8>,
    mut writer: W,
    mut on_failure: F,
) where
    W: AsyncWrite + Unpin,
    F: FnMut(AckFailure),
{
    while let Some(byte) = rx.recv().await {
        if let Err(error) = write_ack(&mut writer, byte).await {
            tracing::error!("Error sending command {:#04x}: {}", byte, error);
            on_failure(AckFailure { byte, error });
        }
    }
}

async fn write_ack<W>(writer: &mut W, byte: u8) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&[byte]).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tokio::io::{duplex, AsyncReadExt};

    /// Writer that fails every write.
    struct BrokenWriter;

    impl AsyncWrite for BrokenWriter {
        fn poll_write(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &[u8],
        ) -> Poll<io::Result<usize>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")))
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn test_ack_bytes_written_in_order() {
        let (client, mut server) = duplex(64);
        let (handle, task) = spawn_ack_writer(client, DEFAULT_ACK_CAPACITY, |_| {});

        handle.try_send(0x5A).unwrap();
        handle.try_send(0xA5).unwrap();

        let mut buf = [0u8; 2];
        server.read_exact(&mut buf).await.unwrap();
        assert_eq!(buf, [0x5A, 0xA5]);

        drop(handle);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_failure_reported_and_task_continues() {
        let (failures_tx, mut failures_rx) = mpsc::unbounded_channel();
        let (handle, task) = spawn_ack_writer(BrokenWriter, DEFAULT_ACK_CAPACITY, move |f| {
            let _ = failures_tx.send(f);
        });

        handle.try_send(0x5A).unwrap();
        handle.try_send(0xA5).unwrap();

        let first = failures_rx.recv().await.unwrap();
        let second = failures_rx.recv().await.unwrap();
        assert_eq!(first.byte, 0x5A);
        assert_eq!(second.byte, 0xA5);
        assert!(matches!(first.error, OwlError::Io(_)));

        drop(handle);
        task.await.unwrap();
        assert!(failures_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_try_send_on_closed_writer() {
        let (client, _server) = duplex(64);
        let (handle, task) = spawn_ack_writer(client, 1, |_| {});
        task.abort();
        let _ = task.await;

        let result = handle.try_send(0x5A);
        assert!(matches!(result, Err(OwlError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_try_send_on_full_queue() {
        // Never read, so the first write parks the task and the queue fills
        let (client, _server) = duplex(1);
        let (handle, _task) = spawn_ack_writer(client, 1, |_| {});

        let mut results = Vec::new();
        for _ in 0..4 {
            results.push(handle.try_send(0x5A));
        }
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(OwlError::AckQueueFull))));
    }
}
