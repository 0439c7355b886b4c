//! Error types for owl-cm160.

use thiserror::Error;

use crate::protocol::WORD_LENGTH;

/// Per-word decode failure.
///
/// These never abort a chunk: the offending word is skipped and decoding
/// continues with the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WordError {
    /// Type byte is neither LIVE (0x51) nor DB (0x59).
    #[error("Word error: invalid ID {type_byte}")]
    InvalidWordType {
        /// The offending type byte.
        type_byte: u8,
        /// The full word, for diagnostics.
        word: [u8; WORD_LENGTH],
    },

    /// Trailing checksum byte does not match the sum of the first 10 bytes.
    #[error("Word error: invalid checksum: expected {expected}, got {computed}")]
    ChecksumMismatch {
        /// Checksum carried by the word (byte 10).
        expected: u8,
        /// Checksum computed over bytes 0-9.
        computed: u8,
    },
}

/// Main error type for all owl-cm160 operations.
#[derive(Debug, Error)]
pub enum OwlError {
    /// I/O error on the serial transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// A word failed validation.
    #[error(transparent)]
    Word(#[from] WordError),

    /// Connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    /// Acknowledgement queue is full.
    #[error("Acknowledgement queue full")]
    AckQueueFull,

    /// A background task panicked or was cancelled.
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Result type alias using OwlError.
pub type Result<T> = std::result::Result<T, OwlError>;
