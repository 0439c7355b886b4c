//! Stream demultiplexer: slices transport chunks into 11-byte words.
//!
//! The transport is expected to deliver whole words per read, so by default
//! every chunk is handled on its own:
//! - `L / 11` words are taken from the front of the chunk, in order
//! - the trailing `L % 11` bytes are dropped, no error
//!
//! A word that straddles two chunks is therefore lost. [`Framing::Reassemble`]
//! carries the trailing bytes over to the next chunk instead, using a
//! `bytes::BytesMut` accumulator.
//!
//! # Example
//!
//! ```
//! use owl_cm160::protocol::{WordBuffer, ID_FRAME};
//!
//! let mut buffer = WordBuffer::new();
//!
//! let mut chunk = ID_FRAME.to_vec();
//! chunk.extend_from_slice(&[0x51, 0x18]); // partial word, dropped
//!
//! let words = buffer.push(&chunk);
//! assert_eq!(words, vec![ID_FRAME]);
//! ```

use bytes::{Buf, BytesMut};

use super::wire_format::WORD_LENGTH;

/// How chunk boundaries are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Framing {
    /// Each chunk stands alone; trailing partial words are dropped.
    #[default]
    PerChunk,
    /// Trailing partial words are kept and completed by the next chunk.
    Reassemble,
}

/// Demultiplexer turning transport chunks into words.
#[derive(Debug)]
pub struct WordBuffer {
    framing: Framing,
    /// Partial word carried between chunks (`Reassemble` only).
    pending: BytesMut,
    /// Bytes dropped so far (`PerChunk` only).
    dropped: u64,
}

impl WordBuffer {
    /// Create a buffer with per-chunk framing.
    pub fn new() -> Self {
        Self::with_framing(Framing::PerChunk)
    }

    /// Create a buffer with the given framing.
    pub fn with_framing(framing: Framing) -> Self {
        Self {
            framing,
            pending: BytesMut::with_capacity(WORD_LENGTH),
            dropped: 0,
        }
    }

    /// Split a chunk into complete words, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<[u8; WORD_LENGTH]> {
        match self.framing {
            Framing::PerChunk => {
                let words: Vec<_> = split_words(chunk).collect();
                let remainder = chunk.len() % WORD_LENGTH;
                if remainder != 0 {
                    self.dropped += remainder as u64;
                    tracing::debug!(
                        "Dropping {} trailing bytes of a {} byte chunk",
                        remainder,
                        chunk.len()
                    );
                }
                words
            }
            Framing::Reassemble => {
                self.pending.extend_from_slice(chunk);

                let mut words = Vec::with_capacity(self.pending.len() / WORD_LENGTH);
                while self.pending.len() >= WORD_LENGTH {
                    let mut word = [0u8; WORD_LENGTH];
                    self.pending.copy_to_slice(&mut word);
                    words.push(word);
                }
                words
            }
        }
    }

    /// Framing in use.
    pub fn framing(&self) -> Framing {
        self.framing
    }

    /// Number of bytes held back for the next chunk.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Total bytes dropped as trailing partial words.
    pub fn dropped_bytes(&self) -> u64 {
        self.dropped
    }

    /// Discard any held-back bytes.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

impl Default for WordBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a single chunk into complete words, ignoring any trailing bytes.
pub fn split_words(chunk: &[u8]) -> impl Iterator<Item = [u8; WORD_LENGTH]> + '_ {
    chunk.chunks_exact(WORD_LENGTH).map(|slice| {
        let mut word = [0u8; WORD_LENGTH];
        word.copy_from_slice(slice);
        word
    })
}
