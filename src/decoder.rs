//! Word decoder and handshake engine.
//!
//! Classifies each word as a handshake frame, a live reading, a db record,
//! or an error. The only state is the last in-range month, used to patch the
//! occasional out-of-range month byte the CM160 firmware sends.
//!
//! # Example
//!
//! ```
//! use owl_cm160::decoder::{WordDecoder, WordEvent};
//! use owl_cm160::protocol::{build_word, ID_FRAME, LIVE_CODE};
//!
//! let mut decoder = WordDecoder::new();
//!
//! assert!(matches!(decoder.classify(&ID_FRAME), WordEvent::Ack { byte: 0x5A, .. }));
//!
//! let word = build_word([LIVE_CODE, 24, 3, 15, 12, 30, 0, 0, 100, 0]);
//! match decoder.classify(&word) {
//!     WordEvent::Live(record) => assert_eq!(record.month, 3),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

use crate::error::WordError;
use crate::protocol::{
    checksum, is_valid_month, EnergyRecord, FrameCode, WordBuffer, WordType, CHECKSUM_OFFSET,
    WORD_LENGTH,
};

/// Outcome of classifying one word.
#[derive(Debug, Clone, PartialEq)]
pub enum WordEvent {
    /// Handshake frame; `byte` must be written back to the device.
    Ack { frame: FrameCode, byte: u8 },
    /// Live reading.
    Live(EnergyRecord),
    /// Stored record.
    Db(EnergyRecord),
    /// Word rejected; nothing emitted.
    Error(WordError),
}

impl WordEvent {
    /// The decoded record, if any.
    pub fn record(&self) -> Option<&EnergyRecord> {
        match self {
            WordEvent::Live(record) | WordEvent::Db(record) => Some(record),
            _ => None,
        }
    }

    /// Acknowledgement byte to write, if any.
    pub fn ack_byte(&self) -> Option<u8> {
        match self {
            WordEvent::Ack { byte, .. } => Some(*byte),
            _ => None,
        }
    }
}

/// Per-connection decoder state.
///
/// One instance per device connection; instances never share state.
#[derive(Debug, Default)]
pub struct WordDecoder {
    last_valid_month: u8,
}

impl WordDecoder {
    /// Create a decoder with no month seen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent in-range month, 0 if none seen yet.
    pub fn last_valid_month(&self) -> u8 {
        self.last_valid_month
    }

    /// Classify a single word.
    pub fn classify(&mut self, word: &[u8; WORD_LENGTH]) -> WordEvent {
        if let Some(frame) = FrameCode::match_word(word) {
            tracing::debug!("Handshake frame {:?}, acknowledging", frame);
            return WordEvent::Ack {
                frame,
                byte: frame.ack_byte(),
            };
        }

        match self.decode_data_word(word) {
            Ok(record) => {
                if record.is_live_data {
                    tracing::info!("live data received");
                    WordEvent::Live(record)
                } else {
                    tracing::info!("db record received");
                    WordEvent::Db(record)
                }
            }
            Err(err) => WordEvent::Error(err),
        }
    }

    /// Validate and decode a data word, applying the month correction.
    pub fn decode_data_word(
        &mut self,
        word: &[u8; WORD_LENGTH],
    ) -> Result<EnergyRecord, WordError> {
        if WordType::from_byte(word[0]).is_none() {
            tracing::error!("Word error: invalid ID {}", word[0]);
            for (i, byte) in word.iter().enumerate() {
                tracing::debug!("byte {} - {}", i, byte);
            }
            return Err(WordError::InvalidWordType {
                type_byte: word[0],
                word: *word,
            });
        }

        let computed = checksum(word);
        let expected = word[CHECKSUM_OFFSET];
        if computed != expected {
            tracing::warn!(
                "Word error: invalid checksum: expected {}, got {}",
                expected,
                computed
            );
            return Err(WordError::ChecksumMismatch { expected, computed });
        }

        let mut record = EnergyRecord::decode(word);
        if is_valid_month(record.month) {
            self.last_valid_month = record.month;
        } else {
            tracing::debug!(
                "Month byte {} out of range, using {}",
                record.month,
                self.last_valid_month
            );
            record.month = self.last_valid_month;
        }

        Ok(record)
    }

    /// Demultiplex a chunk and classify every complete word, in order.
    pub fn process_chunk(&mut self, buffer: &mut WordBuffer, chunk: &[u8]) -> Vec<WordEvent> {
        buffer
            .push(chunk)
            .iter()
            .map(|word| self.classify(word))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{build_word, DB_CODE, ID_FRAME, LIVE_CODE, WAIT_FRAME};

    fn data_word(kind: u8, month: u8) -> [u8; WORD_LENGTH] {
        build_word([kind, 24, month, 15, 12, 30, 0x2C, 0x01, 100, 0])
    }

    #[test]
    fn test_id_frame_acknowledged() {
        let mut decoder = WordDecoder::new();
        let event = decoder.classify(&ID_FRAME);

        assert_eq!(
            event,
            WordEvent::Ack {
                frame: FrameCode::Id,
                byte: 0x5A
            }
        );
        assert_eq!(event.ack_byte(), Some(0x5A));
        assert!(event.record().is_none());
    }

    #[test]
    fn test_wait_frame_acknowledged() {
        let mut decoder = WordDecoder::new();
        let event = decoder.classify(&WAIT_FRAME);

        assert_eq!(event.ack_byte(), Some(0xA5));
        assert!(matches!(
            event,
            WordEvent::Ack {
                frame: FrameCode::Wait,
                ..
            }
        ));
    }

    #[test]
    fn test_live_word() {
        let mut decoder = WordDecoder::new();

        match decoder.classify(&data_word(LIVE_CODE, 3)) {
            WordEvent::Live(record) => {
                assert_eq!(record.year, 2024);
                assert_eq!(record.month, 3);
                assert_eq!(record.cost, 3.0);
                assert!(record.is_live_data);
            }
            other => panic!("expected live record, got {:?}", other),
        }
        assert_eq!(decoder.last_valid_month(), 3);
    }

    #[test]
    fn test_db_word() {
        let mut decoder = WordDecoder::new();

        match decoder.classify(&data_word(DB_CODE, 11)) {
            WordEvent::Db(record) => {
                assert_eq!(record.month, 11);
                assert!(!record.is_live_data);
            }
            other => panic!("expected db record, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_type_byte() {
        let mut decoder = WordDecoder::new();
        decoder.classify(&data_word(LIVE_CODE, 5));

        let word = build_word([0x00, 24, 7, 15, 12, 30, 0, 0, 100, 0]);
        let event = decoder.classify(&word);

        assert_eq!(
            event,
            WordEvent::Error(WordError::InvalidWordType {
                type_byte: 0x00,
                word
            })
        );
        assert_eq!(decoder.last_valid_month(), 5);
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut decoder = WordDecoder::new();
        decoder.classify(&data_word(LIVE_CODE, 5));

        let mut word = data_word(LIVE_CODE, 8);
        let good = word[CHECKSUM_OFFSET];
        word[CHECKSUM_OFFSET] = good.wrapping_add(1);

        let event = decoder.classify(&word);
        assert_eq!(
            event,
            WordEvent::Error(WordError::ChecksumMismatch {
                expected: good.wrapping_add(1),
                computed: good,
            })
        );
        assert!(event.record().is_none());
        assert_eq!(decoder.last_valid_month(), 5);
    }

    #[test]
    fn test_out_of_range_month_before_any_valid() {
        let mut decoder = WordDecoder::new();

        let record = decoder.decode_data_word(&data_word(LIVE_CODE, 13)).unwrap();
        assert_eq!(record.month, 0);
        assert_eq!(decoder.last_valid_month(), 0);
    }

    #[test]
    fn test_out_of_range_month_carried_forward() {
        let mut decoder = WordDecoder::new();

        decoder.decode_data_word(&data_word(DB_CODE, 9)).unwrap();
        let record = decoder.decode_data_word(&data_word(DB_CODE, 0xC8)).unwrap();

        assert_eq!(record.month, 9);
        assert_eq!(decoder.last_valid_month(), 9);

        let record = decoder.decode_data_word(&data_word(LIVE_CODE, 10)).unwrap();
        assert_eq!(record.month, 10);
        assert_eq!(decoder.last_valid_month(), 10);
    }

    #[test]
    fn test_month_always_in_range() {
        let mut decoder = WordDecoder::new();

        for month in 0..=u8::MAX {
            let record = decoder.decode_data_word(&data_word(LIVE_CODE, month)).unwrap();
            assert!(record.month <= 12, "month {} decoded as {}", month, record.month);
        }
        assert_eq!(decoder.last_valid_month(), 12);
    }

    #[test]
    fn test_process_chunk_in_order() {
        let mut decoder = WordDecoder::new();
        let mut buffer = WordBuffer::new();

        let mut bad = data_word(LIVE_CODE, 4);
        bad[CHECKSUM_OFFSET] ^= 0xFF;

        let mut chunk = Vec::new();
        chunk.extend_from_slice(&ID_FRAME);
        chunk.extend_from_slice(&bad);
        chunk.extend_from_slice(&data_word(LIVE_CODE, 4));
        chunk.extend_from_slice(&WAIT_FRAME);
        chunk.extend_from_slice(&data_word(DB_CODE, 2));
        chunk.extend_from_slice(&[0x59, 0x18, 0x03]);

        let events = decoder.process_chunk(&mut buffer, &chunk);

        assert_eq!(events.len(), 5);
        assert_eq!(events[0].ack_byte(), Some(0x5A));
        assert!(matches!(
            events[1],
            WordEvent::Error(WordError::ChecksumMismatch { .. })
        ));
        assert!(matches!(events[2], WordEvent::Live(_)));
        assert_eq!(events[3].ack_byte(), Some(0xA5));
        assert!(matches!(events[4], WordEvent::Db(_)));
        assert_eq!(decoder.last_valid_month(), 2);
    }

    #[test]
    fn test_independent_decoders() {
        let mut a = WordDecoder::new();
        let mut b = WordDecoder::new();

        a.classify(&data_word(LIVE_CODE, 6));
        assert_eq!(a.last_valid_month(), 6);
        assert_eq!(b.last_valid_month(), 0);

        let record = b.decode_data_word(&data_word(LIVE_CODE, 99)).unwrap();
        assert_eq!(record.month, 0);
    }
}
