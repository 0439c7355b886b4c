//! Protocol module - wire format, word framing, and record types.
//!
//! This module implements the CM160 serial protocol:
//! - 11-byte word constants, handshake frames, and checksum
//! - Word buffer for slicing transport chunks into words
//! - Energy usage record with the decoded fields

mod record;
mod wire_format;
mod word_buffer;

pub use record::{
    is_valid_month, round_to, EnergyRecord, AMPS_CALIBRATION, MAINS_VOLTAGE, MAX_MONTH, YEAR_BASE,
};
pub use wire_format::{
    build_word, checksum, device, FrameCode, WordType, CHECKSUM_OFFSET, DB_CODE, ID_ACK, ID_FRAME,
    LIVE_CODE, WAIT_ACK, WAIT_FRAME, WORD_LENGTH,
};
pub use word_buffer::{split_words, Framing, WordBuffer};
