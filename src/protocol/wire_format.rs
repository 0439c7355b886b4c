//! Wire format constants and word-level helpers.
//!
//! Every unit on the wire is an 11-byte word. A data word looks like:
//! ```text
//! ┌──────┬──────┬───────┬─────┬──────┬─────┬──────────┬──────────┬──────────┐
//! │ Type │ Year │ Month │ Day │ Hour │ Min │ Cost     │ Amps     │ Checksum │
//! │ 1 B  │ 1 B  │ 1 B   │ 1 B │ 1 B  │ 1 B │ uint16 LE│ uint16 LE│ 1 B      │
//! └──────┴──────┴───────┴─────┴──────┴─────┴──────────┴──────────┴──────────┘
//! ```
//!
//! Handshake frames (`ID`, `WAIT`) are fixed 11-byte sequences compared
//! byte for byte. All multi-byte integers are Little Endian.

/// Word size in bytes (fixed, exactly 11).
pub const WORD_LENGTH: usize = 11;

/// Offset of the checksum byte within a word.
pub const CHECKSUM_OFFSET: usize = WORD_LENGTH - 1;

/// Type byte of a live reading.
pub const LIVE_CODE: u8 = 0x51;

/// Type byte of a stored (db) record.
pub const DB_CODE: u8 = 0x59;

/// Acknowledgement written in response to `ID`.
pub const ID_ACK: u8 = 0x5A;

/// Acknowledgement written in response to `WAIT`.
pub const WAIT_ACK: u8 = 0xA5;

/// `ID` handshake word: the device announces itself.
pub const ID_FRAME: [u8; WORD_LENGTH] = [
    0xA9, 0x49, 0x44, 0x54, 0x43, 0x4D, 0x56, 0x30, 0x30, 0x31, 0x01,
];

/// `WAIT` handshake word: the device asks for a delay before first data.
pub const WAIT_FRAME: [u8; WORD_LENGTH] = [
    0xA9, 0x49, 0x44, 0x54, 0x57, 0x41, 0x49, 0x54, 0x50, 0x43, 0x52,
];

/// Constants of the CM160 USB-serial bridge.
///
/// The decoder never talks to USB itself; these are here for whoever
/// configures the bridge.
pub mod device {
    /// OWL vendor id.
    pub const VENDOR_ID: u16 = 0x0FDE;
    /// CM160 product id.
    pub const PRODUCT_ID: u16 = 0xCA05;
    /// Serial line speed.
    pub const BAUD_RATE: u32 = 250_000;
    /// Bulk IN endpoint the bridge delivers data on.
    pub const IN_ENDPOINT: u8 = 0x82;
    /// Number of concurrent IN transfers kept in flight.
    pub const TRANSFERS: usize = 3;
}

/// Handshake frame recognised by exact byte comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameCode {
    /// Device identification.
    Id,
    /// Device requests a wait.
    Wait,
}

impl FrameCode {
    /// Raw bytes of this frame.
    #[inline]
    pub fn bytes(&self) -> &'static [u8; WORD_LENGTH] {
        match self {
            FrameCode::Id => &ID_FRAME,
            FrameCode::Wait => &WAIT_FRAME,
        }
    }

    /// Acknowledgement byte the device expects in return.
    #[inline]
    pub fn ack_byte(&self) -> u8 {
        match self {
            FrameCode::Id => ID_ACK,
            FrameCode::Wait => WAIT_ACK,
        }
    }

    /// Match a word against the known handshake frames.
    pub fn match_word(word: &[u8; WORD_LENGTH]) -> Option<Self> {
        if *word == ID_FRAME {
            Some(FrameCode::Id)
        } else if *word == WAIT_FRAME {
            Some(FrameCode::Wait)
        } else {
            None
        }
    }
}

/// Kind of data word, taken from its type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordType {
    /// Current real-time reading.
    Live,
    /// Historical record replayed from device memory.
    Db,
}

impl WordType {
    /// Parse a type byte. Returns `None` for anything but LIVE or DB.
    #[inline]
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            LIVE_CODE => Some(WordType::Live),
            DB_CODE => Some(WordType::Db),
            _ => None,
        }
    }

    /// Type byte for this kind.
    #[inline]
    pub fn code(&self) -> u8 {
        match self {
            WordType::Live => LIVE_CODE,
            WordType::Db => DB_CODE,
        }
    }
}

/// Sum of the first 10 bytes, modulo 256.
#[inline]
pub fn checksum(word: &[u8; WORD_LENGTH]) -> u8 {
    word[..CHECKSUM_OFFSET]
        .iter()
        .fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Build a word from its 10 leading bytes, appending the checksum.
///
/// # Example
///
/// ```
/// use owl_cm160::protocol::{build_word, checksum, LIVE_CODE};
///
/// let word = build_word([LIVE_CODE, 24, 3, 15, 12, 30, 0, 0, 100, 0]);
/// assert_eq!(word[10], checksum(&word));
/// ```
pub fn build_word(body: [u8; CHECKSUM_OFFSET]) -> [u8; WORD_LENGTH] {
    let mut word = [0u8; WORD_LENGTH];
    word[..CHECKSUM_OFFSET].copy_from_slice(&body);
    word[CHECKSUM_OFFSET] = checksum(&word);
    word
}
