//! Energy usage record decoded from a data word.
//!
//! # Example
//!
//! ```
//! use owl_cm160::protocol::{build_word, EnergyRecord, LIVE_CODE};
//!
//! let word = build_word([LIVE_CODE, 24, 3, 15, 12, 30, 0, 0, 100, 0]);
//! let record = EnergyRecord::decode(&word);
//!
//! assert_eq!(record.year, 2024);
//! assert_eq!(record.amps, 7.0);
//! assert_eq!(record.watts, 1610);
//! assert!(record.is_live_data);
//! ```

use serde::{Deserialize, Serialize};

use super::wire_format::{WordType, LIVE_CODE, WORD_LENGTH};

/// Fixed mains voltage used to derive watts.
pub const MAINS_VOLTAGE: f64 = 230.0;

/// Calibration factor from the raw amps reading to amperes.
pub const AMPS_CALIBRATION: f64 = 0.07;

/// Year byte offset.
pub const YEAR_BASE: u16 = 2000;

/// Highest valid month value.
pub const MAX_MONTH: u8 = 12;

/// One minute of energy usage as reported by the CM160.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyRecord {
    /// Reserved, always 0.
    pub addr: u8,
    pub year: u16,
    /// 0-12 once the decoder has corrected it.
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    /// Tariff cost, 2 decimal places.
    pub cost: f64,
    /// Current in amperes, 3 decimal places.
    pub amps: f64,
    /// Power at [`MAINS_VOLTAGE`], whole watts.
    pub watts: u32,
    /// Amp-hours over the minute, 2 decimal places.
    pub ah: f64,
    /// Watt-hours over the minute, 2 decimal places.
    pub wh: f64,
    /// `true` for a live reading, `false` for a db record.
    #[serde(rename = "isLiveData")]
    pub is_live_data: bool,
}

impl EnergyRecord {
    /// Decode the fields of a data word.
    ///
    /// Does not validate the type byte or checksum, and does not correct the
    /// month; [`crate::decoder::WordDecoder`] does all three.
    pub fn decode(word: &[u8; WORD_LENGTH]) -> Self {
        let cost_raw = u16::from_le_bytes([word[6], word[7]]);
        let amps_raw = u16::from_le_bytes([word[8], word[9]]);

        // watts, ah and wh derive from the unrounded amps
        let amps = f64::from(amps_raw) * AMPS_CALIBRATION;
        let watts = amps * MAINS_VOLTAGE;
        let ah = amps / 60.0;
        let wh = watts / 60.0;

        Self {
            addr: 0,
            year: YEAR_BASE + u16::from(word[1]),
            month: word[2],
            day: word[3],
            hour: word[4],
            min: word[5],
            cost: round_to(f64::from(cost_raw) / 100.0, 2),
            amps: round_to(amps, 3),
            watts: watts.round() as u32,
            ah: round_to(ah, 2),
            wh: round_to(wh, 2),
            is_live_data: word[0] == LIVE_CODE,
        }
    }

    /// Kind of word this record came from.
    #[inline]
    pub fn word_type(&self) -> WordType {
        if self.is_live_data {
            WordType::Live
        } else {
            WordType::Db
        }
    }
}

/// Whether a raw month byte is in range.
#[inline]
pub fn is_valid_month(month: u8) -> bool {
    month <= MAX_MONTH
}

/// Round half away from zero to `places` decimal places.
#[inline]
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
