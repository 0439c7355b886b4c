//! Codec module - serialization of decoded records.
//!
//! Records are handed to consumers that usually live outside Rust (dashboards,
//! message brokers), so two codecs are provided:
//!
//! - [`JsonCodec`] - JSON using `serde_json`, one object per record
//! - [`MsgPackCodec`] - MessagePack using `rmp-serde` (`to_vec_named`, so maps keep field names)
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.
//!
//! # Example
//!
//! ```
//! use owl_cm160::codec::{JsonCodec, MsgPackCodec};
//! use owl_cm160::protocol::{build_word, EnergyRecord, LIVE_CODE};
//!
//! let record = EnergyRecord::decode(&build_word([LIVE_CODE, 24, 3, 15, 12, 30, 0, 0, 100, 0]));
//!
//! let line = JsonCodec::encode_line(&record).unwrap();
//! assert!(line.contains("\"isLiveData\":true"));
//!
//! let packed = MsgPackCodec::encode(&record).unwrap();
//! let decoded: EnergyRecord = MsgPackCodec::decode(&packed).unwrap();
//! assert_eq!(decoded, record);
//! ```

mod json;
mod msgpack;

pub use json::JsonCodec;
pub use msgpack::MsgPackCodec;
