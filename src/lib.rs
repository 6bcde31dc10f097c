//! rbit-bencode - Bencode encoding and decoding ([BEP-3]) for Rust types.
//!
//! Bencode is the serialization format used throughout BitTorrent for storing
//! and transmitting structured data, including `.torrent` files and tracker
//! responses.
//!
//! # Data Types
//!
//! Bencode supports four data types:
//!
//! | Type | Format | Example |
//! |------|--------|---------|
//! | Integer | `i<number>e` | `i42e` → 42 |
//! | Byte String | `<length>:<data>` | `4:spam` → "spam" |
//! | List | `l<items>e` | `l4:spami42ee` → ["spam", 42] |
//! | Dictionary | `d<key><value>...e` | `d3:foo3:bare` → {"foo": "bar"} |
//!
//! # Typed values
//!
//! [`marshal`] and [`unmarshal`] work on any type implementing [`Encode`] and
//! [`Decode`]: integers, `bool`, strings, byte vectors and arrays, `Vec`,
//! fixed-size arrays, maps with string keys, `Option`, `Box` and records
//! declared with [`record!`].
//!
//! ```
//! use rbit_bencode::{marshal, record, unmarshal};
//!
//! record! {
//!     #[derive(Debug, Default, PartialEq)]
//!     pub struct Info {
//!         pub name: String,
//!         pub piece_length: u64 => "piece length",
//!         pub pieces: Vec<u8>,
//!         pub private: bool => "private,omitempty",
//!     }
//! }
//!
//! let info = Info {
//!     name: "example.txt".into(),
//!     piece_length: 16384,
//!     pieces: vec![0xab; 20],
//!     private: false,
//! };
//!
//! let encoded = marshal(&info).unwrap();
//! assert!(encoded.starts_with(b"d4:name11:example.txt12:piece lengthi16384e6:pieces20:"));
//!
//! let mut decoded = Info::default();
//! unmarshal(&encoded, &mut decoded).unwrap();
//! assert_eq!(decoded, info);
//! ```
//!
//! # Generic values
//!
//! When the shape of the input is not known, decode into a [`Value`]:
//!
//! ```
//! use rbit_bencode::{decode, encode, Value};
//!
//! let value = decode(b"l4:spami42ee").unwrap();
//! let list = value.as_list().unwrap();
//! assert_eq!(list[0].as_str(), Some("spam"));
//! assert_eq!(list[1].as_integer(), Some(42));
//!
//! assert_eq!(encode(&value).unwrap(), b"l4:spami42ee");
//! ```
//!
//! # Custom representations
//!
//! A type can take over its own encoding with [`MarshalBencode`] and
//! [`UnmarshalBencode`], announced through [`Encode::encode_hook`] and
//! [`Decode::decode_hook`]. The hook is used wherever the type appears: at the
//! top level, as a record field, in a list or as a map value.
//!
//! # Error Handling
//!
//! Every operation returns [`BencodeError`]. Decoding errors report the byte
//! offset where they were detected:
//!
//! - [`BencodeError::MalformedInteger`] - Bad integer (e.g., leading zeros)
//! - [`BencodeError::TruncatedBuffer`] - Input ended before a declared length or terminator
//! - [`BencodeError::UnterminatedContainer`] - List or dictionary without closing `e`
//! - [`BencodeError::TypeMismatch`] - Wire shape does not fit the destination
//! - [`BencodeError::NestingTooDeep`] - Recursion limit exceeded (64 levels by default)
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod constants;
mod container;
mod error;
mod field;
mod marshal;
mod primitive;
mod record;
mod rehydrate;
mod shape;
mod stream;
mod target;
mod value;

pub use constants::MAX_DEPTH;
pub use error::BencodeError;
pub use field::{resolve, FieldSpec, Record};
pub use marshal::{
    decode, encode, from_value, marshal, unmarshal, unmarshal_with, MarshalBencode,
    UnmarshalBencode, UnmarshalOptions,
};
pub use primitive::{decode_byte_string, decode_integer, encode_byte_string, encode_integer};
pub use shape::{Encode, MapKey, Shape};
pub use stream::{Decoder, Encoder};
pub use target::{
    ArraySlot, ByteSlot, Decode, IntegerSlot, ListSlot, MapSlot, OptionSlot, Target,
};
pub use value::Value;

#[cfg(test)]
mod tests;
