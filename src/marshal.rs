//! The public entry points and the per-value dispatch behind them.

use crate::constants::{DICT_TAG, LIST_TAG, MAX_DEPTH};
use crate::container::{encode_dictionary, encode_list, encode_record, Reader};
use crate::error::BencodeError;
use crate::primitive::{encode_byte_string, encode_integer};
use crate::rehydrate::rehydrate;
use crate::shape::{Encode, Shape};
use crate::target::{Decode, Target};
use crate::value::Value;

/// A type that produces its own bencoded form.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, SystemTime, UNIX_EPOCH};
/// use rbit_bencode::{marshal, BencodeError, Encode, MarshalBencode, Shape};
///
/// struct Timestamp(SystemTime);
///
/// impl MarshalBencode for Timestamp {
///     fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError> {
///         let secs = self.0.duration_since(UNIX_EPOCH).map_err(BencodeError::custom)?;
///         marshal(&secs.as_secs())
///     }
/// }
///
/// impl Encode for Timestamp {
///     fn shape(&self) -> Shape<'_> {
///         Shape::Unsupported("Timestamp")
///     }
///
///     fn encode_hook(&self) -> Option<&dyn MarshalBencode> {
///         Some(self)
///     }
/// }
///
/// let ts = Timestamp(UNIX_EPOCH + Duration::from_secs(1_700_000_000));
/// assert_eq!(marshal(&ts).unwrap(), b"i1700000000e");
/// ```
pub trait MarshalBencode {
    fn marshal_bencode(&self) -> Result<Vec<u8>, BencodeError>;
}

/// A type that decodes itself from bencoded input.
///
/// `data` starts at the value to decode and may continue past it; the
/// implementation returns the number of bytes it consumed.
pub trait UnmarshalBencode {
    fn unmarshal_bencode(&mut self, data: &[u8]) -> Result<usize, BencodeError>;
}

/// Per-call decoding configuration.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{unmarshal_with, UnmarshalOptions, Value};
///
/// let options = UnmarshalOptions::new().max_depth(1);
/// let mut value = Value::default();
/// assert!(unmarshal_with(b"lli1eee", &mut value, &options).is_err());
/// assert!(unmarshal_with(b"li1ee", &mut value, &options).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshalOptions {
    max_depth: usize,
}

impl Default for UnmarshalOptions {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
        }
    }
}

impl UnmarshalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how deeply lists and dictionaries may nest.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Returns the bencoded form of `value`.
///
/// Dictionary keys are sorted, `None` values and their keys are left out,
/// and byte sequences become byte strings.
///
/// # Errors
///
/// - [`BencodeError::UnsupportedType`] if some part of `value` has no bencode form
/// - [`BencodeError::UnsupportedKeyType`] if a map key is not textual
/// - any error returned by a [`MarshalBencode`] hook
///
/// Nothing is returned on error, not even a prefix.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use rbit_bencode::marshal;
///
/// let mut map = HashMap::new();
/// map.insert("hello", vec!["world"]);
/// map.insert("b", vec![]);
/// map.insert("a", vec!["x", "y"]);
///
/// assert_eq!(marshal(&map).unwrap(), b"d1:al1:x1:ye1:ble5:hellol5:worldee");
/// assert_eq!(marshal(b"Some".as_slice()).unwrap(), b"4:Some");
/// assert!(marshal(&1.5f64).is_err());
/// ```
pub fn marshal<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>, BencodeError> {
    let mut out = Vec::new();
    marshal_into(value, &mut out)?;
    Ok(out)
}

pub(crate) fn marshal_into<T: Encode + ?Sized>(
    value: &T,
    out: &mut Vec<u8>,
) -> Result<(), BencodeError> {
    if let Some(hook) = value.encode_hook() {
        out.extend_from_slice(&hook.marshal_bencode()?);
        return Ok(());
    }

    match value.shape() {
        Shape::Integer(i) => encode_integer(i, out),
        Shape::Bytes(bytes) => encode_byte_string(bytes, out),
        Shape::List(items) => encode_list(&items, out)?,
        Shape::Map(entries) => encode_dictionary(&entries, out)?,
        Shape::Record(record) => encode_record(record, out)?,
        Shape::Ref(Some(inner)) => marshal_into(inner, out)?,
        Shape::Ref(None) => {}
        Shape::Unsupported(name) => return Err(BencodeError::UnsupportedType(name)),
    }
    Ok(())
}

/// Decodes the first value in `data` into `dest`, returning the number of
/// bytes consumed. Bytes after the value are left alone.
///
/// Use [`Value`] as the destination when the shape of the input is unknown.
/// Unknown dictionary keys are skipped. On error `dest` may be partially
/// written and should be discarded; the error's
/// [`offset`](BencodeError::offset) tells where decoding stopped.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{record, unmarshal};
///
/// record! {
///     #[derive(Debug, Default)]
///     pub struct Person {
///         pub age: i64,
///         pub name: String,
///     }
/// }
///
/// let mut person = Person::default();
/// let consumed = unmarshal(b"d3:agei10e4:name4:Johne", &mut person).unwrap();
/// assert_eq!(consumed, 23);
/// assert_eq!(person.age, 10);
/// assert_eq!(person.name, "John");
/// ```
pub fn unmarshal<T: Decode>(data: &[u8], dest: &mut T) -> Result<usize, BencodeError> {
    unmarshal_with(data, dest, &UnmarshalOptions::default())
}

/// Like [`unmarshal`], with explicit options.
pub fn unmarshal_with<T: Decode>(
    data: &[u8],
    dest: &mut T,
    options: &UnmarshalOptions,
) -> Result<usize, BencodeError> {
    Reader::new(data, options.max_depth).unmarshal_at(0, 0, dest)
}

/// Encodes a generic value.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{encode, Value};
/// use std::collections::BTreeMap;
/// use bytes::Bytes;
///
/// let mut dict = BTreeMap::new();
/// dict.insert(Bytes::from_static(b"b"), Value::Integer(2));
/// dict.insert(Bytes::from_static(b"a"), Value::List(vec![Value::string("one")]));
/// assert_eq!(encode(&Value::Dict(dict)).unwrap(), b"d1:al3:onee1:bi2ee");
/// ```
pub fn encode(value: &Value) -> Result<Vec<u8>, BencodeError> {
    marshal(value)
}

/// Decodes exactly one generic value spanning all of `data`.
///
/// # Errors
///
/// Fails like [`unmarshal`], and with [`BencodeError::TrailingData`] if
/// bytes remain after the value.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{decode, Value};
///
/// assert_eq!(decode(b"i42e").unwrap(), Value::Integer(42));
/// assert!(decode(b"i42eextra").is_err());
/// ```
pub fn decode(data: &[u8]) -> Result<Value, BencodeError> {
    let mut value = Value::default();
    let consumed = unmarshal(data, &mut value)?;

    if consumed != data.len() {
        return Err(BencodeError::TrailingData { offset: consumed });
    }

    Ok(value)
}

/// Writes an already decoded [`Value`] into `dest`.
///
/// The same conversions as [`unmarshal`] apply, decode hooks included. There
/// is no input to point into, so error offsets are 0.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{decode, from_value};
///
/// let value = decode(b"d5:peersl3:one3:twoee").unwrap();
/// let mut peers: Vec<String> = Vec::new();
/// from_value(value.get(b"peers").cloned().unwrap(), &mut peers).unwrap();
/// assert_eq!(peers, ["one", "two"]);
/// ```
pub fn from_value<T: Decode>(value: Value, dest: &mut T) -> Result<(), BencodeError> {
    rehydrate(value, dest, 0)
}

impl Reader<'_> {
    /// Decodes the value at `cursor` into `dest`, preferring its decode hook.
    ///
    /// Typed lists, arrays, maps and records are filled element by element.
    /// Everything else, and any container whose wire tag does not fit the
    /// destination, goes through the generic tree and [`rehydrate`].
    pub(crate) fn unmarshal_at(
        &self,
        cursor: usize,
        depth: usize,
        dest: &mut dyn Decode,
    ) -> Result<usize, BencodeError> {
        if let Some(hook) = dest.decode_hook() {
            tracing::trace!(offset = cursor, "decoding through hook");
            let rest = self.data.get(cursor..).unwrap_or_default();
            let n = hook.unmarshal_bencode(rest).map_err(|e| e.shifted(cursor))?;
            if n > rest.len() {
                return Err(BencodeError::TruncatedBuffer {
                    offset: self.data.len(),
                });
            }
            if n == 0 {
                return Err(BencodeError::custom(format_args!(
                    "decode hook at byte {cursor} consumed no input"
                )));
            }
            return Ok(n);
        }

        let tag = self.data.get(cursor).copied();
        match (dest.target(), tag) {
            (Target::Optional(slot), _) => return self.unmarshal_at(cursor, depth, slot.fill()),
            (Target::Shared(name), _) => return Err(BencodeError::NotAReference(name)),
            (Target::List(slot), Some(LIST_TAG)) => return self.decode_sequence(cursor, depth, slot),
            (Target::Array(slot), Some(LIST_TAG)) => return self.decode_array(cursor, depth, slot),
            (Target::Map(slot), Some(DICT_TAG)) => return self.decode_map(cursor, depth, slot),
            (Target::Record(record), Some(DICT_TAG)) => {
                return self.decode_record(cursor, depth, record)
            }
            _ => {}
        }

        if tag.is_none() {
            return Err(BencodeError::TruncatedBuffer { offset: cursor });
        }
        let (value, n) = self.decode_value(cursor, depth)?;
        rehydrate(value, dest, cursor)?;
        Ok(n)
    }
}
