//! The generic bencode tree.

use std::collections::BTreeMap;

use bytes::Bytes;

/// Any bencoded value, held without a schema.
///
/// This is what [`decode`](crate::decode) produces, and what
/// [`unmarshal`](crate::unmarshal) fills in wherever a destination asks for
/// "anything". Dictionary keys are raw byte strings kept in sorted order, so
/// re-encoding a `Value` always yields the canonical form.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{decode, Value};
///
/// let announce = decode(b"d8:intervali1800e5:peersl4:abcdee").unwrap();
/// assert_eq!(announce.get(b"interval").and_then(Value::as_integer), Some(1800));
/// assert_eq!(announce.get(b"peers").and_then(Value::as_list).map(|p| p.len()), Some(1));
/// assert_eq!(announce.kind(), "dictionary");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// `i<n>e`, a signed 64-bit integer.
    Integer(i64),
    /// `<len>:<bytes>`. Arbitrary bytes, not necessarily UTF-8.
    Bytes(Bytes),
    /// `l...e`, items of any kind in wire order.
    List(Vec<Value>),
    /// `d...e`, keyed by raw bytes. Iteration follows the canonical key order.
    Dict(BTreeMap<Bytes, Value>),
}

impl Value {
    /// Builds a byte string holding the UTF-8 bytes of `s`.
    pub fn string(s: &str) -> Self {
        Value::Bytes(Bytes::copy_from_slice(s.as_bytes()))
    }

    /// The integer, or `None` for any other kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbit_bencode::Value;
    ///
    /// assert_eq!(Value::Integer(-3).as_integer(), Some(-3));
    /// assert_eq!(Value::string("3").as_integer(), None);
    /// ```
    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }

    /// The raw byte string, valid UTF-8 or not.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use rbit_bencode::Value;
    ///
    /// let hash = Value::Bytes(Bytes::from_static(&[0xde, 0xad]));
    /// assert_eq!(hash.as_bytes().map(|b| b.len()), Some(2));
    /// assert!(hash.as_str().is_none());
    /// ```
    pub fn as_bytes(&self) -> Option<&Bytes> {
        if let Value::Bytes(bytes) = self {
            Some(bytes)
        } else {
            None
        }
    }

    /// The byte string as text, or `None` when it is not valid UTF-8 or not a
    /// byte string at all.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes()
            .and_then(|bytes| std::str::from_utf8(bytes).ok())
    }

    /// The list items, or `None` for any other kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbit_bencode::decode;
    ///
    /// let tiers = decode(b"ll1:ael1:bee").unwrap();
    /// assert_eq!(tiers.as_list().map(|t| t.len()), Some(2));
    /// ```
    pub fn as_list(&self) -> Option<&[Value]> {
        if let Value::List(items) = self {
            Some(items)
        } else {
            None
        }
    }

    /// The dictionary entries in key order, or `None` for any other kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbit_bencode::decode;
    ///
    /// let value = decode(b"d1:bi2e1:ai1ee").unwrap();
    /// let keys: Vec<&[u8]> = value.as_dict().unwrap().keys().map(|k| &k[..]).collect();
    /// assert_eq!(keys, [b"a".as_slice(), b"b".as_slice()]);
    /// ```
    pub fn as_dict(&self) -> Option<&BTreeMap<Bytes, Value>> {
        if let Value::Dict(entries) = self {
            Some(entries)
        } else {
            None
        }
    }

    /// Takes the dictionary out of the value without copying it.
    pub fn into_dict(self) -> Option<BTreeMap<Bytes, Value>> {
        if let Value::Dict(entries) = self {
            Some(entries)
        } else {
            None
        }
    }

    /// Dictionary lookup. `None` for missing keys and for non-dictionaries.
    pub fn get(&self, key: &[u8]) -> Option<&Value> {
        self.as_dict().and_then(|entries| entries.get(key))
    }

    /// Names the wire category, as used in [`TypeMismatch`](crate::BencodeError::TypeMismatch).
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::Bytes(_) => "byte string",
            Value::List(_) => "list",
            Value::Dict(_) => "dictionary",
        }
    }
}

impl Default for Value {
    /// `0:`
    fn default() -> Self {
        Value::Bytes(Bytes::new())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Bytes(s.into())
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes.into())
    }
}

impl From<Bytes> for Value {
    fn from(bytes: Bytes) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<BTreeMap<Bytes, Value>> for Value {
    fn from(entries: BTreeMap<Bytes, Value>) -> Self {
        Value::Dict(entries)
    }
}
