//! Lists and dictionaries.
//!
//! Encoders recurse through the dispatcher for every element. Decoders are
//! methods on [`Reader`], which carries the input and the nesting limit; the
//! cursor itself is passed in and the consumed byte count handed back.
//! Typed containers hand each element its own cursor, so errors point at the
//! element that caused them.

use std::collections::BTreeMap;

use bytes::Bytes;

use crate::constants::{DICT_TAG, END_TAG, LIST_TAG};
use crate::error::BencodeError;
use crate::field::{resolve, Record};
use crate::marshal::marshal_into;
use crate::primitive::{decode_byte_string, decode_integer, encode_byte_string, expect_tag};
use crate::shape::{Encode, MapKey};
use crate::target::{ArraySlot, ListSlot, MapSlot};
use crate::value::Value;

/// Appends `l<elements>e`.
pub(crate) fn encode_list(items: &[&dyn Encode], out: &mut Vec<u8>) -> Result<(), BencodeError> {
    out.push(LIST_TAG);
    for item in items {
        marshal_into(*item, out)?;
    }
    out.push(END_TAG);
    Ok(())
}

/// Appends a dictionary. Every key must be textual or a raw byte string.
pub(crate) fn encode_dictionary(
    entries: &[(&dyn MapKey, &dyn Encode)],
    out: &mut Vec<u8>,
) -> Result<(), BencodeError> {
    let mut pairs = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        let bytes = key
            .key_bytes()
            .ok_or_else(|| BencodeError::UnsupportedKeyType(key.key_type()))?;
        pairs.push((bytes, *value));
    }
    encode_sorted(pairs, out)
}

/// Appends a record as a dictionary keyed by wire names.
pub(crate) fn encode_record(record: &dyn Record, out: &mut Vec<u8>) -> Result<(), BencodeError> {
    let specs = record.field_specs();
    let mut pairs = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        if !spec.is_candidate() {
            continue;
        }
        let Some(value) = record.field(index) else {
            continue;
        };
        if spec.omit_if_default && value.is_zero() {
            continue;
        }
        pairs.push((spec.wire_name.as_bytes(), value));
    }
    encode_sorted(pairs, out)
}

/// Sorts by raw key bytes and writes the pairs. Values that encode to
/// nothing are left out together with their key.
fn encode_sorted(
    mut pairs: Vec<(&[u8], &dyn Encode)>,
    out: &mut Vec<u8>,
) -> Result<(), BencodeError> {
    // Stable, so the first of two equal keys survives the dedup.
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    pairs.dedup_by(|later, earlier| later.0 == earlier.0);

    out.push(DICT_TAG);
    let mut encoded = Vec::new();
    for (key, value) in pairs {
        encoded.clear();
        marshal_into(value, &mut encoded)?;
        if encoded.is_empty() {
            continue;
        }
        encode_byte_string(key, out);
        out.extend_from_slice(&encoded);
    }
    out.push(END_TAG);
    Ok(())
}

/// Decoding state shared by one `unmarshal` call.
pub(crate) struct Reader<'a> {
    pub(crate) data: &'a [u8],
    pub(crate) max_depth: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8], max_depth: usize) -> Self {
        Self { data, max_depth }
    }

    fn check_depth(&self, cursor: usize, depth: usize) -> Result<(), BencodeError> {
        if depth > self.max_depth {
            return Err(BencodeError::NestingTooDeep { offset: cursor });
        }
        Ok(())
    }

    /// Decodes any value into its generic form, choosing the variant from the
    /// leading byte.
    pub(crate) fn decode_value(&self, cursor: usize, depth: usize) -> Result<(Value, usize), BencodeError> {
        self.check_depth(cursor, depth)?;

        match self.data.get(cursor) {
            Some(b'i') => {
                let (i, n) = decode_integer(self.data, cursor)?;
                Ok((Value::Integer(i), n))
            }
            Some(b'l') => {
                let (items, n) = self.decode_list(cursor, depth)?;
                Ok((Value::List(items), n))
            }
            Some(b'd') => {
                let (entries, n) = self.decode_generic_dictionary(cursor, depth)?;
                Ok((Value::Dict(entries), n))
            }
            Some(b'0'..=b'9') => {
                let (bytes, n) = decode_byte_string(self.data, cursor)?;
                Ok((Value::Bytes(Bytes::from(bytes)), n))
            }
            Some(&c) => Err(BencodeError::UnexpectedChar {
                offset: cursor,
                found: c as char,
            }),
            None => Err(BencodeError::TruncatedBuffer { offset: cursor }),
        }
    }

    /// Decodes `l...e` into generic elements. Empty lists are fine.
    pub(crate) fn decode_list(&self, cursor: usize, depth: usize) -> Result<(Vec<Value>, usize), BencodeError> {
        let mut items = Vec::new();
        let n = self.decode_items(cursor, |pos| {
            let (item, n) = self.decode_value(pos, depth + 1)?;
            items.push(item);
            Ok(n)
        })?;
        Ok((items, n))
    }

    fn decode_generic_dictionary(
        &self,
        cursor: usize,
        depth: usize,
    ) -> Result<(BTreeMap<Bytes, Value>, usize), BencodeError> {
        let mut entries = BTreeMap::new();
        let n = self.decode_entries(cursor, |key, pos| {
            let (value, n) = self.decode_value(pos, depth + 1)?;
            entries.insert(Bytes::from(key), value);
            Ok(n)
        })?;
        Ok((entries, n))
    }

    /// Decodes `l...e` straight into a growable sequence, one fresh element
    /// per item. The previous contents are dropped.
    pub(crate) fn decode_sequence(
        &self,
        cursor: usize,
        depth: usize,
        slot: &mut dyn ListSlot,
    ) -> Result<usize, BencodeError> {
        self.check_depth(cursor, depth)?;
        slot.clear();
        self.decode_items(cursor, |pos| {
            self.unmarshal_at(pos, depth + 1, slot.push_default())
        })
    }

    /// Decodes `l...e` into a fixed-size array.
    ///
    /// Items past the capacity are still parsed so the error can report how
    /// many there were.
    pub(crate) fn decode_array(
        &self,
        cursor: usize,
        depth: usize,
        slot: &mut dyn ArraySlot,
    ) -> Result<usize, BencodeError> {
        self.check_depth(cursor, depth)?;

        let capacity = slot.capacity();
        let mut found = 0;
        let n = self.decode_items(cursor, |pos| {
            let n = match slot.element(found) {
                Some(element) => self.unmarshal_at(pos, depth + 1, element)?,
                None => self.decode_value(pos, depth + 1)?.1,
            };
            found += 1;
            Ok(n)
        })?;

        if found > capacity {
            return Err(BencodeError::ArrayOverflow {
                offset: cursor,
                capacity,
                found,
            });
        }
        Ok(n)
    }

    /// Decodes `d...e` into a typed map. The previous contents are dropped.
    pub(crate) fn decode_map(
        &self,
        cursor: usize,
        depth: usize,
        slot: &mut dyn MapSlot,
    ) -> Result<usize, BencodeError> {
        self.check_depth(cursor, depth)?;
        slot.clear();
        self.decode_entries(cursor, |key, pos| {
            let key_type = slot.key_type();
            let element = slot
                .entry(&key)
                .ok_or(BencodeError::UnsupportedKeyType(key_type))?;
            self.unmarshal_at(pos, depth + 1, element)
        })
    }

    /// Decodes `d...e` into a record, field by field as keys are read.
    pub(crate) fn decode_record(
        &self,
        cursor: usize,
        depth: usize,
        record: &mut dyn Record,
    ) -> Result<usize, BencodeError> {
        self.check_depth(cursor, depth)?;

        let specs = record.field_specs();
        let name = record.record_name();
        self.decode_entries(cursor, |key, pos| {
            match resolve(specs, &key).and_then(|index| record.field_mut(index)) {
                Some(field) => self.unmarshal_at(pos, depth + 1, field),
                None => {
                    tracing::trace!(
                        record = name,
                        key = %String::from_utf8_lossy(&key),
                        "dropping unknown dictionary key"
                    );
                    let (_, n) = self.decode_value(pos, depth + 1)?;
                    Ok(n)
                }
            }
        })
    }

    /// Walks the items of the list at `cursor`.
    ///
    /// `on_item` receives the offset of each item and returns the number of
    /// bytes it took.
    fn decode_items<F>(&self, cursor: usize, mut on_item: F) -> Result<usize, BencodeError>
    where
        F: FnMut(usize) -> Result<usize, BencodeError>,
    {
        expect_tag(self.data, cursor, LIST_TAG)?;

        let mut pos = cursor + 1;
        loop {
            match self.data.get(pos) {
                Some(&END_TAG) => return Ok(pos + 1 - cursor),
                Some(_) => pos += on_item(pos)?,
                None => return Err(BencodeError::UnterminatedContainer { offset: cursor }),
            }
        }
    }

    /// Walks the key/value pairs of the dictionary at `cursor`.
    ///
    /// `on_entry` receives each key and the offset of its value, and returns
    /// the number of bytes the value took.
    fn decode_entries<F>(&self, cursor: usize, mut on_entry: F) -> Result<usize, BencodeError>
    where
        F: FnMut(Vec<u8>, usize) -> Result<usize, BencodeError>,
    {
        expect_tag(self.data, cursor, DICT_TAG)?;

        let mut pos = cursor + 1;
        loop {
            match self.data.get(pos) {
                Some(&END_TAG) => return Ok(pos + 1 - cursor),
                Some(c) if c.is_ascii_digit() => {
                    let (key, n) = decode_byte_string(self.data, pos)?;
                    pos += n;
                    if pos >= self.data.len() {
                        return Err(BencodeError::UnterminatedContainer { offset: cursor });
                    }
                    pos += on_entry(key, pos)?;
                }
                Some(&c) => {
                    return Err(BencodeError::UnexpectedChar {
                        offset: pos,
                        found: c as char,
                    })
                }
                None => return Err(BencodeError::UnterminatedContainer { offset: cursor }),
            }
        }
    }
}
