//! Integers and byte strings, the two atoms every other encoding is built from.
//!
//! Decoders take the whole input and a cursor, and return the decoded atom
//! together with the number of bytes consumed from the cursor on.

use crate::constants::{END_TAG, INTEGER_TAG, LENGTH_SEPARATOR};
use crate::error::BencodeError;

/// Appends `i<value>e`.
///
/// # Examples
///
/// ```
/// let mut out = Vec::new();
/// rbit_bencode::encode_integer(-42, &mut out);
/// assert_eq!(out, b"i-42e");
/// ```
pub fn encode_integer(value: i64, out: &mut Vec<u8>) {
    out.push(INTEGER_TAG);
    out.extend_from_slice(value.to_string().as_bytes());
    out.push(END_TAG);
}

/// Appends `<len>:<bytes>`. The bytes are written verbatim.
///
/// # Examples
///
/// ```
/// let mut out = Vec::new();
/// rbit_bencode::encode_byte_string(b"spam", &mut out);
/// assert_eq!(out, b"4:spam");
/// ```
pub fn encode_byte_string(bytes: &[u8], out: &mut Vec<u8>) {
    out.extend_from_slice(bytes.len().to_string().as_bytes());
    out.push(LENGTH_SEPARATOR);
    out.extend_from_slice(bytes);
}

/// Decodes the integer starting at `cursor`.
///
/// Leading zeros and `-0` are rejected, so every accepted integer has exactly
/// one encoding.
///
/// # Errors
///
/// - [`BencodeError::UnexpectedChar`] if `cursor` is not at an `i`
/// - [`BencodeError::TruncatedBuffer`] if the input ends before the closing `e`
/// - [`BencodeError::MalformedInteger`] if the digits are empty, not numeric,
///   non-canonical or do not fit an `i64`
pub fn decode_integer(data: &[u8], cursor: usize) -> Result<(i64, usize), BencodeError> {
    expect_tag(data, cursor, INTEGER_TAG)?;

    let start = cursor + 1;
    let end = data[start..]
        .iter()
        .position(|&b| b == END_TAG)
        .map(|n| start + n)
        .ok_or(BencodeError::TruncatedBuffer { offset: data.len() })?;

    let malformed = |reason: &str| BencodeError::MalformedInteger {
        offset: start,
        reason: reason.into(),
    };

    let digits = &data[start..end];
    let unsigned = digits.strip_prefix(b"-").unwrap_or(digits);
    if unsigned.is_empty() {
        return Err(malformed("empty"));
    }
    if !unsigned.iter().all(u8::is_ascii_digit) {
        return Err(malformed("not a decimal number"));
    }
    if unsigned[0] == b'0' && (unsigned.len() > 1 || unsigned.len() != digits.len()) {
        return Err(malformed("leading zeros"));
    }

    // Only ASCII digits and '-' are left at this point.
    let text = std::str::from_utf8(digits).map_err(|_| malformed("invalid utf8"))?;
    let value = text.parse::<i64>().map_err(|_| malformed("out of range"))?;

    Ok((value, end + 1 - cursor))
}

/// Decodes the byte string starting at `cursor`, returning an owned copy.
///
/// # Errors
///
/// - [`BencodeError::MalformedLength`] if the length prefix is empty or not
///   made of ASCII digits
/// - [`BencodeError::TruncatedBuffer`] if the `:` or the declared number of
///   bytes is missing
pub fn decode_byte_string(data: &[u8], cursor: usize) -> Result<(Vec<u8>, usize), BencodeError> {
    let end = data
        .get(cursor..)
        .and_then(|rest| rest.iter().position(|&b| b == LENGTH_SEPARATOR))
        .map(|n| cursor + n)
        .ok_or(BencodeError::TruncatedBuffer { offset: data.len() })?;

    let digits = &data[cursor..end];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(BencodeError::MalformedLength { offset: cursor });
    }

    let len: usize = std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or(BencodeError::MalformedLength { offset: cursor })?;

    let start = end + 1;
    let stop = start
        .checked_add(len)
        .filter(|&stop| stop <= data.len())
        .ok_or(BencodeError::TruncatedBuffer { offset: data.len() })?;

    Ok((data[start..stop].to_vec(), stop - cursor))
}

pub(crate) fn expect_tag(data: &[u8], cursor: usize, tag: u8) -> Result<(), BencodeError> {
    match data.get(cursor) {
        Some(&b) if b == tag => Ok(()),
        Some(&b) => Err(BencodeError::UnexpectedChar {
            offset: cursor,
            found: b as char,
        }),
        None => Err(BencodeError::TruncatedBuffer { offset: cursor }),
    }
}
