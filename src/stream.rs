//! `std::io` adapters around [`marshal`] and [`unmarshal_with`].
//!
//! Both sides buffer a whole value in memory; they add no framing of their own.

use std::io::{Read, Write};

use crate::error::BencodeError;
use crate::marshal::{marshal, unmarshal_with, UnmarshalOptions};
use crate::shape::Encode;
use crate::target::Decode;

/// Writes bencoded values to a writer.
///
/// # Examples
///
/// ```
/// use rbit_bencode::Encoder;
///
/// let mut encoder = Encoder::new(Vec::new());
/// encoder.encode(&42i64).unwrap();
/// encoder.encode("spam").unwrap();
/// assert_eq!(encoder.into_inner(), b"i42e4:spam");
/// ```
#[derive(Debug)]
pub struct Encoder<W> {
    writer: W,
}

impl<W: Write> Encoder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes `value` and writes it out. Nothing is written if encoding fails.
    pub fn encode<T: Encode + ?Sized>(&mut self, value: &T) -> Result<(), BencodeError> {
        let bytes = marshal(value)?;
        self.writer.write_all(&bytes)?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads a bencoded value from a reader.
///
/// The reader is drained to its end before decoding, so a decoder is meant
/// for inputs holding a single value, like a `.torrent` file.
///
/// # Examples
///
/// ```
/// use rbit_bencode::{Decoder, Value};
///
/// let mut decoder = Decoder::new(&b"d3:cow3:mooe"[..]);
/// let mut value = Value::default();
/// decoder.decode(&mut value).unwrap();
/// assert_eq!(value.get(b"cow").and_then(|v| v.as_str()), Some("moo"));
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    reader: R,
    options: UnmarshalOptions,
}

impl<R: Read> Decoder<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            options: UnmarshalOptions::default(),
        }
    }

    pub fn with_options(reader: R, options: UnmarshalOptions) -> Self {
        Self { reader, options }
    }

    /// Reads the remaining input and decodes its first value into `dest`,
    /// returning the number of bytes the value took.
    pub fn decode<T: Decode>(&mut self, dest: &mut T) -> Result<usize, BencodeError> {
        let mut buf = Vec::new();
        self.reader.read_to_end(&mut buf)?;
        unmarshal_with(&buf, dest, &self.options)
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}
