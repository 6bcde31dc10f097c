//! The encode-side view of a Rust value.
//!
//! Every encodable type reports one [`Shape`]; the dispatcher in
//! [`marshal`](crate::marshal) only ever looks at that, never at concrete
//! types.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;

use crate::field::Record;
use crate::marshal::MarshalBencode;
use crate::value::Value;

/// The closed set of encodable shapes.
pub enum Shape<'a> {
    /// Any integer-like value, including `bool` (`0`/`1`).
    Integer(i64),
    /// Text or an opaque byte blob, emitted as a byte string.
    Bytes(&'a [u8]),
    /// An ordered sequence, emitted as a list.
    List(Vec<&'a dyn Encode>),
    /// A key/value mapping, emitted as a dictionary with sorted keys.
    Map(Vec<(&'a dyn MapKey, &'a dyn Encode)>),
    /// A record, emitted as a dictionary keyed by wire names.
    Record(&'a dyn Record),
    /// A nullable reference. `None` encodes to nothing at all.
    Ref(Option<&'a dyn Encode>),
    /// A value without a bencode representation.
    Unsupported(&'static str),
}

impl Shape<'_> {
    /// Returns true if the shape holds its type's zero value.
    pub fn is_zero(&self) -> bool {
        match self {
            Shape::Integer(i) => *i == 0,
            Shape::Bytes(b) => b.is_empty(),
            Shape::List(items) => items.is_empty(),
            Shape::Map(entries) => entries.is_empty(),
            Shape::Record(record) => (0..record.field_specs().len())
                .filter_map(|index| record.field(index))
                .all(|field| field.is_zero()),
            Shape::Ref(inner) => inner.is_none(),
            Shape::Unsupported(_) => false,
        }
    }
}

/// A type that can be encoded as bencode.
///
/// Most std types implement this already. Records get it from the
/// [`record!`](crate::record) macro.
///
/// # Custom encodings
///
/// A type that wants its own wire representation implements
/// [`MarshalBencode`] and returns itself from [`Encode::encode_hook`]. The
/// hook wins over [`Encode::shape`] wherever the value appears.
pub trait Encode {
    fn shape(&self) -> Shape<'_>;

    fn encode_hook(&self) -> Option<&dyn MarshalBencode> {
        None
    }

    /// Used by `omitempty` fields.
    fn is_zero(&self) -> bool {
        self.shape().is_zero()
    }

    /// Shape of a slice of `Self`. Byte slices override this to become byte strings.
    #[doc(hidden)]
    fn slice_shape(items: &[Self]) -> Shape<'_>
    where
        Self: Sized,
    {
        Shape::List(items.iter().map(|item| item as &dyn Encode).collect())
    }
}

/// A dictionary key. Only textual and raw byte string keys are valid.
pub trait MapKey {
    /// Raw key bytes, or `None` if the key type cannot be a dictionary key.
    fn key_bytes(&self) -> Option<&[u8]>;

    /// Builds a key back from its raw bytes.
    fn from_key_bytes(_bytes: &[u8]) -> Option<Self>
    where
        Self: Sized,
    {
        None
    }

    fn key_type(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl MapKey for str {
    fn key_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl MapKey for &str {
    fn key_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }
}

impl MapKey for String {
    fn key_bytes(&self) -> Option<&[u8]> {
        Some(self.as_bytes())
    }

    fn from_key_bytes(bytes: &[u8]) -> Option<Self> {
        String::from_utf8(bytes.to_vec()).ok()
    }
}

impl MapKey for Bytes {
    fn key_bytes(&self) -> Option<&[u8]> {
        Some(&self[..])
    }

    fn from_key_bytes(bytes: &[u8]) -> Option<Self> {
        Some(Bytes::copy_from_slice(bytes))
    }
}

macro_rules! impl_non_key {
    ($($ty:ty),*) => {
        $(
            impl MapKey for $ty {
                fn key_bytes(&self) -> Option<&[u8]> {
                    None
                }
            }
        )*
    };
}

impl_non_key!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, bool, char);

macro_rules! impl_encode_signed {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Integer(*self as i64)
                }
            }
        )*
    };
}

macro_rules! impl_encode_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn shape(&self) -> Shape<'_> {
                    match i64::try_from(*self) {
                        Ok(i) => Shape::Integer(i),
                        Err(_) => Shape::Unsupported(concat!(stringify!($ty), " above i64::MAX")),
                    }
                }
            }
        )*
    };
}

impl_encode_signed!(i8, i16, i32, i64, isize);
impl_encode_unsigned!(u16, u32, u64, usize);

impl Encode for u8 {
    fn shape(&self) -> Shape<'_> {
        Shape::Integer(i64::from(*self))
    }

    fn slice_shape(items: &[u8]) -> Shape<'_> {
        Shape::Bytes(items)
    }
}

impl Encode for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Integer(i64::from(*self))
    }
}

macro_rules! impl_encode_unsupported {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                fn shape(&self) -> Shape<'_> {
                    Shape::Unsupported(stringify!($ty))
                }
            }
        )*
    };
}

impl_encode_unsupported!(f32, f64, char, ());

impl Encode for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self.as_bytes())
    }
}

impl Encode for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self.as_bytes())
    }
}

impl Encode for Bytes {
    fn shape(&self) -> Shape<'_> {
        Shape::Bytes(self)
    }
}

impl<T: Encode> Encode for [T] {
    fn shape(&self) -> Shape<'_> {
        T::slice_shape(self)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        T::slice_shape(self)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn shape(&self) -> Shape<'_> {
        T::slice_shape(self)
    }

    /// An array never changes length, so it is zero when every element is.
    fn is_zero(&self) -> bool {
        self.iter().all(|item| item.is_zero())
    }
}

impl<T: Encode> Encode for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::List(self.iter().map(|item| item as &dyn Encode).collect())
    }
}

impl<K: MapKey, V: Encode> Encode for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(
            self.iter()
                .map(|(k, v)| (k as &dyn MapKey, v as &dyn Encode))
                .collect(),
        )
    }
}

impl<K: MapKey, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        Shape::Map(
            self.iter()
                .map(|(k, v)| (k as &dyn MapKey, v as &dyn Encode))
                .collect(),
        )
    }
}

impl<T: Encode> Encode for Option<T> {
    fn shape(&self) -> Shape<'_> {
        Shape::Ref(self.as_ref().map(|v| v as &dyn Encode))
    }
}

macro_rules! impl_encode_pointer {
    ($($ptr:ident),*) => {
        $(
            impl<T: Encode + ?Sized> Encode for $ptr<T> {
                fn shape(&self) -> Shape<'_> {
                    (**self).shape()
                }

                fn encode_hook(&self) -> Option<&dyn MarshalBencode> {
                    (**self).encode_hook()
                }

                fn is_zero(&self) -> bool {
                    (**self).is_zero()
                }
            }
        )*
    };
}

impl_encode_pointer!(Box, Rc, Arc);

impl<T: Encode + ?Sized> Encode for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn encode_hook(&self) -> Option<&dyn MarshalBencode> {
        (**self).encode_hook()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

impl Encode for Value {
    fn shape(&self) -> Shape<'_> {
        match self {
            Value::Integer(i) => Shape::Integer(*i),
            Value::Bytes(b) => Shape::Bytes(b),
            Value::List(items) => Shape::List(items.iter().map(|v| v as &dyn Encode).collect()),
            Value::Dict(entries) => entries.shape(),
        }
    }
}
