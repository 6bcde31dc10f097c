//! The decode-side view of a destination.
//!
//! A [`Target`] is a mutable slot the decoder writes into. Containers expose
//! their elements through the slot traits so the rehydrator can allocate and
//! fill them without knowing concrete types.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;

use crate::field::Record;
use crate::marshal::UnmarshalBencode;
use crate::shape::MapKey;
use crate::value::Value;

/// The closed set of decode destinations.
pub enum Target<'a> {
    Integer(&'a mut dyn IntegerSlot),
    /// Decoded from the integers `0` and `1`.
    Bool(&'a mut bool),
    /// UTF-8 text.
    Text(&'a mut String),
    /// Raw bytes, growable or fixed-size.
    Bytes(&'a mut dyn ByteSlot),
    List(&'a mut dyn ListSlot),
    /// A fixed-size array of non-byte elements.
    Array(&'a mut dyn ArraySlot),
    Map(&'a mut dyn MapSlot),
    Record(&'a mut dyn Record),
    /// An `Option`, filled with a default value before decoding into it.
    Optional(&'a mut dyn OptionSlot),
    /// Takes whatever comes off the wire.
    Generic(&'a mut Value),
    /// A reference that cannot be written through.
    Shared(&'static str),
    Unsupported(&'static str),
}

impl Target<'_> {
    /// Name of the expected wire shape, used in type mismatch errors.
    pub fn expected(&self) -> &'static str {
        match self {
            Target::Integer(slot) => slot.type_name(),
            Target::Bool(_) => "integer 0 or 1",
            Target::Text(_) => "UTF-8 byte string",
            Target::Bytes(_) => "byte string",
            Target::List(_) | Target::Array(_) => "list",
            Target::Map(_) | Target::Record(_) => "dictionary",
            Target::Optional(_) | Target::Generic(_) => "any value",
            Target::Shared(name) | Target::Unsupported(name) => name,
        }
    }
}

/// A type that can be decoded from bencode.
///
/// # Custom decodings
///
/// A type with its own wire representation implements [`UnmarshalBencode`]
/// and returns itself from [`Decode::decode_hook`]. The hook receives the
/// input starting at the value and reports how many bytes it consumed.
pub trait Decode {
    fn target(&mut self) -> Target<'_>;

    fn decode_hook(&mut self) -> Option<&mut dyn UnmarshalBencode> {
        None
    }

    /// Target of a `Vec<Self>`. `u8` overrides this to decode byte strings.
    #[doc(hidden)]
    fn vec_target(items: &mut Vec<Self>) -> Target<'_>
    where
        Self: Sized + Default,
    {
        Target::List(items)
    }

    /// Target of a `[Self; N]`. `u8` overrides this to decode byte strings.
    #[doc(hidden)]
    fn array_target<const N: usize>(items: &mut [Self; N]) -> Target<'_>
    where
        Self: Sized,
    {
        Target::Array(items)
    }
}

pub trait IntegerSlot {
    /// Stores `value`, returning false if it does not fit.
    fn store(&mut self, value: i64) -> bool;

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub trait ByteSlot {
    /// Maximum number of bytes the slot holds, `None` if growable.
    fn capacity(&self) -> Option<usize>;

    fn store(&mut self, bytes: &[u8]);
}

pub trait ListSlot {
    fn clear(&mut self);

    /// Appends a default element and returns it.
    fn push_default(&mut self) -> &mut dyn Decode;
}

pub trait ArraySlot {
    fn capacity(&self) -> usize;

    fn element(&mut self, index: usize) -> Option<&mut dyn Decode>;
}

pub trait MapSlot {
    fn clear(&mut self);

    /// Returns the value slot for `key`, inserting a default value.
    ///
    /// `None` if the key type cannot be built from `key`.
    fn entry(&mut self, key: &[u8]) -> Option<&mut dyn Decode>;

    fn key_type(&self) -> &'static str;
}

pub trait OptionSlot {
    fn fill(&mut self) -> &mut dyn Decode;
}

macro_rules! impl_integer_slot {
    ($($ty:ty),*) => {
        $(
            impl IntegerSlot for $ty {
                fn store(&mut self, value: i64) -> bool {
                    match <$ty>::try_from(value) {
                        Ok(v) => {
                            *self = v;
                            true
                        }
                        Err(_) => false,
                    }
                }
            }
        )*
    };
}

macro_rules! impl_decode_integer {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn target(&mut self) -> Target<'_> {
                    Target::Integer(self)
                }
            }
        )*
    };
}

impl_integer_slot!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
impl_decode_integer!(i8, i16, i32, i64, isize, u16, u32, u64, usize);

impl Decode for u8 {
    fn target(&mut self) -> Target<'_> {
        Target::Integer(self)
    }

    fn vec_target(items: &mut Vec<u8>) -> Target<'_> {
        Target::Bytes(items)
    }

    fn array_target<const N: usize>(items: &mut [u8; N]) -> Target<'_> {
        Target::Bytes(items)
    }
}

impl Decode for bool {
    fn target(&mut self) -> Target<'_> {
        Target::Bool(self)
    }
}

macro_rules! impl_decode_unsupported {
    ($($ty:ty),*) => {
        $(
            impl Decode for $ty {
                fn target(&mut self) -> Target<'_> {
                    Target::Unsupported(stringify!($ty))
                }
            }
        )*
    };
}

impl_decode_unsupported!(f32, f64, char, ());

impl Decode for String {
    fn target(&mut self) -> Target<'_> {
        Target::Text(self)
    }
}

impl ByteSlot for Vec<u8> {
    fn capacity(&self) -> Option<usize> {
        None
    }

    fn store(&mut self, bytes: &[u8]) {
        self.clear();
        self.extend_from_slice(bytes);
    }
}

impl ByteSlot for Bytes {
    fn capacity(&self) -> Option<usize> {
        None
    }

    fn store(&mut self, bytes: &[u8]) {
        *self = Bytes::copy_from_slice(bytes);
    }
}

impl<const N: usize> ByteSlot for [u8; N] {
    fn capacity(&self) -> Option<usize> {
        Some(N)
    }

    fn store(&mut self, bytes: &[u8]) {
        let len = bytes.len().min(N);
        self[..len].copy_from_slice(&bytes[..len]);
    }
}

impl Decode for Bytes {
    fn target(&mut self) -> Target<'_> {
        Target::Bytes(self)
    }
}

impl<T: Decode + Default> ListSlot for Vec<T> {
    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn push_default(&mut self) -> &mut dyn Decode {
        let index = self.len();
        self.push(T::default());
        &mut self[index]
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn target(&mut self) -> Target<'_> {
        T::vec_target(self)
    }
}

impl<T: Decode, const N: usize> ArraySlot for [T; N] {
    fn capacity(&self) -> usize {
        N
    }

    fn element(&mut self, index: usize) -> Option<&mut dyn Decode> {
        self.get_mut(index).map(|slot| slot as &mut dyn Decode)
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn target(&mut self) -> Target<'_> {
        T::array_target(self)
    }
}

impl<K, V> MapSlot for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Decode + Default,
{
    fn clear(&mut self) {
        BTreeMap::clear(self);
    }

    fn entry(&mut self, key: &[u8]) -> Option<&mut dyn Decode> {
        let key = K::from_key_bytes(key)?;
        Some(BTreeMap::entry(self, key).or_default() as &mut dyn Decode)
    }

    fn key_type(&self) -> &'static str {
        std::any::type_name::<K>()
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: MapKey + Ord,
    V: Decode + Default,
{
    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<K, V, S> MapSlot for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher,
{
    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn entry(&mut self, key: &[u8]) -> Option<&mut dyn Decode> {
        let key = K::from_key_bytes(key)?;
        Some(HashMap::entry(self, key).or_default() as &mut dyn Decode)
    }

    fn key_type(&self) -> &'static str {
        std::any::type_name::<K>()
    }
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: MapKey + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher,
{
    fn target(&mut self) -> Target<'_> {
        Target::Map(self)
    }
}

impl<T: Decode + Default> OptionSlot for Option<T> {
    fn fill(&mut self) -> &mut dyn Decode {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn target(&mut self) -> Target<'_> {
        Target::Optional(self)
    }
}

impl<T: Decode> Decode for Box<T> {
    fn target(&mut self) -> Target<'_> {
        (**self).target()
    }

    fn decode_hook(&mut self) -> Option<&mut dyn UnmarshalBencode> {
        (**self).decode_hook()
    }
}

macro_rules! impl_decode_shared {
    ($($ptr:ident),*) => {
        $(
            impl<T: Decode> Decode for $ptr<T> {
                fn target(&mut self) -> Target<'_> {
                    match $ptr::get_mut(self) {
                        Some(inner) => inner.target(),
                        None => Target::Shared(concat!("shared ", stringify!($ptr))),
                    }
                }

                fn decode_hook(&mut self) -> Option<&mut dyn UnmarshalBencode> {
                    $ptr::get_mut(self).and_then(|inner| inner.decode_hook())
                }
            }
        )*
    };
}

impl_decode_shared!(Rc, Arc);

impl Decode for Value {
    fn target(&mut self) -> Target<'_> {
        Target::Generic(self)
    }
}
