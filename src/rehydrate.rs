//! Converting a generic [`Value`] into a typed destination.

use crate::error::BencodeError;
use crate::field::resolve;
use crate::marshal::marshal;
use crate::target::{Decode, Target};
use crate::value::Value;

/// Writes `value` into `dest`, recursing through containers and records.
///
/// `offset` is where `value` started in the input; errors found anywhere
/// inside it are reported there. The streaming decoder only lands here for
/// scalars and for containers whose wire tag does not fit, so that offset is
/// exact. [`from_value`](crate::from_value) passes 0. A destination with a
/// decode hook gets the canonical re-encoding of `value`.
pub(crate) fn rehydrate(
    value: Value,
    dest: &mut dyn Decode,
    offset: usize,
) -> Result<(), BencodeError> {
    if let Some(hook) = dest.decode_hook() {
        let bytes = marshal(&value)?;
        hook.unmarshal_bencode(&bytes).map_err(|e| e.shifted(offset))?;
        return Ok(());
    }

    let found = value.kind();
    let mismatch = move |expected| BencodeError::TypeMismatch {
        offset,
        expected,
        found,
    };

    match (dest.target(), value) {
        (Target::Generic(slot), value) => *slot = value,

        (Target::Integer(slot), Value::Integer(i)) => {
            if !slot.store(i) {
                return Err(mismatch(slot.type_name()));
            }
        }

        (Target::Bool(slot), Value::Integer(i @ 0..=1)) => *slot = i == 1,

        (Target::Text(slot), Value::Bytes(bytes)) => {
            *slot = String::from_utf8(bytes.to_vec()).map_err(|_| mismatch("UTF-8 byte string"))?;
        }

        (Target::Bytes(slot), Value::Bytes(bytes)) => {
            if let Some(capacity) = slot.capacity() {
                if bytes.len() > capacity {
                    return Err(BencodeError::ArrayOverflow {
                        offset,
                        capacity,
                        found: bytes.len(),
                    });
                }
            }
            slot.store(&bytes);
        }

        (Target::List(slot), Value::List(items)) => {
            slot.clear();
            for item in items {
                rehydrate(item, slot.push_default(), offset)?;
            }
        }

        (Target::Array(slot), Value::List(items)) => {
            let capacity = slot.capacity();
            if items.len() > capacity {
                return Err(BencodeError::ArrayOverflow {
                    offset,
                    capacity,
                    found: items.len(),
                });
            }
            for (index, item) in items.into_iter().enumerate() {
                if let Some(element) = slot.element(index) {
                    rehydrate(item, element, offset)?;
                }
            }
        }

        (Target::Map(slot), Value::Dict(entries)) => {
            slot.clear();
            for (key, item) in entries {
                let key_type = slot.key_type();
                let element = slot
                    .entry(&key)
                    .ok_or(BencodeError::UnsupportedKeyType(key_type))?;
                rehydrate(item, element, offset)?;
            }
        }

        (Target::Record(record), Value::Dict(entries)) => {
            let specs = record.field_specs();
            let name = record.record_name();
            for (key, item) in entries {
                match resolve(specs, &key).and_then(|index| record.field_mut(index)) {
                    Some(field) => rehydrate(item, field, offset)?,
                    None => tracing::trace!(
                        record = name,
                        key = %String::from_utf8_lossy(&key),
                        "dropping unknown dictionary key"
                    ),
                }
            }
        }

        (Target::Optional(slot), value) => rehydrate(value, slot.fill(), offset)?,

        (Target::Shared(name), _) => return Err(BencodeError::NotAReference(name)),

        (Target::Unsupported(name), _) => return Err(BencodeError::UnsupportedType(name)),

        (target, _) => return Err(mismatch(target.expected())),
    }

    Ok(())
}
