//! Record field metadata and dictionary key resolution.

use crate::shape::Encode;
use crate::target::Decode;

/// How a single record field appears on the wire.
///
/// Built from the field's identifier, visibility and optional tag. The tag
/// uses the form `"name[,omitempty]"`:
///
/// | Tag | Wire name | Behaviour |
/// |-----|-----------|-----------|
/// | none | identifier | always emitted |
/// | `"piece length"` | `piece length` | always emitted |
/// | `"comment,omitempty"` | `comment` | skipped while zero |
/// | `",omitempty"` | identifier | skipped while zero |
/// | `"-"` | none | never emitted or decoded |
/// | `"-,"` | `-` | always emitted |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The Rust identifier of the field.
    pub ident: &'static str,
    /// The dictionary key used on the wire.
    pub wire_name: &'static str,
    /// Never encoded or decoded.
    pub omit: bool,
    /// Not encoded while the field holds its zero value.
    pub omit_if_default: bool,
    /// Only plain `pub` fields take part in encoding and decoding.
    pub visible: bool,
}

impl FieldSpec {
    /// Builds the spec of one field.
    ///
    /// `visibility` is the field's visibility as written in source, e.g.
    /// `"pub"`, `"pub(crate)"` or `""`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rbit_bencode::FieldSpec;
    ///
    /// let spec = FieldSpec::declare("creation_date", "pub", Some("creation date,omitempty"));
    /// assert_eq!(spec.wire_name, "creation date");
    /// assert!(spec.omit_if_default);
    ///
    /// let spec = FieldSpec::declare("cache", "pub", Some("-"));
    /// assert!(spec.omit);
    /// ```
    pub fn declare(ident: &'static str, visibility: &str, tag: Option<&'static str>) -> Self {
        let mut spec = FieldSpec {
            ident,
            wire_name: ident,
            omit: false,
            omit_if_default: false,
            visible: visibility == "pub",
        };

        if let Some(tag) = tag {
            let (name, options) = match tag.split_once(',') {
                Some((name, options)) => (name, Some(options)),
                None => (tag, None),
            };
            spec.omit = name == "-" && options.is_none();
            spec.omit_if_default = options
                .is_some_and(|options| options.split(',').any(|opt| opt.trim() == "omitempty"));
            if !name.is_empty() {
                spec.wire_name = name;
            }
        }

        spec
    }

    /// Returns true if the field can be encoded or decoded at all.
    pub fn is_candidate(&self) -> bool {
        self.visible && !self.omit
    }
}

/// Finds the field a dictionary key decodes into.
///
/// Fields are scanned in declaration order and the first candidate whose
/// wire name equals `wire_key` wins. Unknown keys resolve to `None`.
pub fn resolve(specs: &[FieldSpec], wire_key: &[u8]) -> Option<usize> {
    specs
        .iter()
        .position(|spec| spec.is_candidate() && spec.wire_name.as_bytes() == wire_key)
}

/// A fixed-shape aggregate of named fields, encoded as a dictionary.
///
/// Usually implemented through the [`record!`](crate::record) macro. A manual
/// implementation must return fields in the same order as `field_specs`.
pub trait Record {
    fn record_name(&self) -> &'static str;

    /// The field table, built once per type.
    fn field_specs(&self) -> &'static [FieldSpec];

    fn field(&self, index: usize) -> Option<&dyn Encode>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Decode>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::declare("name", "pub", None),
            FieldSpec::declare("piece_length", "pub", Some("piece length")),
            FieldSpec::declare("secret", "", None),
            FieldSpec::declare("internal", "pub(crate)", None),
            FieldSpec::declare("scratch", "pub", Some("-")),
            FieldSpec::declare("alias", "pub", Some("name")),
        ]
    }

    #[test]
    fn test_declare_defaults_to_identifier() {
        let spec = FieldSpec::declare("age", "pub", None);
        assert_eq!(spec.wire_name, "age");
        assert!(!spec.omit);
        assert!(!spec.omit_if_default);
        assert!(spec.visible);
    }

    #[test]
    fn test_declare_tags() {
        let spec = FieldSpec::declare("len", "pub", Some(",omitempty"));
        assert_eq!(spec.wire_name, "len");
        assert!(spec.omit_if_default);

        let spec = FieldSpec::declare("dash", "pub", Some("-,"));
        assert_eq!(spec.wire_name, "-");
        assert!(!spec.omit);

        let spec = FieldSpec::declare("skip", "pub", Some("-"));
        assert!(spec.omit);
        assert!(!spec.is_candidate());
    }

    #[test]
    fn test_resolve_by_wire_name() {
        let specs = specs();
        assert_eq!(resolve(&specs, b"piece length"), Some(1));
        assert_eq!(resolve(&specs, b"piece_length"), None);
    }

    #[test]
    fn test_resolve_first_match_wins() {
        assert_eq!(resolve(&specs(), b"name"), Some(0));
    }

    #[test]
    fn test_resolve_skips_hidden_and_omitted() {
        let specs = specs();
        assert_eq!(resolve(&specs, b"secret"), None);
        assert_eq!(resolve(&specs, b"internal"), None);
        assert_eq!(resolve(&specs, b"scratch"), None);
        assert_eq!(resolve(&specs, b"-"), None);
        assert_eq!(resolve(&specs, b"unknown"), None);
    }
}
