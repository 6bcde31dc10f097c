//! Codec limits and wire-format tag bytes.

// ============================================================================
// Limits
// ============================================================================

/// Default maximum nesting depth of lists and dictionaries while decoding.
pub const MAX_DEPTH: usize = 64;

// ============================================================================
// Wire tags
// ============================================================================

/// Leading byte of an integer (`i42e`).
pub const INTEGER_TAG: u8 = b'i';

/// Leading byte of a list (`l...e`).
pub const LIST_TAG: u8 = b'l';

/// Leading byte of a dictionary (`d...e`).
pub const DICT_TAG: u8 = b'd';

/// Terminator of integers, lists and dictionaries.
pub const END_TAG: u8 = b'e';

/// Separator between a byte string's length and its contents (`4:spam`).
pub const LENGTH_SEPARATOR: u8 = b':';
