//! Key interpretation: NUL-terminated text or fixed-width binary blocks.

use crate::error::TableError;
use core::num::NonZeroUsize;

/// How a table reads the bytes behind a key reference. Chosen once at
/// construction and never changed for the life of the table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum KeyKind {
    /// Bytes up to the first NUL (or the whole slice when there is none).
    #[default]
    Text,
    /// Exactly `n` bytes; trailing bytes beyond `n` are ignored.
    FixedWidth(NonZeroUsize),
}

impl KeyKind {
    /// Map a raw key width to a kind: `0` means text, anything else is a
    /// fixed block of that many bytes.
    pub fn from_width(width: usize) -> Self {
        match NonZeroUsize::new(width) {
            Some(n) => KeyKind::FixedWidth(n),
            None => KeyKind::Text,
        }
    }

    /// The raw width, with `0` standing for text keys.
    pub fn width(&self) -> usize {
        match self {
            KeyKind::Text => 0,
            KeyKind::FixedWidth(n) => n.get(),
        }
    }
}

/// Equality and byte views for a single `KeyKind`.
#[derive(Copy, Clone, Debug)]
pub(crate) struct KeyCodec {
    kind: KeyKind,
}

impl KeyCodec {
    pub(crate) fn new(kind: KeyKind) -> Self {
        Self { kind }
    }

    pub(crate) fn kind(&self) -> KeyKind {
        self.kind
    }

    /// The significant bytes of `key`, or `InvalidArgument` when a
    /// fixed-width key is shorter than the width.
    pub(crate) fn view<'k>(&self, key: &'k [u8]) -> Result<&'k [u8], TableError> {
        match self.kind {
            KeyKind::Text => Ok(text_view(key)),
            KeyKind::FixedWidth(n) => key.get(..n.get()).ok_or_else(|| {
                TableError::InvalidArgument {
                    reason: format!("key has {} bytes, table expects {}", key.len(), n),
                }
            }),
        }
    }

    /// Compare two keys that have already been validated by `view`.
    ///
    /// Stored keys were validated on insert, so only the query needs
    /// checking before this is called.
    #[inline]
    pub(crate) fn eq(&self, stored: &[u8], query: &[u8]) -> bool {
        match self.kind {
            KeyKind::Text => text_view(stored) == text_view(query),
            KeyKind::FixedWidth(n) => stored[..n.get()] == query[..n.get()],
        }
    }
}

#[inline]
fn text_view(key: &[u8]) -> &[u8] {
    match key.iter().position(|&b| b == 0) {
        Some(end) => &key[..end],
        None => key,
    }
}
