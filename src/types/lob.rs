//! LOB (Large Object) handles for CLOB, NCLOB and BLOB columns.
//!
//! Oracle LOBs come back from the driver in one of two shapes:
//! 1. **Prefetched**: the content is returned inline with the row data
//!    (when the LOB is small enough).
//! 2. **Locator**: only a locator handle is returned and the content is
//!    read or written separately through the driver.
//!
//! A locator obtained from a `SELECT ... FOR UPDATE` is the only way to
//! write content into a LOB column after the row was inserted with an
//! `EMPTY_CLOB()` / `EMPTY_BLOB()` placeholder.

use bytes::Bytes;

use crate::error::{Error, Result};

/// Which kind of LOB a locator points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    /// Character LOB.
    Clob,
    /// National character LOB.
    Nclob,
    /// Binary LOB.
    Blob,
}

impl LobKind {
    /// Whether content is character data.
    pub fn is_character(self) -> bool {
        matches!(self, LobKind::Clob | LobKind::Nclob)
    }
}

/// LOB locator handle returned by the driver.
///
/// The locator is an opaque byte sequence that identifies a specific LOB
/// in the database; only the driver interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct LobLocator {
    /// Raw locator bytes from the driver.
    pub locator: Vec<u8>,
    /// Total size of the LOB in characters (CLOB) or bytes (BLOB).
    pub size: u64,
    /// Recommended chunk size for read/write operations.
    pub chunk_size: u32,
    /// LOB flavour.
    pub kind: LobKind,
}

impl LobLocator {
    /// Create a new LOB locator.
    pub fn new(locator: Vec<u8>, kind: LobKind, size: u64, chunk_size: u32) -> Self {
        Self {
            locator,
            size,
            chunk_size,
            kind,
        }
    }

    /// Chunk size to use for streaming, never zero.
    pub fn effective_chunk_size(&self) -> u32 {
        if self.chunk_size == 0 {
            DEFAULT_LOB_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}

/// Chunk size used when the driver does not report one.
pub const DEFAULT_LOB_CHUNK_SIZE: u32 = 8132;

/// LOB value that may contain prefetched data or just a locator.
#[derive(Debug, Clone, PartialEq)]
pub struct LobValue {
    /// The LOB locator (always present).
    pub locator: LobLocator,
    /// Prefetched content, UTF-8 for character LOBs.
    pub data: Option<Bytes>,
}

impl LobValue {
    /// Create a LOB value with prefetched data.
    pub fn with_data(locator: LobLocator, data: impl Into<Bytes>) -> Self {
        Self {
            locator,
            data: Some(data.into()),
        }
    }

    /// Create a LOB value with only a locator (data must be fetched separately).
    pub fn locator_only(locator: LobLocator) -> Self {
        Self {
            locator,
            data: None,
        }
    }

    /// Check if the LOB data was prefetched.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Get the prefetched data as a string (character LOBs).
    pub fn as_string(&self) -> Option<Result<String>> {
        self.data.as_ref().map(|d| bytes_to_string(d))
    }

    /// Get the prefetched data as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// LOB size in characters (CLOB) or bytes (BLOB).
    pub fn size(&self) -> u64 {
        self.locator.size
    }

    /// The LOB flavour.
    pub fn kind(&self) -> LobKind {
        self.locator.kind
    }
}

/// Decode character LOB content.
pub(crate) fn bytes_to_string(data: &[u8]) -> Result<String> {
    String::from_utf8(data.to_vec())
        .map_err(|e| Error::type_conversion(format!("CLOB content is not valid UTF-8: {}", e)))
}
