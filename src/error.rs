//! Error types for xmind2yaml.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the library.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Top-level failure of a conversion run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Writing the outline failed (closed pipe, full disk, ...).
    #[error("failed to write outline: {0}")]
    Io(#[from] io::Error),
}

/// The archive could not be opened, read or extracted from.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot read archive: {0}")]
    Io(#[from] io::Error),

    #[error("not a ZIP archive (no end of central directory record)")]
    NotZip,

    #[error("corrupt archive: {0}")]
    Corrupt(String),

    #[error("archive has no member named `{0}`")]
    MissingMember(String),

    #[error("member `{name}` uses unsupported compression method {method}")]
    UnsupportedCompression { name: String, method: u16 },

    #[error("member `{0}` is encrypted")]
    Encrypted(String),

    #[error("member `{name}` failed CRC check (expected {expected:08x}, got {actual:08x})")]
    ChecksumMismatch {
        name: String,
        expected: u32,
        actual: u32,
    },

    #[error("cannot write `{}`: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::Corrupt(msg.into())
    }
}

/// The extracted document is not well-formed XML.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("cannot read document: {0}")]
    Io(#[from] io::Error),

    #[error("document is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },

    #[error("unbound namespace prefix `{prefix}` at byte {position}")]
    UnboundPrefix { prefix: String, position: u64 },

    #[error("document has no root element")]
    NoRoot,

    #[error("content outside the root element at byte {0}")]
    OutsideRoot(u64),

    #[error("document ends inside element <{0}>")]
    Unclosed(String),
}
