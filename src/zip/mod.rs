//! ZIP container support.
//!
//! Mind-map documents are ZIP packages; the outline lives in one XML member.
//! This module reads the central directory of such a package and extracts a
//! single named member from it.
//!
//! - [`structures`]: record layouts (EOCD, ZIP64 records, entries)
//! - [`parser`]: central directory parsing over a [`ReadAt`](crate::io::ReadAt) source
//! - [`extractor`]: member lookup, decoding and extraction to disk
//!
//! STORED and DEFLATE members are supported, including ZIP64 archives.
//! Encrypted members, multi-disk archives and other compression methods are not.

mod extractor;
mod parser;
mod structures;

pub use extractor::ZipExtractor;
pub use parser::ZipParser;
pub use structures::*;

/// Name of the archive member holding the mind-map outline.
pub const CONTENT_MEMBER: &str = "content.xml";
