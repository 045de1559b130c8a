//! # xmind2yaml
//!
//! Flattens the outline of an XMind mind map into indented YAML-style text.
//!
//! An `.xmind` file is a ZIP package whose `content.xml` member holds the map.
//! This library extracts that member, parses it into a tree and prints every
//! topic title as `{indent}{title}:`, indenting one space per level of nesting.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> xmind2yaml::Result<()> {
//!     // Writes ./content.xml, then prints "---" and one line per leaf title
//!     xmind2yaml::convert(Path::new("ideas.xmind"), Path::new("."), std::io::stdout()).await?;
//!     Ok(())
//! }
//! ```
//!
//! The steps are also available separately: [`ZipExtractor`] pulls a member
//! out of the package, [`outline::parse_document`] builds the [`Node`] tree and
//! [`OutlineWriter`] renders it.

pub mod cli;
pub mod convert;
pub mod error;
pub mod io;
pub mod outline;
pub mod zip;

pub use cli::Cli;
pub use convert::convert;
pub use error::{ArchiveError, Error, ParseError, Result};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use outline::{Node, OutlineWriter};
pub use crate::zip::{CONTENT_MEMBER, ZipEntry, ZipExtractor};
