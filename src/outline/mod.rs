//! Mind-map outline extraction.
//!
//! The content document is parsed into a [`Node`] tree by [`parse_document`],
//! walked in pre-order by [`walk`], and rendered by [`OutlineWriter`] as
//! YAML-style lines: a `---` marker followed by one `{indent}{title}:` line per
//! leaf title, indented one space per level of depth.

mod node;
mod reader;
mod walk;
mod writer;

pub use node::{Attribute, Node, QName, TITLE_LOCAL_NAME, XMIND_CONTENT_NS};
pub use reader::{parse_document, read_document};
pub use walk::{AttrKey, Step, Walk, annotated_attributes, walk};
pub use writer::{DOCUMENT_START, OutlineWriter, format_leaf, outline_lines};
