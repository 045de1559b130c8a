use std::io::{self, Write};

use super::node::Node;
use super::walk::{Step, walk};

/// First line of every outline, marking the start of a YAML document.
pub const DOCUMENT_START: &str = "---";

/// Streams an outline as text, one line per leaf title.
///
/// Lines are flushed as they are produced, so output written before a later
/// failure stays visible.
pub struct OutlineWriter<W: Write> {
    out: W,
    lines: usize,
}

impl<W: Write> OutlineWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    /// Write the document-start marker.
    pub fn begin(&mut self) -> io::Result<()> {
        self.line(DOCUMENT_START)
    }

    /// Write one `{indent}{text}:` line per leaf title of `root`.
    pub fn write_tree(&mut self, root: &Node) -> io::Result<()> {
        for step in walk(root) {
            if let Step::Leaf { depth, text } = step {
                self.line(&format_leaf(depth, text))?;
            }
        }
        Ok(())
    }

    /// Lines written so far, marker included.
    pub fn lines_written(&self) -> usize {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        self.lines += 1;
        Ok(())
    }
}

/// One space of indentation per level of depth.
pub fn format_leaf(depth: usize, text: &str) -> String {
    format!("{:depth$}{text}:", "")
}

/// The complete outline of `root` as lines, starting with [`DOCUMENT_START`].
pub fn outline_lines(root: &Node) -> Vec<String> {
    std::iter::once(DOCUMENT_START.to_string())
        .chain(walk(root).filter_map(|step| match step {
            Step::Leaf { depth, text } => Some(format_leaf(depth, text)),
            Step::Annotated { .. } => None,
        }))
        .collect()
}
