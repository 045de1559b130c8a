//! The end-to-end conversion: extract, then print the outline.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ArchiveError, Result};
use crate::io::LocalFileReader;
use crate::outline::{OutlineWriter, read_document};
use crate::zip::{CONTENT_MEMBER, ZipExtractor};

/// Extract [`CONTENT_MEMBER`] from `archive` into `dest_dir` and write its
/// outline to `out`.
///
/// Nothing is written when the archive step fails. The marker line is written
/// before the document is parsed, so a malformed document leaves exactly that
/// line behind. Returns the number of lines written.
pub async fn convert<W: Write>(archive: &Path, dest_dir: &Path, out: W) -> Result<usize> {
    let reader = LocalFileReader::new(archive).map_err(ArchiveError::from)?;
    let extractor = ZipExtractor::new(Arc::new(reader));
    let content_path = extractor.extract_member(CONTENT_MEMBER, dest_dir).await?;

    let mut writer = OutlineWriter::new(out);
    writer.begin()?;

    let root = read_document(&content_path).await?;
    writer.write_tree(&root)?;

    debug!(
        nodes = root.subtree_size(),
        lines = writer.lines_written(),
        "outline written"
    );
    Ok(writer.lines_written())
}
