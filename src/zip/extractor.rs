use flate2::Crc;
use flate2::read::DeflateDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

use crate::error::ArchiveError;
use crate::io::ReadAt;

use super::parser::ZipParser;
use super::structures::{CompressionMethod, ZipEntry};

/// ZIP member extractor
pub struct ZipExtractor<R: ReadAt> {
    parser: ZipParser<R>,
}

impl<R: ReadAt> ZipExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self {
            parser: ZipParser::new(reader),
        }
    }

    /// List all members of the archive
    pub async fn list_entries(&self) -> Result<Vec<ZipEntry>, ArchiveError> {
        self.parser.list_entries().await
    }

    /// Look up a member by its exact name
    pub async fn find_entry(&self, name: &str) -> Result<ZipEntry, ArchiveError> {
        self.list_entries()
            .await?
            .into_iter()
            .find(|entry| entry.file_name == name)
            .ok_or_else(|| ArchiveError::MissingMember(name.to_string()))
    }

    /// Decode a member into memory, verifying its CRC-32
    pub async fn read_entry(&self, entry: &ZipEntry) -> Result<Vec<u8>, ArchiveError> {
        if entry.is_encrypted() {
            return Err(ArchiveError::Encrypted(entry.file_name.clone()));
        }

        let data_offset = self.parser.data_offset(entry).await?;
        let in_bounds = data_offset
            .checked_add(entry.compressed_size)
            .is_some_and(|end| end <= self.parser.reader().size());
        if !in_bounds {
            return Err(ArchiveError::corrupt(format!(
                "`{}` claims {} bytes past the end of the archive",
                entry.file_name, entry.compressed_size
            )));
        }

        let mut raw = vec![0u8; entry.compressed_size as usize];
        self.parser
            .reader()
            .read_exact_at(data_offset, &mut raw)
            .await
            .map_err(|_| {
                ArchiveError::corrupt(format!("data of `{}` is truncated", entry.file_name))
            })?;

        let data = match entry.compression_method {
            CompressionMethod::Stored => raw,
            CompressionMethod::Deflate => {
                // One byte past the declared size is enough to detect a lie
                let mut data = Vec::new();
                DeflateDecoder::new(raw.as_slice())
                    .take(entry.uncompressed_size.saturating_add(1))
                    .read_to_end(&mut data)
                    .map_err(|err| {
                        ArchiveError::corrupt(format!(
                            "cannot inflate `{}`: {err}",
                            entry.file_name
                        ))
                    })?;
                data
            }
            CompressionMethod::Unknown(_) => {
                return Err(ArchiveError::UnsupportedCompression {
                    name: entry.file_name.clone(),
                    method: entry.compression_method.as_u16(),
                });
            }
        };

        if data.len() as u64 != entry.uncompressed_size {
            return Err(ArchiveError::corrupt(format!(
                "`{}` decoded to {} bytes, expected {}",
                entry.file_name,
                data.len(),
                entry.uncompressed_size
            )));
        }

        let mut crc = Crc::new();
        crc.update(&data);
        if crc.sum() != entry.crc32 {
            return Err(ArchiveError::ChecksumMismatch {
                name: entry.file_name.clone(),
                expected: entry.crc32,
                actual: crc.sum(),
            });
        }

        debug!(
            name = %entry.file_name,
            method = entry.compression_method.as_u16(),
            compressed = entry.compressed_size,
            size = entry.uncompressed_size,
            "decoded member"
        );
        Ok(data)
    }

    /// Extract the member called `name` into `dest_dir`, keeping its name.
    ///
    /// Creates `dest_dir` when missing and silently replaces an existing file.
    /// Returns the path that was written.
    pub async fn extract_member(
        &self,
        name: &str,
        dest_dir: &Path,
    ) -> Result<PathBuf, ArchiveError> {
        let entry = self.find_entry(name).await?;
        let data = self.read_entry(&entry).await?;

        let output_path = dest_dir.join(&entry.file_name);
        let write_err = |source| ArchiveError::Write {
            path: output_path.clone(),
            source,
        };
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(write_err)?;
            }
        }
        fs::write(&output_path, &data).await.map_err(write_err)?;

        info!(path = %output_path.display(), bytes = data.len(), "extracted member");
        Ok(output_path)
    }
}
