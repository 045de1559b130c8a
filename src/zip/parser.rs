//! Central directory parsing.
//!
//! ZIP archives are read from the end: the End of Central Directory (EOCD)
//! record points at the central directory, which lists every member with its
//! sizes, checksum and the offset of its local header. ZIP64 archives store
//! the real values in a second EOCD record located through a locator that sits
//! immediately before the classic one.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};
use std::sync::Arc;
use tracing::debug;

use crate::error::ArchiveError;
use crate::io::ReadAt;

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
const MAX_COMMENT_SIZE: u64 = u16::MAX as u64;

/// Location and size of the central directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Directory {
    offset: u64,
    size: u64,
    entries: u64,
}

/// Low-level ZIP parser over any [`ReadAt`] source.
///
/// Typically used through [`ZipExtractor`](super::ZipExtractor).
pub struct ZipParser<R: ReadAt> {
    reader: Arc<R>,
    size: u64,
}

impl<R: ReadAt> ZipParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Find the EOCD record and its offset in the archive.
    ///
    /// Archives without a comment end with the record, so the last 22 bytes are
    /// tried first. Otherwise the tail is scanned backwards for a signature whose
    /// comment length reaches exactly to the end of the file.
    pub async fn find_eocd(&self) -> Result<(EocdRecord, u64), ArchiveError> {
        let record_size = EocdRecord::SIZE as u64;
        if self.size < record_size {
            return Err(ArchiveError::NotZip);
        }

        let offset = self.size - record_size;
        let mut buf = vec![0u8; EocdRecord::SIZE];
        self.reader.read_exact_at(offset, &mut buf).await?;
        if buf.starts_with(EocdRecord::SIGNATURE) && buf[20..22] == [0, 0] {
            return Ok((EocdRecord::from_bytes(&buf)?, offset));
        }

        let search_size = (MAX_COMMENT_SIZE + record_size).min(self.size);
        let search_start = self.size - search_size;
        let mut buf = vec![0u8; search_size as usize];
        self.reader.read_exact_at(search_start, &mut buf).await?;

        for i in (0..=buf.len() - EocdRecord::SIZE).rev() {
            if !buf[i..].starts_with(EocdRecord::SIGNATURE) {
                continue;
            }
            let eocd = EocdRecord::from_bytes(&buf[i..i + EocdRecord::SIZE])?;
            if eocd.comment_len as usize == buf.len() - i - EocdRecord::SIZE {
                return Ok((eocd, search_start + i as u64));
            }
        }

        Err(ArchiveError::NotZip)
    }

    async fn read_zip64_eocd(&self, eocd_offset: u64) -> Result<Zip64EocdRecord, ArchiveError> {
        let locator_offset = eocd_offset
            .checked_sub(Zip64Locator::SIZE as u64)
            .ok_or_else(|| ArchiveError::corrupt("missing ZIP64 locator"))?;
        let mut locator_buf = vec![0u8; Zip64Locator::SIZE];
        self.reader
            .read_exact_at(locator_offset, &mut locator_buf)
            .await?;
        let locator = Zip64Locator::from_bytes(&locator_buf)?;

        if locator.eocd64_offset + Zip64EocdRecord::MIN_SIZE as u64 > locator_offset {
            return Err(ArchiveError::corrupt("ZIP64 record offset out of range"));
        }
        let mut record_buf = vec![0u8; Zip64EocdRecord::MIN_SIZE];
        self.reader
            .read_exact_at(locator.eocd64_offset, &mut record_buf)
            .await?;
        Zip64EocdRecord::from_bytes(&record_buf)
    }

    async fn directory(&self) -> Result<Directory, ArchiveError> {
        let (eocd, eocd_offset) = self.find_eocd().await?;

        let directory = if eocd.is_zip64() {
            let eocd64 = self.read_zip64_eocd(eocd_offset).await?;
            Directory {
                offset: eocd64.cd_offset,
                size: eocd64.cd_size,
                entries: eocd64.total_entries,
            }
        } else {
            Directory {
                offset: eocd.cd_offset.into(),
                size: eocd.cd_size.into(),
                entries: eocd.total_entries.into(),
            }
        };

        let end = directory
            .offset
            .checked_add(directory.size)
            .filter(|end| *end <= eocd_offset);
        if end.is_none() {
            return Err(ArchiveError::corrupt(
                "central directory extends past end of archive",
            ));
        }
        if directory.entries.saturating_mul(CDFH_MIN_SIZE as u64) > directory.size {
            return Err(ArchiveError::corrupt(
                "central directory too small for its entry count",
            ));
        }

        debug!(
            offset = directory.offset,
            size = directory.size,
            entries = directory.entries,
            zip64 = eocd.is_zip64(),
            "located central directory"
        );
        Ok(directory)
    }

    /// List every member recorded in the central directory.
    pub async fn list_entries(&self) -> Result<Vec<ZipEntry>, ArchiveError> {
        let directory = self.directory().await?;

        let mut cd_data = vec![0u8; directory.size as usize];
        self.reader
            .read_exact_at(directory.offset, &mut cd_data)
            .await?;

        let mut cursor = Cursor::new(cd_data.as_slice());
        (0..directory.entries)
            .map(|_| {
                parse_cdfh(&mut cursor)
                    .map_err(|err| ArchiveError::corrupt(format!("central directory: {err}")))
            })
            .collect()
    }

    /// Offset of the first data byte of `entry`, past its local header.
    pub async fn data_offset(&self, entry: &ZipEntry) -> Result<u64, ArchiveError> {
        let mut lfh_buf = [0u8; LFH_SIZE];
        self.reader
            .read_exact_at(entry.lfh_offset, &mut lfh_buf)
            .await
            .map_err(|_| {
                ArchiveError::corrupt(format!(
                    "local header of `{}` out of range",
                    entry.file_name
                ))
            })?;

        if !lfh_buf.starts_with(LFH_SIGNATURE) {
            return Err(ArchiveError::corrupt(format!(
                "invalid local file header for `{}`",
                entry.file_name
            )));
        }

        // Name and extra lengths may differ from the central directory copy
        let file_name_length = u16::from_le_bytes([lfh_buf[26], lfh_buf[27]]) as u64;
        let extra_field_length = u16::from_le_bytes([lfh_buf[28], lfh_buf[29]]) as u64;

        Ok(entry.lfh_offset + LFH_SIZE as u64 + file_name_length + extra_field_length)
    }

    pub fn reader(&self) -> &Arc<R> {
        &self.reader
    }
}

fn parse_cdfh(cursor: &mut Cursor<&[u8]>) -> std::io::Result<ZipEntry> {
    let mut sig = [0u8; 4];
    cursor.read_exact(&mut sig)?;
    if sig != CDFH_SIGNATURE {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "invalid file header signature",
        ));
    }

    let _version_made_by = cursor.read_u16::<LittleEndian>()?;
    let _version_needed = cursor.read_u16::<LittleEndian>()?;
    let flags = cursor.read_u16::<LittleEndian>()?;
    let compression_method = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_time = cursor.read_u16::<LittleEndian>()?;
    let _last_mod_date = cursor.read_u16::<LittleEndian>()?;
    let crc32 = cursor.read_u32::<LittleEndian>()?;
    let mut compressed_size = u64::from(cursor.read_u32::<LittleEndian>()?);
    let mut uncompressed_size = u64::from(cursor.read_u32::<LittleEndian>()?);
    let file_name_length = cursor.read_u16::<LittleEndian>()?;
    let extra_field_length = cursor.read_u16::<LittleEndian>()?;
    let file_comment_length = cursor.read_u16::<LittleEndian>()?;
    let _disk_number_start = cursor.read_u16::<LittleEndian>()?;
    let _internal_attrs = cursor.read_u16::<LittleEndian>()?;
    let _external_attrs = cursor.read_u32::<LittleEndian>()?;
    let mut lfh_offset = u64::from(cursor.read_u32::<LittleEndian>()?);

    let mut file_name_bytes = vec![0u8; file_name_length as usize];
    cursor.read_exact(&mut file_name_bytes)?;
    let file_name = String::from_utf8_lossy(&file_name_bytes).into_owned();

    let mut extra = vec![0u8; extra_field_length as usize];
    cursor.read_exact(&mut extra)?;
    let mut extra = Cursor::new(extra.as_slice());
    let extra_end = extra.get_ref().len() as u64;

    while extra.position() + 4 <= extra_end {
        let header_id = extra.read_u16::<LittleEndian>()?;
        let field_size = u64::from(extra.read_u16::<LittleEndian>()?);
        let field_end = (extra.position() + field_size).min(extra_end);

        if header_id == ZIP64_EXTRA_ID {
            // Only the saturated header fields are present, in this order
            if uncompressed_size == u64::from(u32::MAX) && extra.position() + 8 <= field_end {
                uncompressed_size = extra.read_u64::<LittleEndian>()?;
            }
            if compressed_size == u64::from(u32::MAX) && extra.position() + 8 <= field_end {
                compressed_size = extra.read_u64::<LittleEndian>()?;
            }
            if lfh_offset == u64::from(u32::MAX) && extra.position() + 8 <= field_end {
                lfh_offset = extra.read_u64::<LittleEndian>()?;
            }
        }
        extra.set_position(field_end);
    }

    let mut comment = vec![0u8; file_comment_length as usize];
    cursor.read_exact(&mut comment)?;

    Ok(ZipEntry {
        file_name,
        flags,
        compression_method: CompressionMethod::from_u16(compression_method),
        compressed_size,
        uncompressed_size,
        crc32,
        lfh_offset,
    })
}
