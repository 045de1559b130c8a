use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;

use crate::error::ArchiveError;

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

fn truncated(record: &str) -> ArchiveError {
    ArchiveError::corrupt(format!("truncated {record}"))
}

/// End of Central Directory record, 22 bytes plus a trailing comment
#[derive(Debug)]
pub struct EocdRecord {
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EocdRecord {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() < Self::SIZE || !data.starts_with(Self::SIGNATURE) {
            return Err(ArchiveError::NotZip);
        }

        // Skip the two disk-number fields; multi-disk archives are not supported
        let mut cursor = Cursor::new(&data[8..Self::SIZE]);
        let read = |c: &mut Cursor<&[u8]>| -> std::io::Result<Self> {
            Ok(Self {
                disk_entries: c.read_u16::<LittleEndian>()?,
                total_entries: c.read_u16::<LittleEndian>()?,
                cd_size: c.read_u32::<LittleEndian>()?,
                cd_offset: c.read_u32::<LittleEndian>()?,
                comment_len: c.read_u16::<LittleEndian>()?,
            })
        };
        read(&mut cursor).map_err(|_| truncated("end of central directory"))
    }

    /// Any saturated field means the real value lives in the ZIP64 record.
    pub fn is_zip64(&self) -> bool {
        self.disk_entries == u16::MAX
            || self.total_entries == u16::MAX
            || self.cd_size == u32::MAX
            || self.cd_offset == u32::MAX
    }
}

/// ZIP64 End of Central Directory Locator, 20 bytes, directly before the EOCD
#[derive(Debug)]
pub struct Zip64Locator {
    pub eocd64_offset: u64,
}

impl Zip64Locator {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x07";
    pub const SIZE: usize = 20;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() < Self::SIZE || !data.starts_with(Self::SIGNATURE) {
            return Err(ArchiveError::corrupt("missing ZIP64 locator"));
        }

        let mut cursor = Cursor::new(&data[8..16]);
        let eocd64_offset = cursor
            .read_u64::<LittleEndian>()
            .map_err(|_| truncated("ZIP64 locator"))?;
        Ok(Self { eocd64_offset })
    }
}

/// ZIP64 End of Central Directory record, 56 bytes minimum
#[derive(Debug)]
pub struct Zip64EocdRecord {
    pub total_entries: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
}

impl Zip64EocdRecord {
    pub const SIGNATURE: &'static [u8] = b"PK\x06\x06";
    pub const MIN_SIZE: usize = 56;

    pub fn from_bytes(data: &[u8]) -> Result<Self, ArchiveError> {
        if data.len() < Self::MIN_SIZE || !data.starts_with(Self::SIGNATURE) {
            return Err(ArchiveError::corrupt("missing ZIP64 end of central directory"));
        }

        // Entries on this disk (8 bytes) precede the fields we keep
        let mut cursor = Cursor::new(&data[32..Self::MIN_SIZE]);
        let read = |c: &mut Cursor<&[u8]>| -> std::io::Result<Self> {
            Ok(Self {
                total_entries: c.read_u64::<LittleEndian>()?,
                cd_size: c.read_u64::<LittleEndian>()?,
                cd_offset: c.read_u64::<LittleEndian>()?,
            })
        };
        read(&mut cursor).map_err(|_| truncated("ZIP64 end of central directory"))
    }
}

/// Central Directory File Header, 46 bytes plus variable fields
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header, 30 bytes plus variable fields
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// General purpose flag bit marking an encrypted member
pub const FLAG_ENCRYPTED: u16 = 0x0001;

/// Extra field header id of the ZIP64 extended information block
pub const ZIP64_EXTRA_ID: u16 = 0x0001;

/// One member as described by the central directory
#[derive(Debug, Clone)]
pub struct ZipEntry {
    pub file_name: String,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub crc32: u32,
    pub lfh_offset: u64,
}

impl ZipEntry {
    pub fn is_encrypted(&self) -> bool {
        self.flags & FLAG_ENCRYPTED != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eocd_fields() {
        let mut raw = Vec::new();
        raw.extend_from_slice(EocdRecord::SIGNATURE);
        raw.extend_from_slice(&[0, 0, 0, 0]); // disk numbers
        raw.extend_from_slice(&3u16.to_le_bytes());
        raw.extend_from_slice(&3u16.to_le_bytes());
        raw.extend_from_slice(&150u32.to_le_bytes());
        raw.extend_from_slice(&1024u32.to_le_bytes());
        raw.extend_from_slice(&0u16.to_le_bytes());

        let eocd = EocdRecord::from_bytes(&raw).unwrap();
        assert_eq!(eocd.total_entries, 3);
        assert_eq!(eocd.cd_size, 150);
        assert_eq!(eocd.cd_offset, 1024);
        assert!(!eocd.is_zip64());
    }

    #[test]
    fn eocd_rejects_wrong_signature() {
        let raw = [0u8; EocdRecord::SIZE];
        assert!(matches!(
            EocdRecord::from_bytes(&raw),
            Err(ArchiveError::NotZip)
        ));
    }

    #[test]
    fn saturated_fields_mean_zip64() {
        let eocd = EocdRecord {
            disk_entries: 1,
            total_entries: 1,
            cd_size: 10,
            cd_offset: u32::MAX,
            comment_len: 0,
        };
        assert!(eocd.is_zip64());
    }

    #[test]
    fn encrypted_flag() {
        let entry = ZipEntry {
            file_name: "content.xml".into(),
            flags: FLAG_ENCRYPTED,
            compression_method: CompressionMethod::Deflate,
            compressed_size: 0,
            uncompressed_size: 0,
            crc32: 0,
            lfh_offset: 0,
        };
        assert!(entry.is_encrypted());
    }
}
