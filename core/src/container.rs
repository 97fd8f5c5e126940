//! ZIP container access for `.xlsx` packages.
//!
//! An `.xlsx` workbook is a ZIP archive of XML parts. [`XlsxContainer`]
//! wraps the archive, validates the package marker (`[Content_Types].xml`),
//! and enforces size limits so a malformed workbook cannot exhaust memory
//! at startup.

use std::io::{Read, Seek};
use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

/// Caps applied while reading the package.
#[derive(Debug, Clone, Copy)]
pub struct ContainerLimits {
    pub max_entries: usize,
    pub max_part_uncompressed_bytes: u64,
}

impl Default for ContainerLimits {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_part_uncompressed_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContainerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a ZIP container")]
    NotZipContainer,
    #[error("not an Office package (missing [Content_Types].xml)")]
    NotOfficePackage,
    #[error("archive has too many entries: {entries} (limit: {max_entries})")]
    TooManyEntries { entries: usize, max_entries: usize },
    #[error("part '{path}' is too large: {size} bytes (limit: {limit} bytes)")]
    PartTooLarge { path: String, size: u64, limit: u64 },
    #[error("part not found in archive: {path}")]
    PartMissing { path: String },
    #[error("failed to read part '{path}': {reason}")]
    PartRead { path: String, reason: String },
}

pub(crate) trait ReadSeek: Read + Seek {}
impl<T: Read + Seek> ReadSeek for T {}

pub struct XlsxContainer {
    archive: ZipArchive<Box<dyn ReadSeek>>,
    limits: ContainerLimits,
}

impl XlsxContainer {
    pub fn open<R: Read + Seek + 'static>(reader: R) -> Result<XlsxContainer, ContainerError> {
        Self::open_with_limits(reader, ContainerLimits::default())
    }

    pub fn open_with_limits<R: Read + Seek + 'static>(
        reader: R,
        limits: ContainerLimits,
    ) -> Result<XlsxContainer, ContainerError> {
        let reader: Box<dyn ReadSeek> = Box::new(reader);
        let archive = ZipArchive::new(reader).map_err(|err| match err {
            ZipError::InvalidArchive(_) | ZipError::UnsupportedArchive(_) => {
                ContainerError::NotZipContainer
            }
            ZipError::Io(e) => ContainerError::Io(e),
            other => ContainerError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                other.to_string(),
            )),
        })?;

        if archive.len() > limits.max_entries {
            return Err(ContainerError::TooManyEntries {
                entries: archive.len(),
                max_entries: limits.max_entries,
            });
        }

        let mut container = XlsxContainer { archive, limits };

        if container.archive.by_name("[Content_Types].xml").is_err() {
            return Err(ContainerError::NotOfficePackage);
        }

        Ok(container)
    }

    pub fn open_path(path: impl AsRef<std::path::Path>) -> Result<XlsxContainer, ContainerError> {
        let file = std::fs::File::open(path)?;
        Self::open(file)
    }

    /// Read one part, enforcing the per-part size limit.
    pub fn read_part(&mut self, name: &str) -> Result<Vec<u8>, ContainerError> {
        let mut file = self.archive.by_name(name).map_err(|err| match err {
            ZipError::FileNotFound => ContainerError::PartMissing {
                path: name.to_string(),
            },
            other => ContainerError::PartRead {
                path: name.to_string(),
                reason: other.to_string(),
            },
        })?;

        let size = file.size();
        if size > self.limits.max_part_uncompressed_bytes {
            return Err(ContainerError::PartTooLarge {
                path: name.to_string(),
                size,
                limit: self.limits.max_part_uncompressed_bytes,
            });
        }

        let mut buf = Vec::new();
        file.read_to_end(&mut buf)
            .map_err(|err| ContainerError::PartRead {
                path: name.to_string(),
                reason: err.to_string(),
            })?;
        Ok(buf)
    }

    /// Read one part, returning `None` when it is absent.
    pub fn read_part_optional(&mut self, name: &str) -> Result<Option<Vec<u8>>, ContainerError> {
        match self.read_part(name) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(ContainerError::PartMissing { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
