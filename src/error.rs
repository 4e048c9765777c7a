//! Error types for zipcore

use std::io;

/// Result type for zipcore operations
pub type Result<T> = std::result::Result<T, SZipError>;

/// Error types that can occur while assembling or parsing a ZIP archive
#[derive(Debug)]
pub enum SZipError {
    /// I/O error from the underlying store
    Io(io::Error),
    /// The tail parser could not locate the EOCD signature, or a ZIP64
    /// EOCD locator pointed at an offset without the ZIP64 EOCD signature
    MalformedArchive(String),
    /// A 64-bit offset or size computation would overflow
    ArchiveTooLarge,
    /// Caller-supplied archive comment exceeds 65535 bytes
    CommentTooLong(usize),
}

impl std::fmt::Display for SZipError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SZipError::Io(e) => write!(f, "I/O error: {}", e),
            SZipError::MalformedArchive(msg) => write!(f, "malformed ZIP archive: {}", msg),
            SZipError::ArchiveTooLarge => {
                write!(f, "archive offset or size arithmetic overflowed 64 bits")
            }
            SZipError::CommentTooLong(len) => {
                write!(f, "comment length {} exceeds the 65535 byte limit", len)
            }
        }
    }
}

impl std::error::Error for SZipError {}

impl From<io::Error> for SZipError {
    fn from(err: io::Error) -> Self {
        SZipError::Io(err)
    }
}
