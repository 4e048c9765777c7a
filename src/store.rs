//! Store adapter: a thin positional I/O contract over the byte-transport
//! backend. The core depends only on this trait — never on
//! `std::fs` or `std::io::Seek` directly — so the same Assembler runs
//! over a local file or, with a different impl, a remote object store.
//!
//! Grounded in `s-zip`'s own backend split (`writer.rs` takes a
//! `std::fs::File`; `examples/arbitrary_writer.rs` instead wraps a
//! `Cursor<Vec<u8>>`) generalized into an explicit trait, since this
//! crate never holds an implicit stream cursor.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Metadata returned by `RandomAccessStore::stat`.
#[derive(Debug, Clone, Copy)]
pub struct StoreStat {
    pub exists: bool,
    pub len: u64,
}

/// Positional read/write/stat/open/close over a byte-addressable backend.
/// No method implies or advances an internal cursor; every offset is
/// explicit, so the Assembler's own `writeOffset` bookkeeping is the only
/// source of truth.
pub trait RandomAccessStore {
    /// Open (or create) the backing object for reading and writing. Must
    /// be idempotent: calling it again on an already-open store is a
    /// no-op.
    fn open(&mut self) -> Result<()>;

    /// Current size and existence of the backing object. Implementations
    /// that create lazily on `open` should report `exists = true` with
    /// `len = 0` for a freshly created, empty object.
    fn stat(&mut self) -> Result<StoreStat>;

    /// Read exactly `buf.len()` bytes starting at the given absolute
    /// offset.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Write all of `buf` starting at the given absolute offset.
    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()>;

    /// Flush and release any resources held by the store.
    fn close(&mut self) -> Result<()>;
}

/// Local-filesystem backed store. The default implementation a caller
/// reaches for, the way `s-zip`'s `StreamingZipWriter` wraps a
/// `std::fs::File` directly.
pub struct FileStore {
    path: PathBuf,
    file: Option<File>,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        if self.file.is_none() {
            self.open()?;
        }
        Ok(self.file.as_mut().expect("opened above"))
    }
}

impl RandomAccessStore for FileStore {
    fn open(&mut self) -> Result<()> {
        if self.file.is_some() {
            return Ok(());
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&self.path)?;
        self.file = Some(file);
        Ok(())
    }

    fn stat(&mut self) -> Result<StoreStat> {
        let existed = self.path.exists();
        let file = self.file_mut()?;
        let len = file.metadata()?.len();
        Ok(StoreStat {
            exists: existed || len > 0,
            len,
        })
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        let file = self.file_mut()?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(buf)?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        self.file = None;
        Ok(())
    }
}

/// In-memory store, grounded in `s-zip`'s own
/// `examples/arbitrary_writer.rs` pattern of writing into a
/// `Cursor<Vec<u8>>`. Used by this crate's own tests/benches to exercise
/// the Assembler without touching disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    buf: Vec<u8>,
    opened: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl RandomAccessStore for MemoryStore {
    fn open(&mut self) -> Result<()> {
        self.opened = true;
        Ok(())
    }

    fn stat(&mut self) -> Result<StoreStat> {
        Ok(StoreStat {
            exists: self.opened && !self.buf.is_empty(),
            len: self.buf.len() as u64,
        })
    }

    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let offset = offset as usize;
        let end = offset + buf.len();
        if end > self.buf.len() {
            return Err(crate::error::SZipError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "read past end of in-memory store",
            )));
        }
        buf.copy_from_slice(&self.buf[offset..end]);
        Ok(())
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        let offset = offset as usize;
        let end = offset + buf.len();
        if end > self.buf.len() {
            self.buf.resize(end, 0);
        }
        self.buf[offset..end].copy_from_slice(buf);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.opened = false;
        Ok(())
    }
}

/// Convenience for opening a `FileStore` at a path, mirroring the
/// teacher's `StreamingZipWriter::new(path)` constructor shape.
pub fn file_store(path: impl AsRef<Path>) -> FileStore {
    FileStore::new(path.as_ref().to_path_buf())
}
