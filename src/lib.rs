//! # zipcore: streaming ZIP/ZIP64 archive assembler
//!
//! `zipcore` builds and appends to stored-only (uncompressed) ZIP
//! archives over a random-access byte store, promoting transparently to
//! ZIP64 once any size, offset, or entry-count field would overflow.
//! Compression and CRC-32 computation are the caller's job; this crate
//! only assembles the Local File Header / Central Directory File Header
//! / EOCD family of records and keeps their counters correct.
//!
//! ## Quick start
//!
//! ```no_run
//! use zipcore::{Assembler, FileStore};
//!
//! let mut store = FileStore::new("archive.zip");
//! let mut asm = Assembler::open(&mut store)?;
//!
//! let data = b"Hello, World!";
//! let crc = crc32fast::hash(data);
//! asm.append(&mut store, b"file1.txt", crc, data.len() as u64, 1_700_000_000, 0o644)?;
//! asm.write_file_data(&mut store, data, 0)?;
//!
//! asm.finalize(&mut store)?;
//! asm.close(&mut store)?;
//! # Ok::<(), zipcore::SZipError>(())
//! ```

pub mod assembler;
pub mod codec;
pub mod dos_time;
pub mod error;
pub mod model;
pub mod store;
pub mod tail;

pub use assembler::Assembler;
pub use error::{Result, SZipError};
pub use store::{FileStore, MemoryStore, RandomAccessStore, StoreStat};
