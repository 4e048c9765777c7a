//! Concrete scenarios, mirroring the numbered cases a reviewer would
//! check by hand: an empty small file, an exactly-4-GiB payload, a
//! classic archive crossing the 4 GiB boundary on append, a 70,000-entry
//! archive, a truncated archive, and a UTF-8 filename.
//!
//! The multi-gigabyte scenarios assert on the Assembler's trailer state
//! right after `append` rather than writing real payload bytes to a
//! backing buffer — the point under test is the counter/sentinel
//! bookkeeping, not moving gigabytes of zeroes through memory.

use std::io;
use zipcore::{Assembler, MemoryStore, RandomAccessStore, Result, StoreStat};

/// A store that records write offsets/lengths without actually
/// allocating a backing buffer, so tests that cross multi-gigabyte
/// offsets stay cheap. Only `write_at`/`open`/`stat`/`close` are
/// exercised by the scenarios below; reading back an never-materialized
/// archive isn't meaningful.
#[derive(Default)]
struct RecordingStore {
    writes: Vec<(u64, usize)>,
}

impl RandomAccessStore for RecordingStore {
    fn open(&mut self) -> Result<()> {
        Ok(())
    }

    fn stat(&mut self) -> Result<StoreStat> {
        Ok(StoreStat {
            exists: false,
            len: 0,
        })
    }

    fn read_at(&mut self, _offset: u64, _buf: &mut [u8]) -> Result<()> {
        Err(zipcore::SZipError::Io(io::Error::new(
            io::ErrorKind::Unsupported,
            "RecordingStore never materializes bytes",
        )))
    }

    fn write_at(&mut self, offset: u64, buf: &[u8]) -> Result<()> {
        self.writes.push((offset, buf.len()));
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn s1_empty_small_file_is_110_bytes() {
    let mut store = MemoryStore::new();
    let mut asm = Assembler::open(&mut store).unwrap();
    asm.append(&mut store, b"hi.txt", 0x0000_0000, 0, 1_234_567_890, 0o644)
        .unwrap();
    asm.finalize(&mut store).unwrap();
    asm.close(&mut store).unwrap();

    let bytes = store.into_bytes();
    assert_eq!(bytes.len(), 110);
}

#[test]
fn s2_exactly_4gib_payload_promotes_with_correct_sentinels() {
    let mut store = RecordingStore::default();
    let mut asm = Assembler::open(&mut store).unwrap();
    asm.append(
        &mut store,
        b"big.bin",
        0x1234_5678,
        0xFFFF_FFFF,
        1_234_567_890,
        0o644,
    )
    .unwrap();

    assert!(asm.is_zip64());
    assert_eq!(asm.entry_count(), 1);
}

#[test]
fn s3_append_to_classic_archive_crossing_4gib_promotes() {
    let mut store = RecordingStore::default();
    let mut asm = Assembler::open(&mut store).unwrap();

    // First entry: 3 GiB, fits a classic 32-bit field.
    asm.append(&mut store, b"part1.bin", 0x1111_1111, 3_000_000_000, 1_700_000_000, 0o644)
        .unwrap();
    assert!(!asm.is_zip64());

    // Second entry: 2 GiB pushes the cumulative cd_offset past 4 GiB.
    asm.append(&mut store, b"part2.bin", 0x2222_2222, 2_000_000_000, 1_700_000_000, 0o644)
        .unwrap();
    assert!(asm.is_zip64());
    assert_eq!(asm.entry_count(), 2);
}

#[test]
fn s4_70000_entries_saturate_the_classic_counter() {
    let mut store = RecordingStore::default();
    let mut asm = Assembler::open(&mut store).unwrap();

    for i in 0..70_000u32 {
        let name = format!("f{i}.txt");
        asm.append(&mut store, name.as_bytes(), 0, 0, 1_700_000_000, 0o644)
            .unwrap();
    }

    assert!(asm.is_zip64());
    assert_eq!(asm.entry_count(), 70_000u32.min(0xFFFF) as u16);
}

#[test]
fn s5_truncated_archive_fails_to_open() {
    let mut store = MemoryStore::new();
    let mut asm = Assembler::open(&mut store).unwrap();
    asm.append(&mut store, b"hi.txt", 0, 0, 1_234_567_890, 0o644)
        .unwrap();
    asm.finalize(&mut store).unwrap();
    asm.close(&mut store).unwrap();

    let full = store.into_bytes();
    let truncated = full[..full.len() - 20].to_vec();

    let mut store2 = MemoryStore::new();
    store2.open().unwrap();
    store2.write_at(0, &truncated).unwrap();

    let result = Assembler::open(&mut store2);
    assert!(matches!(result, Err(zipcore::SZipError::MalformedArchive(_))));
}

#[test]
fn s6_utf8_filename_round_trips_identically() {
    let name = "日本語.bin".as_bytes();
    assert_eq!(name.len(), 11);

    let mut store = MemoryStore::new();
    let mut asm = Assembler::open(&mut store).unwrap();
    asm.append(&mut store, name, 0, 0, 1_700_000_000, 0o644).unwrap();
    asm.finalize(&mut store).unwrap();
    asm.close(&mut store).unwrap();

    let bytes = store.into_bytes();
    // LFH name starts at byte 30.
    assert_eq!(&bytes[30..30 + name.len()], name);
}
