//! Opens an existing archive, appends another entry, and shows that a
//! payload large enough to overflow a 32-bit field promotes the trailer
//! to ZIP64 transparently. The oversized entry's payload is never
//! actually written here — the point is the trailer bookkeeping, not
//! moving 4 GiB through a demo.

use zipcore::{Assembler, FileStore, Result};

fn main() -> Result<()> {
    let path = std::env::temp_dir().join("zipcore_append_and_promote.zip");
    println!("building a small classic archive at {}", path.display());

    {
        let mut store = FileStore::new(&path);
        let mut asm = Assembler::open(&mut store)?;
        let data = b"a small first entry";
        let crc = crc32fast::hash(data);
        asm.append(&mut store, b"small.txt", crc, data.len() as u64, 1_700_000_000, 0o644)?;
        asm.write_file_data(&mut store, data, 0)?;
        asm.finalize(&mut store)?;
        asm.close(&mut store)?;
        println!("useZip64 = {} after the first entry", asm.is_zip64());
    }

    println!("reopening and appending an entry declared at the 4 GiB boundary");
    let mut store = FileStore::new(&path);
    let mut asm = Assembler::open(&mut store)?;
    asm.append(&mut store, b"huge.bin", 0, 0xFFFF_FFFF, 1_700_000_000, 0o644)?;
    println!("useZip64 = {} after the oversized entry", asm.is_zip64());
    asm.finalize(&mut store)?;
    asm.close(&mut store)?;

    Ok(())
}
