//! Builds a brand-new stored-only archive from scratch: two entries, one
//! written in a single `write_file_data` call and one split across
//! several calls covering its payload range.

use zipcore::{Assembler, FileStore, Result};

fn main() -> Result<()> {
    let path = std::env::temp_dir().join("zipcore_basic_write.zip");
    println!("writing {}", path.display());

    let mut store = FileStore::new(&path);
    let mut asm = Assembler::open(&mut store)?;

    let hello = b"Hello, World!";
    let crc = crc32fast::hash(hello);
    asm.append(&mut store, b"hello.txt", crc, hello.len() as u64, 1_700_000_000, 0o644)?;
    asm.write_file_data(&mut store, hello, 0)?;

    let parts: [&[u8]; 3] = [b"first chunk, ", b"second chunk, ", b"third chunk"];
    let mut hasher = crc32fast::Hasher::new();
    let mut total_len = 0u64;
    for part in &parts {
        hasher.update(part);
        total_len += part.len() as u64;
    }
    let crc = hasher.finalize();

    asm.append(&mut store, b"chunked.txt", crc, total_len, 1_700_000_000, 0o644)?;
    let mut offset = 0u64;
    for part in &parts {
        asm.write_file_data(&mut store, part, offset)?;
        offset += part.len() as u64;
    }

    asm.finalize(&mut store)?;
    asm.close(&mut store)?;

    println!("wrote {} entries, useZip64 = {}", asm.entry_count(), asm.is_zip64());
    Ok(())
}
