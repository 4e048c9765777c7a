use std::process::Command;
use tempfile::tempdir;

// This test writes a ZIP using the assembler and then calls `unzip -t` to
// verify compatibility. If `unzip` is not present on the system, the test
// is skipped.

#[test]
fn unzip_compatibility() {
    use zipcore::{Assembler, FileStore};

    let check = Command::new("unzip").arg("-v").output();
    if check.is_err() {
        eprintln!("skipping test: `unzip` not found");
        return;
    }

    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("compat.zip");

    {
        let mut store = FileStore::new(&zip_path);
        let mut asm = Assembler::open(&mut store).unwrap();

        let hello = b"hello from test";
        let crc = crc32fast::hash(hello);
        asm.append(&mut store, b"hello.txt", crc, hello.len() as u64, 1_700_000_000, 0o644)
            .unwrap();
        asm.write_file_data(&mut store, hello, 0).unwrap();

        let big = vec![0u8; 1024 * 1024];
        let crc = crc32fast::hash(&big);
        asm.append(&mut store, b"big.bin", crc, big.len() as u64, 1_700_000_000, 0o644)
            .unwrap();
        asm.write_file_data(&mut store, &big, 0).unwrap();

        asm.finalize(&mut store).unwrap();
        asm.close(&mut store).unwrap();
    }

    let output = Command::new("unzip")
        .arg("-t")
        .arg(&zip_path)
        .output()
        .expect("failed to run unzip");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "unzip reported failure: {} {}",
        stdout,
        stderr
    );
}
