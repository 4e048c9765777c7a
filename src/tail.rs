//! Tail parser: locates and decodes the trailer of an existing archive,
//! backward-scanning for the EOCD signature the way `s-zip`'s own
//! `reader.rs::find_eocd` does, extended with the ZIP64 locator/EOCD
//! follow-up reads that
//! `original_source/experiments/LocalZipArchive.cc`'s
//! `LookForEocd`/`ReadCentralDirectory` perform.

use log::warn;

use crate::codec::{decode_eocd, decode_zip64_eocd, decode_zip64_eocdl};
use crate::error::{Result, SZipError};
use crate::model::{
    Eocd, Zip64Eocd, Zip64EocdLocator, EOCD_BASE_SIZE, EOCD_SIGNATURE, ZIP64_EOCDL_SIGNATURE,
    ZIP64_EOCDL_SIZE, ZIP64_EOCD_BASE_SIZE, ZIP64_EOCD_SIGNATURE,
};
use crate::store::RandomAccessStore;

const MAX_COMMENT_LENGTH: u64 = 65535;

/// Everything the tail parser recovers from an existing archive: the
/// classic EOCD, the optional ZIP64 pair, and the pre-existing central
/// directory bytes (preserved verbatim and re-emitted ahead of any new
/// CDFHs).
pub struct ParsedTail {
    pub eocd: Eocd,
    pub zip64: Option<(Zip64Eocd, Zip64EocdLocator)>,
    pub existing_cd_bytes: Vec<u8>,
}

/// Run the full tail-parsing algorithm against an
/// already-open store of known `archive_size`.
pub fn parse_tail<S: RandomAccessStore>(store: &mut S, archive_size: u64) -> Result<ParsedTail> {
    let tail_len = archive_size.min(MAX_COMMENT_LENGTH + EOCD_BASE_SIZE + ZIP64_EOCDL_SIZE);
    if tail_len < EOCD_BASE_SIZE {
        return Err(SZipError::MalformedArchive(
            "archive is too small to contain an EOCD record".to_string(),
        ));
    }
    let tail_start = archive_size - tail_len;

    let mut tail_buf = vec![0u8; tail_len as usize];
    store.read_at(tail_start, &mut tail_buf)?;

    let eocd_sig = EOCD_SIGNATURE.to_le_bytes();
    let scan_start = (tail_len as usize).saturating_sub(EOCD_BASE_SIZE as usize);
    let mut eocd_index = None;
    for i in (0..=scan_start).rev() {
        if tail_buf[i..i + 4] == eocd_sig {
            eocd_index = Some(i);
            break;
        }
    }
    let eocd_index = eocd_index
        .ok_or_else(|| SZipError::MalformedArchive("EOCD signature not found".to_string()))?;

    let eocd = decode_eocd(&tail_buf[eocd_index..]);

    let zip64_eocdl_sig = ZIP64_EOCDL_SIGNATURE.to_le_bytes();
    let mut zip64 = None;
    if eocd_index >= ZIP64_EOCDL_SIZE as usize {
        let locator_index = eocd_index - ZIP64_EOCDL_SIZE as usize;
        if tail_buf[locator_index..locator_index + 4] == zip64_eocdl_sig {
            let locator = decode_zip64_eocdl(&tail_buf[locator_index..]);

            let zip64_eocd_offset = locator.zip64_eocd_offset;
            if zip64_eocd_offset >= archive_size {
                return Err(SZipError::MalformedArchive(
                    "ZIP64 EOCD locator points past the end of the archive".to_string(),
                ));
            }

            let zip64_rec = if zip64_eocd_offset >= tail_start
                && (zip64_eocd_offset - tail_start) as usize + ZIP64_EOCD_BASE_SIZE as usize
                    <= tail_buf.len()
            {
                let local_index = (zip64_eocd_offset - tail_start) as usize;
                if tail_buf[local_index..local_index + 4] != ZIP64_EOCD_SIGNATURE.to_le_bytes() {
                    return Err(SZipError::MalformedArchive(
                        "ZIP64 EOCD locator points at an offset without the ZIP64 EOCD signature"
                            .to_string(),
                    ));
                }
                decode_zip64_eocd(&tail_buf[local_index..])
            } else {
                warn!(
                    "ZIP64 EOCD at offset {} precedes the tail buffer (starting at {}); re-reading",
                    zip64_eocd_offset, tail_start
                );
                let extra_len = (archive_size - zip64_eocd_offset) as usize;
                if extra_len < ZIP64_EOCD_BASE_SIZE as usize {
                    return Err(SZipError::MalformedArchive(
                        "ZIP64 EOCD locator points too close to the end of the archive"
                            .to_string(),
                    ));
                }
                let mut extra_buf = vec![0u8; extra_len];
                store.read_at(zip64_eocd_offset, &mut extra_buf)?;
                if extra_buf[0..4] != ZIP64_EOCD_SIGNATURE.to_le_bytes() {
                    return Err(SZipError::MalformedArchive(
                        "ZIP64 EOCD locator points at a record without the ZIP64 EOCD signature"
                            .to_string(),
                    ));
                }
                decode_zip64_eocd(&extra_buf)
            };

            zip64 = Some((zip64_rec, locator));
        }
    }

    let (cd_offset, cd_size) = match &zip64 {
        Some((rec, _)) => (rec.cd_offset, rec.cd_size),
        None => (eocd.cd_offset as u64, eocd.cd_size as u64),
    };

    let mut existing_cd_bytes = vec![0u8; cd_size as usize];
    if cd_size > 0 {
        store.read_at(cd_offset, &mut existing_cd_bytes)?;
    }

    Ok(ParsedTail {
        eocd,
        zip64,
        existing_cd_bytes,
    })
}
