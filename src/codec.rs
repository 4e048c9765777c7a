//! Codec: pure encode/decode functions for each ZIP record type.
//!
//! Stateless, does no I/O, and never validates against the archive's
//! current state (the Assembler owns that). Mirrors the memcpy-at-fixed-
//! offset style of `original_source/ZipArchive.cc`'s `Write` methods, but
//! writes into a growable `Vec<u8>` instead of a raw struct cast, and adds
//! the decode half that the original only needed for its reader.

use crate::model::{
    Cdfh, Eocd, Lfh, Zip64Eocd, Zip64EocdLocator, Zip64Extra, CDFH_SIGNATURE, EOCD_SIGNATURE,
    LFH_SIGNATURE, ZIP64_EOCDL_SIGNATURE, ZIP64_EOCD_SIGNATURE, ZIP64_EXTRA_HEADER_ID,
};

/// Serialize a `ZipExtra` body (minimal form): sizes block
/// only if present, offset block only if present, in that order.
pub fn encode_zip64_extra(extra: &Zip64Extra, dst: &mut Vec<u8>) {
    if extra.is_empty() {
        return;
    }
    dst.extend_from_slice(&ZIP64_EXTRA_HEADER_ID.to_le_bytes());
    dst.extend_from_slice(&extra.data_size().to_le_bytes());
    if let Some((uncompressed, compressed)) = extra.sizes {
        dst.extend_from_slice(&uncompressed.to_le_bytes());
        dst.extend_from_slice(&compressed.to_le_bytes());
    }
    if let Some(offset) = extra.offset {
        dst.extend_from_slice(&offset.to_le_bytes());
    }
}

pub fn encode_lfh(lfh: &Lfh, dst: &mut Vec<u8>) {
    dst.extend_from_slice(&LFH_SIGNATURE.to_le_bytes());
    dst.extend_from_slice(&lfh.min_zip_version.to_le_bytes());
    dst.extend_from_slice(&lfh.general_bit_flag.to_le_bytes());
    dst.extend_from_slice(&lfh.compression_method.to_le_bytes());
    dst.extend_from_slice(&lfh.mod_time.to_le_bytes());
    dst.extend_from_slice(&lfh.mod_date.to_le_bytes());
    dst.extend_from_slice(&lfh.crc32.to_le_bytes());
    dst.extend_from_slice(&lfh.compressed_size.to_le_bytes());
    dst.extend_from_slice(&lfh.uncompressed_size.to_le_bytes());
    dst.extend_from_slice(&(lfh.filename.len() as u16).to_le_bytes());
    dst.extend_from_slice(&lfh.extra.total_size().to_le_bytes());
    dst.extend_from_slice(&lfh.filename);
    encode_zip64_extra(&lfh.extra, dst);
}

pub fn encode_cdfh(cdfh: &Cdfh, dst: &mut Vec<u8>) {
    dst.extend_from_slice(&CDFH_SIGNATURE.to_le_bytes());
    dst.extend_from_slice(&cdfh.zip_version_made_by.to_le_bytes());
    dst.extend_from_slice(&cdfh.min_zip_version.to_le_bytes());
    dst.extend_from_slice(&cdfh.general_bit_flag.to_le_bytes());
    dst.extend_from_slice(&cdfh.compression_method.to_le_bytes());
    dst.extend_from_slice(&cdfh.mod_time.to_le_bytes());
    dst.extend_from_slice(&cdfh.mod_date.to_le_bytes());
    dst.extend_from_slice(&cdfh.crc32.to_le_bytes());
    dst.extend_from_slice(&cdfh.compressed_size.to_le_bytes());
    dst.extend_from_slice(&cdfh.uncompressed_size.to_le_bytes());
    dst.extend_from_slice(&(cdfh.filename.len() as u16).to_le_bytes());
    dst.extend_from_slice(&cdfh.extra.total_size().to_le_bytes());
    dst.extend_from_slice(&(cdfh.comment.len() as u16).to_le_bytes());
    dst.extend_from_slice(&cdfh.nb_disk.to_le_bytes());
    dst.extend_from_slice(&cdfh.intern_attr.to_le_bytes());
    dst.extend_from_slice(&cdfh.extern_attr.to_le_bytes());
    dst.extend_from_slice(&cdfh.offset.to_le_bytes());
    dst.extend_from_slice(&cdfh.filename);
    encode_zip64_extra(&cdfh.extra, dst);
    dst.extend_from_slice(&cdfh.comment);
}

pub fn encode_eocd(eocd: &Eocd, dst: &mut Vec<u8>) {
    dst.extend_from_slice(&EOCD_SIGNATURE.to_le_bytes());
    dst.extend_from_slice(&eocd.nb_disk.to_le_bytes());
    dst.extend_from_slice(&eocd.nb_disk_cd.to_le_bytes());
    dst.extend_from_slice(&eocd.nb_cd_rec_d.to_le_bytes());
    dst.extend_from_slice(&eocd.nb_cd_rec.to_le_bytes());
    dst.extend_from_slice(&eocd.cd_size.to_le_bytes());
    dst.extend_from_slice(&eocd.cd_offset.to_le_bytes());
    dst.extend_from_slice(&(eocd.comment.len() as u16).to_le_bytes());
    dst.extend_from_slice(&eocd.comment);
}

pub fn encode_zip64_eocd(rec: &Zip64Eocd, dst: &mut Vec<u8>) {
    dst.extend_from_slice(&ZIP64_EOCD_SIGNATURE.to_le_bytes());
    dst.extend_from_slice(&rec.record_size().to_le_bytes());
    dst.extend_from_slice(&rec.zip_version_made_by.to_le_bytes());
    dst.extend_from_slice(&rec.min_zip_version.to_le_bytes());
    dst.extend_from_slice(&rec.nb_disk.to_le_bytes());
    dst.extend_from_slice(&rec.nb_disk_cd.to_le_bytes());
    dst.extend_from_slice(&rec.nb_cd_rec_d.to_le_bytes());
    dst.extend_from_slice(&rec.nb_cd_rec.to_le_bytes());
    dst.extend_from_slice(&rec.cd_size.to_le_bytes());
    dst.extend_from_slice(&rec.cd_offset.to_le_bytes());
    dst.extend_from_slice(&rec.extensible);
}

pub fn encode_zip64_eocdl(loc: &Zip64EocdLocator, dst: &mut Vec<u8>) {
    dst.extend_from_slice(&ZIP64_EOCDL_SIGNATURE.to_le_bytes());
    dst.extend_from_slice(&loc.nb_disk_zip64_eocd.to_le_bytes());
    dst.extend_from_slice(&loc.zip64_eocd_offset.to_le_bytes());
    dst.extend_from_slice(&loc.total_nb_disks.to_le_bytes());
}

fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([buf[at], buf[at + 1], buf[at + 2], buf[at + 3]])
}

fn read_u64(buf: &[u8], at: usize) -> u64 {
    let mut b = [0u8; 8];
    b.copy_from_slice(&buf[at..at + 8]);
    u64::from_le_bytes(b)
}

/// Decode an EOCD record from `buf`, whose byte 0 is the record's
/// signature. `useZip64` defaults to false; the tail parser sets it once
/// a Locator is found.
pub fn decode_eocd(buf: &[u8]) -> Eocd {
    let cmt_len = read_u16(buf, 20) as usize;
    Eocd {
        nb_disk: read_u16(buf, 4),
        nb_disk_cd: read_u16(buf, 6),
        nb_cd_rec_d: read_u16(buf, 8),
        nb_cd_rec: read_u16(buf, 10),
        cd_size: read_u32(buf, 12),
        cd_offset: read_u32(buf, 16),
        comment: buf.get(22..22 + cmt_len).unwrap_or(&[]).to_vec(),
    }
}

/// Decode a ZIP64 EOCD record from `buf`, whose byte 0 is the record's
/// signature.
pub fn decode_zip64_eocd(buf: &[u8]) -> Zip64Eocd {
    let record_size = read_u64(buf, 4);
    let extensible_len = (record_size + 12).saturating_sub(56) as usize;
    let extensible_start = 56usize;
    Zip64Eocd {
        zip_version_made_by: read_u16(buf, 12),
        min_zip_version: read_u16(buf, 14),
        nb_disk: read_u32(buf, 16),
        nb_disk_cd: read_u32(buf, 20),
        nb_cd_rec_d: read_u64(buf, 24),
        nb_cd_rec: read_u64(buf, 32),
        cd_size: read_u64(buf, 40),
        cd_offset: read_u64(buf, 48),
        extensible: buf
            .get(extensible_start..extensible_start + extensible_len)
            .unwrap_or(&[])
            .to_vec(),
    }
}

/// Decode a ZIP64 EOCD Locator from `buf`, whose byte 0 is the record's
/// signature.
pub fn decode_zip64_eocdl(buf: &[u8]) -> Zip64EocdLocator {
    Zip64EocdLocator {
        nb_disk_zip64_eocd: read_u32(buf, 4),
        zip64_eocd_offset: read_u64(buf, 8),
        total_nb_disks: read_u32(buf, 16),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lfh;

    #[test]
    fn lfh_small_entry_has_30_byte_base_and_no_extra() {
        let lfh = Lfh::new(b"hi.txt", 0, 0, 1_234_567_890);
        assert_eq!(lfh.min_zip_version, 10);
        assert_eq!(lfh.lfh_size, 30 + 6);
        let mut buf = Vec::new();
        encode_lfh(&lfh, &mut buf);
        assert_eq!(buf.len(), 36);
        assert_eq!(&buf[0..4], &LFH_SIGNATURE.to_le_bytes());
        assert_eq!(read_u16(&buf, 26), 6);
        assert_eq!(read_u16(&buf, 28), 0);
    }

    #[test]
    fn eocd_round_trips_through_encode_decode() {
        let eocd = Eocd {
            nb_disk: 0,
            nb_disk_cd: 0,
            nb_cd_rec_d: 1,
            nb_cd_rec: 1,
            cd_size: 52,
            cd_offset: 36,
            comment: Vec::new(),
        };
        let mut buf = Vec::new();
        encode_eocd(&eocd, &mut buf);
        assert_eq!(buf.len(), 22);
        let decoded = decode_eocd(&buf);
        assert_eq!(decoded.nb_cd_rec, 1);
        assert_eq!(decoded.cd_size, 52);
        assert_eq!(decoded.cd_offset, 36);
    }

    #[test]
    fn zip64_eocd_round_trips() {
        let rec = Zip64Eocd {
            zip_version_made_by: (3u16 << 8) | 63,
            min_zip_version: 45,
            nb_disk: 0,
            nb_disk_cd: 0,
            nb_cd_rec_d: 2,
            nb_cd_rec: 2,
            cd_size: 200,
            cd_offset: 5_000_000_000,
            extensible: Vec::new(),
        };
        let mut buf = Vec::new();
        encode_zip64_eocd(&rec, &mut buf);
        assert_eq!(buf.len(), 56);
        let decoded = decode_zip64_eocd(&buf);
        assert_eq!(decoded.nb_cd_rec, 2);
        assert_eq!(decoded.cd_offset, 5_000_000_000);
    }
}
