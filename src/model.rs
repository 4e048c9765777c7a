//! Record model: value types for the ZIP central-directory family of
//! records, with constructors that compute dependent fields and decide
//! sentinel usage.
//!
//! Ported from `original_source/experiments/LocalZipArchive.cc`'s
//! `ZipExtra`/`LFH`/`CDFH`/`EOCD`/`ZIP64_EOCD`/`ZIP64_EOCDL` structs, which
//! is the revision that actually implements appending and mid-stream
//! ZIP64 promotion (the plain `ZipArchive.cc` at the repo root only
//! creates archives from scratch). Records here are immutable value
//! types: an `Append` replaces the trailer wholesale rather than
//! mutating shared fields in place.

use crate::dos_time;
use crate::error::{Result, SZipError};

/// 16-bit overflow sentinel (`0xFFFF`)
pub const OVF16: u16 = 0xFFFF;
/// 32-bit overflow sentinel (`0xFFFFFFFF`)
pub const OVF32: u32 = 0xFFFFFFFF;

pub const LFH_BASE_SIZE: u64 = 30;
pub const CDFH_BASE_SIZE: u64 = 46;
pub const EOCD_BASE_SIZE: u64 = 22;
pub const ZIP64_EOCD_BASE_SIZE: u64 = 56;
pub const ZIP64_EOCDL_SIZE: u64 = 20;

pub const LFH_SIGNATURE: u32 = 0x0403_4b50;
pub const CDFH_SIGNATURE: u32 = 0x0201_4b50;
pub const EOCD_SIGNATURE: u32 = 0x0605_4b50;
pub const ZIP64_EOCD_SIGNATURE: u32 = 0x0606_4b50;
pub const ZIP64_EOCDL_SIGNATURE: u32 = 0x0706_4b50;
pub const ZIP64_EXTRA_HEADER_ID: u16 = 0x0001;

/// Overflow is defined as `value >= sentinel`, because the sentinel value
/// itself is reserved.
pub fn overflows_u32(value: u64) -> bool {
    value >= OVF32 as u64
}

fn narrow_u32(value: u64) -> u32 {
    if overflows_u32(value) {
        OVF32
    } else {
        value as u32
    }
}

/// Checked `u64` addition for the running offset/size totals that
/// accumulate across an archive's lifetime, since these are the one place
/// a 64-bit value (not just a 32-bit sentinel) could genuinely overflow.
pub fn checked_add_u64(a: u64, b: u64) -> Result<u64> {
    a.checked_add(b).ok_or(SZipError::ArchiveTooLarge)
}

/// Saturating increment of a classic 16-bit counter: clamps to `OVF16`
/// once the next value would reach or exceed it, and stays clamped
/// forever after.
pub fn saturating_inc_u16(current: u16) -> u16 {
    let next = current as u32 + 1;
    if next >= OVF16 as u32 {
        OVF16
    } else {
        next as u16
    }
}

/// ZIP64 extended-information extra field (header ID `0x0001`). Only the
/// fields that actually needed promotion are present; the writer never
/// emits a `nbDisk` slot since it never produces spanned archives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Zip64Extra {
    /// `(uncompressed_size, compressed_size)`, present once either native
    /// LFH/CDFH size field overflowed.
    pub sizes: Option<(u64, u64)>,
    /// True LFH offset, present once the native CDFH offset field
    /// overflowed.
    pub offset: Option<u64>,
}

impl Zip64Extra {
    /// `ZipExtra(fileSize)`: sizes are promoted as a pair,
    /// only once the (stored, so identical) compressed/uncompressed size
    /// overflows.
    pub fn for_lfh(uncompressed_size: u64, compressed_size: u64) -> Self {
        if overflows_u32(uncompressed_size) || overflows_u32(compressed_size) {
            Self {
                sizes: Some((uncompressed_size, compressed_size)),
                offset: None,
            }
        } else {
            Self::default()
        }
    }

    /// `ZipExtra(lfhExtra, lfhOffset)`: inherits the LFH
    /// extra's size fields unchanged and additionally appends the offset
    /// only if it overflows — this is the minimal-form rule.
    pub fn for_cdfh(lfh_extra: &Zip64Extra, lfh_offset: u64) -> Self {
        let mut extra = lfh_extra.clone();
        if overflows_u32(lfh_offset) {
            extra.offset = Some(lfh_offset);
        }
        extra
    }

    pub fn data_size(&self) -> u16 {
        let mut n = 0u16;
        if self.sizes.is_some() {
            n += 16;
        }
        if self.offset.is_some() {
            n += 8;
        }
        n
    }

    /// `headerID(2) + dataSize(2) + body`, 0 if nothing was promoted.
    pub fn total_size(&self) -> u16 {
        let data_size = self.data_size();
        if data_size == 0 {
            0
        } else {
            data_size + 4
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_size() == 0
    }
}

/// Local File Header. Each entry's payload is always written uncompressed
/// (`compressionMethod = 0`) — compression is an external collaborator
/// this writer never invokes.
#[derive(Debug, Clone)]
pub struct Lfh {
    pub min_zip_version: u16,
    pub general_bit_flag: u16,
    pub compression_method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    /// Native 32-bit field: `OVF32` sentinel once the true size overflows.
    pub compressed_size: u32,
    /// Native 32-bit field: `OVF32` sentinel once the true size overflows.
    pub uncompressed_size: u32,
    pub filename: Vec<u8>,
    pub extra: Zip64Extra,
    pub lfh_size: u64,
}

impl Lfh {
    pub fn new(filename: &[u8], crc32: u32, file_size: u64, mtime_epoch_secs: i64) -> Self {
        let (mod_time, mod_date) = dos_time::to_msdos(mtime_epoch_secs);
        let narrow = narrow_u32(file_size);
        let extra = Zip64Extra::for_lfh(file_size, file_size);
        let extra_len = extra.total_size();
        let min_zip_version = if extra_len == 0 { 10 } else { 45 };
        let lfh_size = LFH_BASE_SIZE + filename.len() as u64 + extra_len as u64;

        Self {
            min_zip_version,
            general_bit_flag: 0,
            compression_method: 0,
            mod_time,
            mod_date,
            crc32,
            compressed_size: narrow,
            uncompressed_size: narrow,
            filename: filename.to_vec(),
            extra,
            lfh_size,
        }
    }

    /// The true (never-sentinelized) compressed size, reading through to
    /// the ZIP64 extra field when the native field overflowed. Since the
    /// writer only ever emits stored entries, compressed == uncompressed.
    pub fn true_compressed_size(&self) -> u64 {
        if self.compressed_size == OVF32 {
            self.extra
                .sizes
                .map(|(_, compressed)| compressed)
                .unwrap_or(OVF32 as u64)
        } else {
            self.compressed_size as u64
        }
    }
}

/// Central Directory File Header.
#[derive(Debug, Clone)]
pub struct Cdfh {
    pub zip_version_made_by: u16,
    pub min_zip_version: u16,
    pub general_bit_flag: u16,
    pub compression_method: u16,
    pub mod_time: u16,
    pub mod_date: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub filename: Vec<u8>,
    pub extra: Zip64Extra,
    pub comment: Vec<u8>,
    pub nb_disk: u16,
    pub intern_attr: u16,
    pub extern_attr: u32,
    /// Native 32-bit field: `OVF32` sentinel once the true offset overflows.
    pub offset: u32,
    pub cdfh_size: u64,
}

impl Cdfh {
    pub fn new(lfh: &Lfh, mode: u32, lfh_offset: u64) -> Self {
        let extern_attr = mode << 16;
        let offset = narrow_u32(lfh_offset);
        let extra = Zip64Extra::for_cdfh(&lfh.extra, lfh_offset);
        let extra_len = extra.total_size();
        let min_zip_version = if extra_len == 0 { 10 } else { 45 };
        let cdfh_size =
            CDFH_BASE_SIZE + lfh.filename.len() as u64 + extra_len as u64;

        Self {
            zip_version_made_by: (3u16 << 8) | 63,
            min_zip_version,
            general_bit_flag: lfh.general_bit_flag,
            compression_method: lfh.compression_method,
            mod_time: lfh.mod_time,
            mod_date: lfh.mod_date,
            crc32: lfh.crc32,
            compressed_size: lfh.compressed_size,
            uncompressed_size: lfh.uncompressed_size,
            filename: lfh.filename.clone(),
            extra,
            comment: Vec::new(),
            nb_disk: 0,
            intern_attr: 0,
            extern_attr,
            offset,
            cdfh_size,
        }
    }

    pub fn true_offset(&self) -> u64 {
        if self.offset == OVF32 {
            self.extra.offset.unwrap_or(OVF32 as u64)
        } else {
            self.offset as u64
        }
    }
}

/// End of Central Directory record. Always disk 0 of 1 disk. While a `Trailer::Classic` holds this, every
/// field is the true, non-sentinel value. Once a trailer is promoted,
/// `cd_size`/`cd_offset` are frozen at `OVF32` forever; the entry
/// counters keep being updated with `saturating_inc_u16`.
#[derive(Debug, Clone)]
pub struct Eocd {
    pub nb_disk: u16,
    pub nb_disk_cd: u16,
    pub nb_cd_rec_d: u16,
    pub nb_cd_rec: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment: Vec<u8>,
}

impl Eocd {
    /// `EOCD(lfh, cdfh)`: the trailer for a brand-new archive
    /// after its first entry. Returns the classic record plus whether
    /// this single entry already forces ZIP64 promotion.
    pub fn for_new_archive(lfh: &Lfh, cdfh: &Cdfh) -> (Self, bool) {
        let promote = lfh.compressed_size == OVF32
            || overflows_u32(lfh.lfh_size + lfh.compressed_size as u64);

        let (cd_size, cd_offset) = if promote {
            (OVF32, OVF32)
        } else {
            (cdfh.cdfh_size as u32, (lfh.lfh_size + lfh.compressed_size as u64) as u32)
        };

        (
            Self {
                nb_disk: 0,
                nb_disk_cd: 0,
                nb_cd_rec_d: 1,
                nb_cd_rec: 1,
                cd_size,
                cd_offset,
                comment: Vec::new(),
            },
            promote,
        )
    }

    pub fn eocd_size(&self) -> u64 {
        EOCD_BASE_SIZE + self.comment.len() as u64
    }
}

/// ZIP64 End of Central Directory record — the authoritative 64-bit
/// trailer once any axis has overflowed.
#[derive(Debug, Clone)]
pub struct Zip64Eocd {
    pub zip_version_made_by: u16,
    pub min_zip_version: u16,
    pub nb_disk: u32,
    pub nb_disk_cd: u32,
    pub nb_cd_rec_d: u64,
    pub nb_cd_rec: u64,
    pub cd_size: u64,
    pub cd_offset: u64,
    pub extensible: Vec<u8>,
}

impl Zip64Eocd {
    /// `ZIP64_EOCD(eocd, lfh, cdfh, prevCounters)`, unified
    /// across both first-entry creation (`prev_cd_size`/`prev_cd_offset`
    /// both 0) and mid-append promotion (snapshotted pre-promotion
    /// classic counters). `true_nb_cd_rec_d`/`true_nb_cd_rec` must be
    /// computed by the caller *before* the classic `u16` mirrors are
    /// saturated, since this is the one point where the true count is
    /// still fully recoverable from the classic field.
    pub fn promote(
        eocd_before: &Eocd,
        lfh: &Lfh,
        cdfh: &Cdfh,
        prev_cd_size: u64,
        prev_cd_offset: u64,
        true_nb_cd_rec_d: u64,
        true_nb_cd_rec: u64,
    ) -> Result<Self> {
        let cd_size = checked_add_u64(prev_cd_size, cdfh.cdfh_size)?;
        let cd_offset = checked_add_u64(
            checked_add_u64(prev_cd_offset, lfh.lfh_size)?,
            lfh.true_compressed_size(),
        )?;
        Ok(Self {
            zip_version_made_by: (3u16 << 8) | 63,
            min_zip_version: 45,
            nb_disk: eocd_before.nb_disk as u32,
            nb_disk_cd: eocd_before.nb_disk_cd as u32,
            nb_cd_rec_d: true_nb_cd_rec_d,
            nb_cd_rec: true_nb_cd_rec,
            cd_size,
            cd_offset,
            extensible: Vec::new(),
        })
    }

    /// `zip64EocdSize` = base size + extensible data - 12 (the signature
    /// and size-field-itself are not counted, per APPNOTE 4.3.14).
    pub fn record_size(&self) -> u64 {
        ZIP64_EOCD_BASE_SIZE + self.extensible.len() as u64 - 12
    }

    /// Total on-disk length of the record, including signature and size
    /// field.
    pub fn total_size(&self) -> u64 {
        ZIP64_EOCD_BASE_SIZE + self.extensible.len() as u64
    }
}

/// ZIP64 End of Central Directory Locator.
#[derive(Debug, Clone)]
pub struct Zip64EocdLocator {
    pub nb_disk_zip64_eocd: u32,
    pub zip64_eocd_offset: u64,
    pub total_nb_disks: u32,
}

impl Zip64EocdLocator {
    pub fn new(zip64_eocd: &Zip64Eocd) -> Result<Self> {
        let zip64_eocd_offset = checked_add_u64(zip64_eocd.cd_offset, zip64_eocd.cd_size)?;
        Ok(Self {
            nb_disk_zip64_eocd: 0,
            zip64_eocd_offset,
            total_nb_disks: 1,
        })
    }
}

/// The assembler's in-progress trailer state, modeled as a tagged sum
/// rather than the source's aliased classic/ZIP64 structs: promotion is
/// a one-way `Classic -> Zip64` transition, making "useZip64 never
/// clears" a compile-time property.
#[derive(Debug, Clone)]
pub enum Trailer {
    Classic(Eocd),
    Zip64 {
        eocd: Eocd,
        zip64_eocd: Zip64Eocd,
        zip64_eocdl: Zip64EocdLocator,
    },
}

impl Trailer {
    pub fn is_zip64(&self) -> bool {
        matches!(self, Trailer::Zip64 { .. })
    }

    pub fn eocd(&self) -> &Eocd {
        match self {
            Trailer::Classic(eocd) => eocd,
            Trailer::Zip64 { eocd, .. } => eocd,
        }
    }

    /// The offset at which the next CDFH byte (new or pre-existing) will
    /// land.
    pub fn cd_offset(&self) -> u64 {
        match self {
            Trailer::Classic(eocd) => eocd.cd_offset as u64,
            Trailer::Zip64 { zip64_eocd, .. } => zip64_eocd.cd_offset,
        }
    }
}
