//! Assembler: the archive state machine.
//!
//! `Open -> (Append | WriteFileData)* -> Finalize -> Close`. Owns the
//! trailer state and the pending-CDFH list; delegates byte encoding to
//! [`crate::codec`] and positional I/O to a [`RandomAccessStore`]. The
//! three `Append` paths (create-new, append-to-zip64, append-to-classic
//! with possible promotion) follow
//! `original_source/experiments/LocalZipArchive.cc::Append`, rewritten
//! around the tagged-sum `Trailer` rather than mutating aliased C structs
//! in place.

use log::{debug, trace};

use crate::codec::{encode_cdfh, encode_eocd, encode_lfh, encode_zip64_eocd, encode_zip64_eocdl};
use crate::error::Result;
use crate::model::{
    checked_add_u64, overflows_u32, saturating_inc_u16, Cdfh, Eocd, Lfh, Trailer, Zip64Eocd,
    Zip64EocdLocator, OVF16, OVF32,
};
use crate::store::RandomAccessStore;
use crate::tail::parse_tail;

/// The archive assembler. Generic-free: every method takes the store it
/// operates on explicitly, since the store has no implicit cursor and
/// the Assembler itself holds no reference to it between calls.
pub struct Assembler {
    write_offset: u64,
    trailer: Option<Trailer>,
    pending_cdfhs: Vec<Cdfh>,
    existing_cd_bytes: Vec<u8>,
}

impl Assembler {
    /// `Open(url)`: stat the store, and if it already holds
    /// an archive, parse its tail to recover trailer state; otherwise
    /// start a fresh, empty archive.
    pub fn open<S: RandomAccessStore>(store: &mut S) -> Result<Self> {
        store.open()?;
        let stat = store.stat()?;

        if stat.exists && stat.len > 0 {
            debug!(
                "opening existing archive: {} bytes, parsing tail",
                stat.len
            );
            let parsed = parse_tail(store, stat.len)?;
            let trailer = match parsed.zip64 {
                Some((zip64_eocd, zip64_eocdl)) => Trailer::Zip64 {
                    eocd: parsed.eocd,
                    zip64_eocd,
                    zip64_eocdl,
                },
                None => Trailer::Classic(parsed.eocd),
            };
            debug!(
                "existing archive has {} entries, useZip64={}",
                trailer.eocd().nb_cd_rec,
                trailer.is_zip64()
            );
            let write_offset = trailer.cd_offset();
            Ok(Self {
                write_offset,
                trailer: Some(trailer),
                pending_cdfhs: Vec::new(),
                existing_cd_bytes: parsed.existing_cd_bytes,
            })
        } else {
            debug!("no existing archive found, starting a new one");
            Ok(Self {
                write_offset: 0,
                trailer: None,
                pending_cdfhs: Vec::new(),
                existing_cd_bytes: Vec::new(),
            })
        }
    }

    /// `Append(filename, crc, fileSize, mtime, mode)`: build
    /// the entry's LFH/CDFH, fold it into the trailer along whichever of
    /// the three paths applies, then write the LFH bytes at the
    /// newly-computed `writeOffset`.
    pub fn append<S: RandomAccessStore>(
        &mut self,
        store: &mut S,
        filename: &[u8],
        crc32: u32,
        file_size: u64,
        mtime_epoch_secs: i64,
        mode: u32,
    ) -> Result<()> {
        let lfh = Lfh::new(filename, crc32, file_size, mtime_epoch_secs);

        let outcome = match self.trailer.clone() {
            None => self.append_create_new(&lfh, mode),
            Some(Trailer::Zip64 {
                eocd,
                zip64_eocd,
                zip64_eocdl,
            }) => self.append_existing_zip64(&lfh, mode, eocd, zip64_eocd, zip64_eocdl),
            Some(Trailer::Classic(eocd)) => self.append_existing_classic(&lfh, mode, eocd),
        };
        // Only commit the new trailer once the fold succeeded: a checked-add
        // overflow must leave the Assembler's existing state untouched.
        let (new_trailer, lfh_offset, cdfh) = outcome?;

        self.write_offset = lfh_offset;
        self.trailer = Some(new_trailer);
        self.pending_cdfhs.push(cdfh);

        trace!(
            "Append({:?}): writing LFH ({} bytes) at offset {}",
            String::from_utf8_lossy(filename),
            lfh.lfh_size,
            self.write_offset
        );

        let mut buf = Vec::new();
        encode_lfh(&lfh, &mut buf);
        store.write_at(self.write_offset, &buf)?;
        self.write_offset += lfh.lfh_size;

        Ok(())
    }

    fn append_create_new(&self, lfh: &Lfh, mode: u32) -> Result<(Trailer, u64, Cdfh)> {
        let cdfh = Cdfh::new(lfh, mode, 0);
        let (eocd, promote) = Eocd::for_new_archive(lfh, &cdfh);
        let lfh_offset = cdfh.true_offset();

        let trailer = if promote {
            debug!("first entry already exceeds classic limits, promoting to ZIP64");
            let zip64_eocd = Zip64Eocd::promote(&eocd, lfh, &cdfh, 0, 0, 1, 1)?;
            let zip64_eocdl = Zip64EocdLocator::new(&zip64_eocd)?;
            Trailer::Zip64 {
                eocd,
                zip64_eocd,
                zip64_eocdl,
            }
        } else {
            Trailer::Classic(eocd)
        };

        Ok((trailer, lfh_offset, cdfh))
    }

    fn append_existing_zip64(
        &self,
        lfh: &Lfh,
        mode: u32,
        mut eocd: Eocd,
        mut zip64_eocd: Zip64Eocd,
        mut zip64_eocdl: Zip64EocdLocator,
    ) -> Result<(Trailer, u64, Cdfh)> {
        let lfh_offset = zip64_eocd.cd_offset;
        let cdfh = Cdfh::new(lfh, mode, lfh_offset);

        eocd.nb_cd_rec_d = saturating_inc_u16(eocd.nb_cd_rec_d);
        eocd.nb_cd_rec = saturating_inc_u16(eocd.nb_cd_rec);

        zip64_eocd.nb_cd_rec_d += 1;
        zip64_eocd.nb_cd_rec += 1;
        zip64_eocd.cd_size = checked_add_u64(zip64_eocd.cd_size, cdfh.cdfh_size)?;
        zip64_eocd.cd_offset = checked_add_u64(
            checked_add_u64(zip64_eocd.cd_offset, lfh.lfh_size)?,
            lfh.true_compressed_size(),
        )?;
        zip64_eocdl.zip64_eocd_offset = checked_add_u64(zip64_eocd.cd_offset, zip64_eocd.cd_size)?;

        Ok((
            Trailer::Zip64 {
                eocd,
                zip64_eocd,
                zip64_eocdl,
            },
            lfh_offset,
            cdfh,
        ))
    }

    fn append_existing_classic(
        &self,
        lfh: &Lfh,
        mode: u32,
        mut eocd: Eocd,
    ) -> Result<(Trailer, u64, Cdfh)> {
        let lfh_offset = eocd.cd_offset as u64;
        let cdfh = Cdfh::new(lfh, mode, lfh_offset);

        let tentative_cd_size = eocd.cd_size as u64 + cdfh.cdfh_size;
        let tentative_cd_offset = eocd.cd_offset as u64 + lfh.lfh_size + lfh.compressed_size as u64;
        let next_nb_cd_rec_d = eocd.nb_cd_rec_d as u32 + 1;
        let next_nb_cd_rec = eocd.nb_cd_rec as u32 + 1;

        let promote = overflows_u32(tentative_cd_size)
            || lfh.compressed_size == OVF32
            || overflows_u32(tentative_cd_offset)
            || next_nb_cd_rec_d >= OVF16 as u32
            || next_nb_cd_rec >= OVF16 as u32;

        if promote {
            debug!(
                "append crosses a classic ZIP limit, promoting to ZIP64 (cd_size={}, cd_offset={}, nb_cd_rec={})",
                tentative_cd_size, tentative_cd_offset, next_nb_cd_rec
            );
            let prev_cd_size = eocd.cd_size as u64;
            let prev_cd_offset = eocd.cd_offset as u64;
            let true_nb_cd_rec_d = eocd.nb_cd_rec_d as u64 + 1;
            let true_nb_cd_rec = eocd.nb_cd_rec as u64 + 1;

            eocd.cd_size = OVF32;
            eocd.cd_offset = OVF32;
            eocd.nb_cd_rec_d = saturating_inc_u16(eocd.nb_cd_rec_d);
            eocd.nb_cd_rec = saturating_inc_u16(eocd.nb_cd_rec);

            let zip64_eocd = Zip64Eocd::promote(
                &eocd,
                lfh,
                &cdfh,
                prev_cd_size,
                prev_cd_offset,
                true_nb_cd_rec_d,
                true_nb_cd_rec,
            )?;
            let zip64_eocdl = Zip64EocdLocator::new(&zip64_eocd)?;

            Ok((
                Trailer::Zip64 {
                    eocd,
                    zip64_eocd,
                    zip64_eocdl,
                },
                lfh_offset,
                cdfh,
            ))
        } else {
            eocd.cd_size = tentative_cd_size as u32;
            eocd.cd_offset = tentative_cd_offset as u32;
            eocd.nb_cd_rec_d = next_nb_cd_rec_d as u16;
            eocd.nb_cd_rec = next_nb_cd_rec as u16;

            Ok((Trailer::Classic(eocd), lfh_offset, cdfh))
        }
    }

    /// `WriteFileData(buf, len, fileOffset)`: place payload
    /// bytes at `writeOffset + fileOffset` relative to the most recent
    /// `Append`'s entry. Successive calls for one entry must together
    /// cover `[0, compressedSize)`; this is the caller's responsibility.
    pub fn write_file_data<S: RandomAccessStore>(
        &mut self,
        store: &mut S,
        buf: &[u8],
        file_offset: u64,
    ) -> Result<()> {
        trace!(
            "WriteFileData: {} bytes at absolute offset {}",
            buf.len(),
            self.write_offset + file_offset
        );
        store.write_at(self.write_offset + file_offset, buf)
    }

    /// `Finalize()`: emit pre-existing CD bytes verbatim (if
    /// appending), then the new CDFHs, then the ZIP64 trailer pair (if
    /// promoted), then the classic EOCD. Recomputes its start offset from
    /// the trailer every call, so issuing it twice with no intervening
    /// `Append` reproduces identical bytes.
    pub fn finalize<S: RandomAccessStore>(&mut self, store: &mut S) -> Result<()> {
        if self.trailer.is_none() {
            // Zero Appends is a valid path through Open -> Finalize -> Close:
            // an empty archive is just a bare EOCD with nb_cd_rec = 0.
            self.trailer = Some(Trailer::Classic(Eocd {
                nb_disk: 0,
                nb_disk_cd: 0,
                nb_cd_rec_d: 0,
                nb_cd_rec: 0,
                cd_size: 0,
                cd_offset: 0,
                comment: Vec::new(),
            }));
        }
        let trailer = self.trailer.as_ref().expect("set above");

        let mut offset = trailer.cd_offset();
        trace!("Finalize: writing central directory starting at offset {}", offset);

        if !self.existing_cd_bytes.is_empty() {
            store.write_at(offset, &self.existing_cd_bytes)?;
            offset += self.existing_cd_bytes.len() as u64;
        }

        for cdfh in &self.pending_cdfhs {
            let mut buf = Vec::new();
            encode_cdfh(cdfh, &mut buf);
            store.write_at(offset, &buf)?;
            offset += cdfh.cdfh_size;
        }

        if let Trailer::Zip64 {
            eocd,
            zip64_eocd,
            zip64_eocdl,
        } = trailer
        {
            let mut buf = Vec::new();
            encode_zip64_eocd(zip64_eocd, &mut buf);
            store.write_at(offset, &buf)?;
            offset += zip64_eocd.total_size();

            let mut buf = Vec::new();
            encode_zip64_eocdl(zip64_eocdl, &mut buf);
            store.write_at(offset, &buf)?;
            offset += crate::model::ZIP64_EOCDL_SIZE;

            let mut buf = Vec::new();
            encode_eocd(eocd, &mut buf);
            store.write_at(offset, &buf)?;
        } else if let Trailer::Classic(eocd) = trailer {
            let mut buf = Vec::new();
            encode_eocd(eocd, &mut buf);
            store.write_at(offset, &buf)?;
        }

        Ok(())
    }

    /// `Close()`: release the store. Does not itself finalize.
    pub fn close<S: RandomAccessStore>(&mut self, store: &mut S) -> Result<()> {
        store.close()
    }

    pub fn is_zip64(&self) -> bool {
        self.trailer.as_ref().map(Trailer::is_zip64).unwrap_or(false)
    }

    pub fn entry_count(&self) -> u16 {
        self.trailer
            .as_ref()
            .map(|t| t.eocd().nb_cd_rec)
            .unwrap_or(0)
    }
}
