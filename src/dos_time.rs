//! Epoch seconds <-> MS-DOS date/time conversion
//!
//! ZIP local file headers and central directory headers store modification
//! times as two 16-bit fields in MS-DOS format, computed from the local
//! time of the underlying system (APPNOTE 4.4.6). `s-zip`'s own
//! `LFH::MsdosDateTime` (`original_source/ZipArchive.cc`) does this with
//! `localtime()`; this module reproduces that conversion with `chrono`
//! instead of hand-rolled calendar math.

use chrono::{Datelike, Local, TimeZone, Timelike};

/// Convert epoch seconds to `(mod_time, mod_date)` MS-DOS fields, in local
/// time. Years before 1980 or after 2107 wrap silently (the MS-DOS year
/// field only has 7 bits of range starting at 1980), matching the
/// behavior of the original implementation's unchecked bit-packing.
pub fn to_msdos(epoch_secs: i64) -> (u16, u16) {
    let dt = match Local.timestamp_opt(epoch_secs, 0) {
        chrono::LocalResult::Single(dt) => dt,
        chrono::LocalResult::Ambiguous(dt, _) => dt,
        chrono::LocalResult::None => Local.timestamp_opt(0, 0).single().unwrap(),
    };

    let hour = dt.hour() as u16;
    let min = dt.minute() as u16;
    let sec = (dt.second() / 2) as u16;
    let year = (dt.year() - 1980) as i32 as u16;
    let month = dt.month() as u16;
    let day = dt.day() as u16;

    let mod_time = (hour << 11) | (min << 5) | sec;
    let mod_date = (year << 9) | (month << 5) | day;
    (mod_time, mod_date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_zero_does_not_panic() {
        let (_time, _date) = to_msdos(0);
    }

    #[test]
    fn known_instant_round_trips_fields() {
        // 2021-05-17 10:30:46 UTC — just check the packed fields decode
        // back to sane ranges, since the actual hour/day depend on the
        // local timezone of whatever machine runs the test.
        let (time, date) = to_msdos(1_621_247_446);
        let hour = time >> 11;
        let min = (time >> 5) & 0x3f;
        let sec2 = time & 0x1f;
        assert!(hour <= 23);
        assert!(min <= 59);
        assert!(sec2 <= 29);

        let year = date >> 9;
        let month = (date >> 5) & 0xf;
        let day = date & 0x1f;
        assert!(year <= 127);
        assert!((1..=12).contains(&month));
        assert!((1..=31).contains(&day));
    }
}
