//! Fuzz target checking `is_ok` followed by an unconditional `must_add` against the reference
//! filter.
//!
//! # Input Format
//!
//! - Bytes 0..2 → window size (little endian `u16`, clamped to 0..=4096)
//! - Remaining bytes as 3-byte `(op, lo, hi)` records, `v = u16::from_le_bytes([lo, hi])`:
//!   - `op & 0xc0 == 0xc0` → jump the base forward by `v * 64` and use the new base
//!   - `op & 0xc0 == 0x80` → counter `base + v % 128` (ahead of or at the window head)
//!   - otherwise          → counter `base - v` (inside or behind the window)
//!
//! # Running
//!
//! ```bash
//! cargo +nightly fuzz run fuzz_is_ok_must_add
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;

use antireplay::SlidingWindowFilter;
use antireplay_reference::ReferenceFilter;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    let size = u16::from_le_bytes([data[0], data[1]]).min(4096) as u64;
    let mut filter = SlidingWindowFilter::new(size);
    let mut reference = ReferenceFilter::new(size as usize);

    for record in data[2..].chunks_exact(3) {
        let v = u16::from_le_bytes([record[1], record[2]]) as u64;
        let base = reference.last();
        let counter = match record[0] & 0xc0 {
            0xc0 => base + v * 64,
            0x80 => base + v % 128,
            _ => base.saturating_sub(v),
        };
        assert_eq!(filter.is_ok(counter), reference.is_ok(counter), "is_ok({counter})");
        filter.must_add(counter);
        reference.must_add(counter);
        assert_eq!(filter.last(), reference.last());
    }
});
