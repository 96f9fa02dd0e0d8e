/* This Source Code Form is subject to the terms of the Mozilla Public
* License, v. 2.0. If a copy of the MPL was not distributed with this
* file, You can obtain one at https://mozilla.org/MPL/2.0/.
*
* (c) ZeroTier, Inc.
* https://www.zerotier.com/
*/
//! Sliding Window Anti-Replay, reference implementation
//! ======
//!
//! A deliberately simple implementation of the sliding window filter. Every window position is a
//! `bool`, position `i` being the counter `i` behind the highest accepted counter, and moving the
//! window forward copies the whole window. This costs O(size) per move, but every step can be
//! checked by eye.
//!
//! It exists so that the high performance [`antireplay`](../performance/) crate can be tested and
//! benchmarked against it. It must agree with `antireplay::SlidingWindowFilter` on every input.
#![warn(missing_docs, rust_2018_idioms)]

/// Sliding window anti-replay filter keeping one `bool` per window position.
#[derive(Clone, Debug)]
pub struct ReferenceFilter {
    last: u64,
    bits: Vec<bool>,
    temp: Vec<bool>,
}

impl ReferenceFilter {
    /// Create a filter that remembers the `size` most recent counter positions.
    pub fn new(size: usize) -> Self {
        Self { last: 0, bits: vec![false; size], temp: vec![false; size] }
    }

    /// The configured window width.
    pub fn size(&self) -> u64 {
        self.bits.len() as u64
    }

    /// The highest counter accepted so far, or 0 if none has been.
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Forget every recorded counter and rewind to 0.
    pub fn reset(&mut self) {
        self.last = 0;
        self.bits.fill(false);
    }

    /// Check whether `counter` would be accepted, without recording it.
    pub fn is_ok(&self, counter: u64) -> bool {
        // Accept counter if it is ahead of window.
        if counter > self.last {
            return true;
        }

        // Reject counter if it is behind window.
        let diff = self.last - counter;
        if diff >= self.size() {
            return false;
        }

        // Within window, accept if not seen before.
        !self.bits[diff as usize]
    }

    /// Record `counter` as seen. Counters behind the window are ignored.
    pub fn must_add(&mut self, counter: u64) {
        let diff = if counter > self.last {
            self.move_ahead(counter - self.last);
            self.last = counter;
            0
        } else {
            self.last - counter
        };
        if diff < self.size() {
            self.bits[diff as usize] = true;
        }
    }

    /// Check `counter` and record it if it is acceptable.
    pub fn add(&mut self, counter: u64) -> bool {
        let ok = self.is_ok(counter);
        if ok {
            self.must_add(counter);
        }
        ok
    }

    fn move_ahead(&mut self, count: u64) {
        let size = self.bits.len();
        if count >= size as u64 {
            self.bits.fill(false);
            return;
        }
        let count = count as usize;
        self.temp[count..].copy_from_slice(&self.bits[..size - count]);
        std::mem::swap(&mut self.bits, &mut self.temp);
        self.temp.fill(false);
    }
}
