/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use zeroize::Zeroize;

use crate::proto::*;

/// Returns the number of ring blocks needed to track `size` trailing counters.
///
/// The window can straddle a block boundary, so one block more than `size` strictly needs is
/// reserved. The result is rounded up to a power of two so ring indices can be masked.
const fn ring_blocks(size: u64) -> u64 {
    (size.div_ceil(BLOCK_BITS) + 1).next_power_of_two()
}

/// Sliding window anti-replay filter over 64-bit counters.
///
/// Tracks the highest counter accepted so far (`last`) plus, for each of the `size` counters at
/// or behind `last`, whether that counter has already been seen. Counters ahead of `last` are
/// always acceptable, counters `size` or more behind `last` are always rejected, and counters in
/// between are accepted exactly once.
///
/// The seen-bits live in a power-of-two ring of 64-bit blocks addressed by absolute counter
/// position: counter `c` is bit `c % 64` of block `(c / 64) % capacity`. Moving the window forward
/// only clears the blocks it moves into, so every operation is amortized O(1) regardless of
/// window size.
///
/// Not internally synchronized. Share between threads through a `ReplayGuard` or an external lock.
#[derive(Clone)]
pub struct SlidingWindowFilter {
    size: u64,
    last: u64,
    ring_block_index_mask: u64,
    ring: Box<[u64]>,
}

impl SlidingWindowFilter {
    /// Create a filter that remembers the `size` most recent counter positions.
    ///
    /// A `size` of zero is allowed and produces a filter that only accepts strictly increasing
    /// counters. Storage is allocated once here and never grows.
    pub fn new(size: u64) -> Self {
        let blocks = ring_blocks(size);
        Self {
            size,
            last: 0,
            ring_block_index_mask: blocks - 1,
            ring: vec![0u64; usize::try_from(blocks).unwrap_or(usize::MAX)].into_boxed_slice(),
        }
    }

    /// The configured window width.
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// The highest counter accepted so far, or 0 if none has been.
    #[inline]
    pub fn last(&self) -> u64 {
        self.last
    }

    /// Number of 64-bit blocks in the ring.
    #[inline]
    pub fn ring_capacity(&self) -> usize {
        self.ring.len()
    }

    /// Returns true if `counter` is at least `size` positions behind the highest accepted counter.
    /// Such counters can never be accepted again.
    #[inline]
    pub fn is_expired(&self, counter: u64) -> bool {
        counter <= self.last && self.last - counter >= self.size
    }

    /// Check whether `counter` would be accepted, without recording it.
    #[inline]
    pub fn is_ok(&self, counter: u64) -> bool {
        if counter > self.last {
            return true;
        }
        if self.last - counter >= self.size {
            return false;
        }
        self.ring[self.block_index(counter)] & bit_mask(counter) == 0
    }

    /// Record `counter` as seen without checking whether it is acceptable.
    ///
    /// The caller must already have validated `counter` with `is_ok`, with no other mutation in
    /// between. Recording a counter that is already seen is harmless. A counter that is behind
    /// the window has no position left to record and is ignored.
    ///
    /// Untrusted input should go through `add` instead.
    #[inline]
    pub fn must_add(&mut self, counter: u64) {
        if counter > self.last {
            self.advance(counter);
        } else if self.last - counter >= self.size {
            return;
        }
        let idx = self.block_index(counter);
        self.ring[idx] |= bit_mask(counter);
    }

    /// Check `counter` and record it if it is acceptable.
    ///
    /// Returns true if the counter was accepted. A rejected counter leaves the filter unchanged.
    pub fn add(&mut self, counter: u64) -> bool {
        if counter > self.last {
            self.advance(counter);
        } else if self.last - counter >= self.size {
            return false;
        }
        let idx = self.block_index(counter);
        let mask = bit_mask(counter);
        let block = self.ring[idx];
        self.ring[idx] = block | mask;
        block & mask == 0
    }

    /// Forget every recorded counter and rewind `last` to 0.
    ///
    /// The ring is cleared in place; no allocation happens.
    pub fn reset(&mut self) {
        self.last = 0;
        self.ring[..].zeroize();
    }

    /// Move `last` forward to `counter`, clearing every block the window moves into.
    ///
    /// Bits above `last` inside `last`'s own block are always clear, so a move that stays inside
    /// the current block touches no memory.
    fn advance(&mut self, counter: u64) {
        debug_assert!(counter > self.last);
        let current = self.last >> BLOCK_BIT_LOG;
        let target = counter >> BLOCK_BIT_LOG;
        if target - current >= self.ring.len() as u64 {
            self.ring.fill(0);
        } else {
            for block in current + 1..=target {
                self.ring[(block & self.ring_block_index_mask) as usize] = 0;
            }
        }
        self.last = counter;
    }

    #[inline(always)]
    fn block_index(&self, counter: u64) -> usize {
        ((counter >> BLOCK_BIT_LOG) & self.ring_block_index_mask) as usize
    }
}

#[inline(always)]
fn bit_mask(counter: u64) -> u64 {
    1u64 << (counter & BLOCK_BIT_MASK)
}

impl std::fmt::Debug for SlidingWindowFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlidingWindowFilter")
            .field("size", &self.size)
            .field("last", &self.last)
            .field("ring_capacity", &self.ring.len())
            .finish()
    }
}
