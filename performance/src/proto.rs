/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */

/* Ring block constants */

/// log2 of the number of counter positions held by one ring block.
pub(crate) const BLOCK_BIT_LOG: u64 = 6;
/// Number of counter positions held by one ring block. Must be a power of 2.
pub(crate) const BLOCK_BITS: u64 = 1 << BLOCK_BIT_LOG;
pub(crate) const BLOCK_BIT_MASK: u64 = BLOCK_BITS - 1;

/* Settings defaults */

/// Window width used when an application does not override `ApplicationLayer::SETTINGS`.
/// Four full ring blocks.
pub const DEFAULT_WINDOW_SIZE: u64 = 4 * BLOCK_BITS;
