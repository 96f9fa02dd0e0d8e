/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
pub use crate::proto::DEFAULT_WINDOW_SIZE;

/// A container for the dynamic settings of a replay guard.
///
/// Both the window width and the ring it implies are fixed for the lifetime of a guard, so
/// changing these settings only affects guards created afterwards.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Settings {
    /// Number of trailing counter positions that are individually remembered.
    ///
    /// Counters this many positions or more behind the highest accepted counter are rejected
    /// outright. A value of 0 only accepts strictly increasing counters, which is only suitable
    /// for transports that never reorder.
    ///
    /// Memory use is roughly `window_size / 8` bytes, rounded up to a power of two number of
    /// 64-bit blocks.
    pub window_size: u64,
}
impl Settings {
    /// Default value for the `window_size`.
    /// The default is 256 counter positions.
    pub const DEFAULT_WINDOW_SIZE: u64 = DEFAULT_WINDOW_SIZE;
    /// Create an instance of Settings with all default values.
    pub const fn new() -> Self {
        Self { window_size: Self::DEFAULT_WINDOW_SIZE }
    }
    /// Create an instance of Settings with the given window width.
    pub const fn with_window_size(window_size: u64) -> Self {
        Self { window_size }
    }
}
impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait to implement to integrate replay protection into an application.
///
/// The constants exposed in this trait can be redefined from their defaults. Unlike most protocol
/// settings, the window width does not need to agree between peers; each receiver picks how much
/// reordering it is willing to tolerate.
pub trait ApplicationLayer: Sized {
    /// Settings used by guards created with `ReplayGuard::for_app`.
    const SETTINGS: Settings = Settings::new();

    /// Receives a stream of events that occur while counters are checked.
    /// These are provided for debugging, logging or metrics purposes, and must be used for
    /// nothing else. Do not base protocol-level decisions upon the events passed to this function.
    #[cfg(feature = "logging")]
    #[allow(unused)]
    fn event_log(&mut self, event: crate::LogEvent) {}
}

/// An application with default settings that discards all events.
impl ApplicationLayer for () {}
