/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
//! Sliding Window Anti-Replay
//! ======
//!
//! Datagram protocols that number their packets with a 64-bit counter must refuse to process the
//! same counter twice, or an attacker can simply record and resend authenticated packets. At the
//! same time the network is allowed to reorder packets, so "counter must be larger than the last
//! one" is too strict.
//!
//! `SlidingWindowFilter` remembers which of the `size` counters at or behind the highest accepted
//! counter have been seen. Counters ahead of the window are always accepted and move it forward,
//! counters inside it are accepted once, and counters behind it are rejected. The window is a
//! power-of-two ring of 64-bit blocks indexed by a mask, so checking and recording are amortized
//! O(1) for any window width.
//!
//! `ReplayGuard` wraps the filter for use by a session that is shared between threads, reports
//! why a counter was rejected, and feeds events to `ApplicationLayer::event_log`.
//!
//! This repository includes both this high performance implementation and a simpler
//! [reference](../reference/) implementation that keeps one `bool` per window position and
//! shifts them on every move. The reference exists to test this crate against.
#![warn(missing_docs, rust_2018_idioms)]

#[cfg(feature = "logging")]
mod log_event;
mod proto;
mod window;

/// Replay protection for a session shared between threads.
pub mod guard;

/// Application integration: settings and the event log hook.
pub mod application;
/// The collection of major return types of this library.
pub mod result;

pub use guard::ReplayGuard;
#[cfg(feature = "logging")]
pub use log_event::LogEvent;
pub use window::SlidingWindowFilter;
