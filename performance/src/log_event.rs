/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */

/// Replay guard events that might be interesting to log or aggregate into metrics.
#[derive(PartialEq, Eq, Clone, Copy, Hash)]
pub enum LogEvent {
    /// `(counter)` was accepted and recorded.
    Accepted(u64),
    /// An accepted counter moved the window forward.
    WindowAdvanced {
        /// Highest accepted counter before the move.
        from: u64,
        /// Highest accepted counter after the move.
        to: u64,
    },
    /// `(counter)` was inside the window but had already been seen.
    RejectedDuplicate(u64),
    /// `(counter)` was behind the window.
    RejectedExpired(u64),
    /// The window was rewound. `last` is the highest counter accepted before the reset.
    Reset {
        /// Highest accepted counter before the reset.
        last: u64,
    },
}

impl std::fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted(arg0) => f.debug_tuple("Accepted").field(arg0).finish(),
            Self::WindowAdvanced { from, to } => f
                .debug_struct("WindowAdvanced")
                .field("from", from)
                .field("to", to)
                .finish(),
            Self::RejectedDuplicate(arg0) => f.debug_tuple("RejectedDuplicate").field(arg0).finish(),
            Self::RejectedExpired(arg0) => f.debug_tuple("RejectedExpired").field(arg0).finish(),
            Self::Reset { last } => f.debug_struct("Reset").field("last", last).finish(),
        }
    }
}
