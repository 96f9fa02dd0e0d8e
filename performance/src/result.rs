/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */

/// A type of fault that occurred because we received a counter we must not accept.
///
/// An unauthenticated attacker can intentionally trigger any of these by replaying packets, so
/// it is best to treat these as raw user input that needs to be sanitized.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum FaultType {
    /// The counter is inside the window but has already been accepted once.
    ///
    /// Occurs naturally when the underlying medium duplicates packets.
    DuplicateCounter,

    /// The counter is so far behind the highest accepted counter that it is outside the window.
    ///
    /// Occurs naturally when the underlying medium reorders packets by more than the window width.
    ExpiredCounter,
}

/// An error that occurred while checking or recording a counter.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
pub enum ReplayError {
    /// A counter was rejected. The packet carrying it must be dropped.
    ///
    /// Because a remote peer can force these to occur at will, it is recommended in production
    /// to either drop these immediately, or log them safely to a local output stream and then
    /// drop them.
    ByzantineFault {
        /// The type of fault that has occurred.
        error: FaultType,
        /// The file of this crate from which this error was generated.
        #[cfg(feature = "debug")]
        file: &'static str,
        /// The line number of this crate from which this error was generated.
        #[cfg(feature = "debug")]
        line: u32,
    },
}

impl ReplayError {
    /// The type of fault behind this error.
    pub fn fault_type(&self) -> FaultType {
        match self {
            Self::ByzantineFault { error, .. } => *error,
        }
    }
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.fault_type() {
            FaultType::DuplicateCounter => write!(f, "counter was already accepted"),
            FaultType::ExpiredCounter => write!(f, "counter is behind the replay window"),
        }
    }
}

impl std::error::Error for ReplayError {}

macro_rules! fault {
    ($name:expr) => {
        ReplayError::ByzantineFault {
            #[cfg(feature = "debug")]
            file: file!(),
            #[cfg(feature = "debug")]
            line: line!(),
            error: $name,
        }
    };
}
pub(crate) use fault;
