/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 *
 * (c) ZeroTier, Inc.
 * https://www.zerotier.com/
 */
use std::sync::Mutex;

use crate::application::{ApplicationLayer, Settings};
use crate::result::{fault, FaultType, ReplayError};
use crate::window::SlidingWindowFilter;
#[cfg(feature = "logging")]
use crate::LogEvent::*;

/// Macro to turn off logging at compile time.
macro_rules! log {
    ($app:expr, $event:expr) => {
        #[cfg(feature = "logging")]
        $app.event_log($event);
    };
}

/// Replay protection for a single receive path.
///
/// Wraps a `SlidingWindowFilter` in a mutex so that one session's counters can be checked from
/// several threads. Counters are meant to be checked twice: once with `check` as soon as the
/// packet header is parsed, so obvious replays are dropped before any expensive authentication
/// work, and once with `update` after the packet has been authenticated, which atomically
/// re-checks and records the counter.
///
/// A counter must never be recorded before its packet is authenticated, otherwise an attacker
/// could burn counters that the real peer has yet to send.
pub struct ReplayGuard {
    window: Mutex<SlidingWindowFilter>,
}

impl ReplayGuard {
    /// Create a guard configured by `settings`.
    pub fn new(settings: &Settings) -> Self {
        Self::with_size(settings.window_size)
    }

    /// Create a guard configured by `App::SETTINGS`.
    pub fn for_app<App: ApplicationLayer>() -> Self {
        Self::new(&App::SETTINGS)
    }

    /// Create a guard that remembers the `size` most recent counter positions.
    pub fn with_size(size: u64) -> Self {
        Self { window: Mutex::new(SlidingWindowFilter::new(size)) }
    }

    /// The configured window width.
    pub fn size(&self) -> u64 {
        self.window.lock().unwrap().size()
    }

    /// The highest counter accepted so far, or 0 if none has been.
    pub fn last(&self) -> u64 {
        self.window.lock().unwrap().last()
    }

    /// Check whether `counter` would currently be accepted, without recording it.
    ///
    /// Passing this check is no guarantee that `update` will succeed, since another thread may
    /// record the same counter in between.
    pub fn check(&self, counter: u64) -> Result<(), ReplayError> {
        classify(&self.window.lock().unwrap(), counter)
    }

    /// Check `counter` and record it if it is acceptable.
    ///
    /// This should only be called after the packet carrying `counter` is authenticated.
    /// Exactly one call succeeds for any given counter, no matter how many threads race on it.
    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    pub fn update<App: ApplicationLayer>(&self, app: &mut App, counter: u64) -> Result<(), ReplayError> {
        let mut window = self.window.lock().unwrap();
        if let Err(e) = classify(&window, counter) {
            drop(window);
            log!(
                app,
                match e.fault_type() {
                    FaultType::DuplicateCounter => RejectedDuplicate(counter),
                    FaultType::ExpiredCounter => RejectedExpired(counter),
                }
            );
            return Err(e);
        }
        #[cfg(feature = "logging")]
        let from = window.last();
        window.must_add(counter);
        drop(window);

        #[cfg(feature = "logging")]
        if counter > from {
            app.event_log(WindowAdvanced { from, to: counter });
        }
        log!(app, Accepted(counter));
        Ok(())
    }

    /// Forget every recorded counter, as if the guard had just been created.
    ///
    /// Typically called when the session switches to a new key and restarts its counters.
    #[cfg_attr(not(feature = "logging"), allow(unused_variables))]
    pub fn reset<App: ApplicationLayer>(&self, app: &mut App) {
        let mut window = self.window.lock().unwrap();
        let last = window.last();
        window.reset();
        drop(window);
        log!(app, Reset { last });
    }
}

impl Default for ReplayGuard {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl std::fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ReplayGuard").field(&self.window).finish()
    }
}

fn classify(window: &SlidingWindowFilter, counter: u64) -> Result<(), ReplayError> {
    if window.is_ok(counter) {
        Ok(())
    } else if window.is_expired(counter) {
        Err(fault!(FaultType::ExpiredCounter))
    } else {
        Err(fault!(FaultType::DuplicateCounter))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn check_then_update() {
        let guard = ReplayGuard::with_size(64);
        assert_eq!(guard.check(10), Ok(()));
        assert_eq!(guard.update(&mut (), 10), Ok(()));
        assert_eq!(guard.check(10).unwrap_err().fault_type(), FaultType::DuplicateCounter);
        assert_eq!(guard.update(&mut (), 10).unwrap_err().fault_type(), FaultType::DuplicateCounter);

        assert_eq!(guard.update(&mut (), 100), Ok(()));
        assert_eq!(guard.last(), 100);
        assert_eq!(guard.check(36).unwrap_err().fault_type(), FaultType::ExpiredCounter);
        assert_eq!(guard.check(37), Ok(()));
        assert_eq!(guard.check(10).unwrap_err().to_string(), "counter is behind the replay window");
    }

    #[test]
    fn settings() {
        struct Narrow;
        impl ApplicationLayer for Narrow {
            const SETTINGS: Settings = Settings::with_window_size(8);
        }
        assert_eq!(ReplayGuard::for_app::<Narrow>().size(), 8);
        assert_eq!(ReplayGuard::for_app::<()>().size(), Settings::DEFAULT_WINDOW_SIZE);
        assert_eq!(ReplayGuard::default().size(), 256);
    }

    #[test]
    fn reset() {
        let guard = ReplayGuard::with_size(16);
        for c in 0..40 {
            assert_eq!(guard.update(&mut (), c), Ok(()));
        }
        guard.reset(&mut ());
        assert_eq!(guard.last(), 0);
        for c in 0..40 {
            assert_eq!(guard.check(c), Ok(()));
        }
    }

    #[test]
    fn one_winner_per_counter() {
        const COUNTERS: u64 = 1000;
        let guard = Arc::new(ReplayGuard::with_size(1024));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let guard = guard.clone();
                thread::spawn(move || (0..COUNTERS).filter(|&c| guard.update(&mut (), c).is_ok()).count())
            })
            .collect();
        let accepted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(accepted as u64, COUNTERS);
        assert_eq!(guard.last(), COUNTERS - 1);
    }

    #[cfg(feature = "logging")]
    #[test]
    fn events() {
        use crate::LogEvent;

        #[derive(Default)]
        struct Recorder(Vec<LogEvent>);
        impl ApplicationLayer for Recorder {
            fn event_log(&mut self, event: LogEvent) {
                self.0.push(event);
            }
        }

        let mut app = Recorder::default();
        let guard = ReplayGuard::with_size(4);
        assert!(guard.update(&mut app, 0).is_ok());
        assert!(guard.update(&mut app, 5).is_ok());
        assert!(guard.update(&mut app, 3).is_ok());
        assert!(guard.update(&mut app, 3).is_err());
        assert!(guard.update(&mut app, 1).is_err());
        guard.reset(&mut app);
        assert_eq!(
            app.0,
            vec![
                LogEvent::Accepted(0),
                LogEvent::WindowAdvanced { from: 0, to: 5 },
                LogEvent::Accepted(5),
                LogEvent::Accepted(3),
                LogEvent::RejectedDuplicate(3),
                LogEvent::RejectedExpired(1),
                LogEvent::Reset { last: 5 },
            ]
        );
    }
}
