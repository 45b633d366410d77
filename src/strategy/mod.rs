//! Strategies for acquiring prefix statistics over a text channel.
//!
//! - [`exact`]: One count query per prefix length. Exact, O(max prefix length) round trips.
//! - [`fallback`]: Ordered listing variants for one session, first nonempty result wins.
//! - [`sampling`]: One listing taken as a sample and scaled to the table's true size.
//!
//! Each strategy returns a [`StrategyOutcome`] whose `total_observed` tells the caller
//! whether it produced usable data. Strategies never retry beyond their own sequences, and
//! no strategy keeps state between calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::channel::TransportError;
use crate::prefix::PrefixStatistics;

pub mod exact;
pub mod fallback;
pub mod sampling;

/// Statistics produced by a strategy, with the total used to judge success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutcome {
    pub statistics: PrefixStatistics,
    pub total_observed: i64,
}

impl StrategyOutcome {
    pub fn new(statistics: PrefixStatistics) -> Self {
        let total_observed = statistics.total();
        Self {
            statistics,
            total_observed,
        }
    }

    /// A strategy succeeded if it observed at least one route.
    pub fn is_success(&self) -> bool {
        self.total_observed > 0
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("no routes observed")]
    NoData,

    #[error("cancelled after {completed} of {total} queries")]
    Cancelled { completed: usize, total: usize },

    #[error(
        "all {attempts} attempts failed{}",
        .last.as_ref().map(|err| format!(", last error: {err}")).unwrap_or_default()
    )]
    Exhausted {
        attempts: usize,
        #[source]
        last: Option<TransportError>,
    },
}

/// Shared flag that aborts running table sweeps.
///
/// A sweep that observes the flag fails as a whole; partial counts are discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Clears the flag so later sweeps run again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Simulated channels for strategy and service tests.
#[cfg(test)]
pub(crate) mod testutil {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::channel::{Querier, TransportError};

    /// Answers commands from a fixed table and records every command it receives.
    ///
    /// Commands missing from the table fail with a transport error.
    #[derive(Debug, Default)]
    pub struct ScriptedQuerier {
        replies: HashMap<String, String>,
        log: Mutex<Vec<String>>,
    }

    impl ScriptedQuerier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(mut self, command: impl Into<String>, reply: impl Into<String>) -> Self {
            self.replies.insert(command.into(), reply.into());
            self
        }

        pub fn issued(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Querier for ScriptedQuerier {
        fn query(&self, channel: &str, command: &str) -> Result<String, TransportError> {
            self.log.lock().unwrap().push(command.to_owned());
            self.replies.get(command).cloned().ok_or_else(|| {
                TransportError::new(
                    channel,
                    command,
                    std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "no reply scripted"),
                )
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefix::IpVersion;

    #[test]
    fn test_outcome_success() {
        let mut stats = PrefixStatistics::new("t", IpVersion::V4);
        assert!(!StrategyOutcome::new(stats.clone()).is_success());

        stats.add_route(24);
        let outcome = StrategyOutcome::new(stats);
        assert!(outcome.is_success());
        assert_eq!(outcome.total_observed, 1);
    }

    #[test]
    fn test_cancel_flag_is_shared() {
        let flag = CancelFlag::default();
        let clone = flag.clone();
        clone.cancel();
        assert!(flag.is_cancelled());
        flag.reset();
        assert!(!clone.is_cancelled());
    }

    #[test]
    fn test_exhausted_message() {
        let err = StrategyError::Exhausted {
            attempts: 2,
            last: None,
        };
        assert_eq!(err.to_string(), "all 2 attempts failed");

        let err = StrategyError::Exhausted {
            attempts: 5,
            last: Some(TransportError::new(
                "/run/bird/bird.ctl",
                "show route",
                std::io::Error::other("boom"),
            )),
        };
        assert!(err.to_string().ends_with("last error: query `show route` on channel `/run/bird/bird.ctl` failed: boom"));
    }
}
