//! Prefix statistics for sessions and whole tables.
//!
//! [`PrefixStatisticsService`] picks the strategy for each request:
//!
//! - Sessions are listed with the ordered listing variants of
//!   [`crate::strategy::fallback`]. A session's share of the table is small enough to list,
//!   and listings count filtered routes a count sweep would miss.
//! - Tables are swept with [`crate::strategy::exact`]. Only if the sweep finds nothing is the
//!   table estimated with [`crate::strategy::sampling`].
//!
//! Every call starts from scratch: there is no cache and no state shared between calls, so
//! a failing session never affects its siblings.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use prefix_monitor::channel::UnixSocketQuerier;
//! use prefix_monitor::commands::BirdCommands;
//! use prefix_monitor::prefix::IpVersion;
//! use prefix_monitor::service::{Channels, PrefixStatisticsService};
//!
//! let service = PrefixStatisticsService::new(
//!     UnixSocketQuerier::new(Duration::from_secs(10)),
//!     BirdCommands::default(),
//!     Channels::shared("/run/bird/bird.ctl"),
//! );
//! let stats = service.stats_for_table(IpVersion::V6)?;
//! println!("{} routes", stats.total());
//! # Ok::<(), prefix_monitor::service::Error>(())
//! ```

mod error;

pub use error::{Error, Result};

use crate::channel::Querier;
use crate::commands::CommandSet;
use crate::prefix::{IpVersion, PrefixStatistics, Session};
use crate::strategy::{CancelFlag, exact, fallback, sampling};

/// Channel identifiers per address family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channels {
    v4: String,
    v6: String,
}

impl Channels {
    /// One daemon serving both families.
    pub fn shared(channel: impl Into<String>) -> Self {
        let channel = channel.into();
        Self {
            v4: channel.clone(),
            v6: channel,
        }
    }

    /// Separate daemons per family.
    pub fn split(v4: impl Into<String>, v6: impl Into<String>) -> Self {
        Self {
            v4: v4.into(),
            v6: v6.into(),
        }
    }

    pub fn for_version(&self, ip_version: IpVersion) -> &str {
        match ip_version {
            IpVersion::V4 => &self.v4,
            IpVersion::V6 => &self.v6,
        }
    }
}

/// Entry point for prefix statistics.
#[derive(Debug)]
pub struct PrefixStatisticsService<Q, C> {
    querier: Q,
    commands: C,
    channels: Channels,
}

impl<Q, C> PrefixStatisticsService<Q, C>
where
    Q: Querier,
    C: CommandSet,
{
    pub fn new(querier: Q, commands: C, channels: Channels) -> Self {
        Self {
            querier,
            commands,
            channels,
        }
    }

    /// Prefix statistics of the routes one session contributes.
    ///
    /// A session without routes yields empty statistics, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllStrategiesExhausted`] if none of the listing commands got a reply.
    pub fn stats_for_session(&self, session: &Session) -> Result<PrefixStatistics> {
        let channel = self.channels.for_version(session.ip_version());
        fallback::session_stats(&self.querier, channel, &self.commands, session)
            .map(|outcome| outcome.statistics)
            .map_err(|source| Error::AllStrategiesExhausted {
                session: session.name().to_owned(),
                source,
            })
    }

    /// Collects statistics for each session independently, in input order.
    pub fn stats_for_sessions(&self, sessions: &[Session]) -> Vec<Result<PrefixStatistics>> {
        sessions
            .iter()
            .map(|session| self.stats_for_session(session))
            .collect()
    }

    /// Prefix statistics of a whole table.
    ///
    /// The result is exact when the per-length count sweep succeeds and a scaled estimate
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableStrategiesExhausted`] describing both causes if the sweep and the
    /// sampling estimate both failed.
    pub fn stats_for_table(&self, ip_version: IpVersion) -> Result<PrefixStatistics> {
        self.stats_for_table_cancellable(ip_version, &CancelFlag::default())
    }

    /// Like [`Self::stats_for_table`], aborted once `cancel` is raised.
    ///
    /// The flag only affects this call; other calls on the service run with their own.
    pub fn stats_for_table_cancellable(
        &self,
        ip_version: IpVersion,
        cancel: &CancelFlag,
    ) -> Result<PrefixStatistics> {
        let channel = self.channels.for_version(ip_version);
        let table = self.commands.table_name(ip_version);

        let exact_err = match exact::enumerate(
            &self.querier,
            channel,
            &self.commands,
            ip_version,
            table,
            cancel,
        ) {
            Ok(outcome) => return Ok(outcome.statistics),
            Err(err) => err,
        };
        log::warn!(
            "exact enumeration of table {} failed, falling back to sampling: {}",
            table,
            exact_err
        );

        sampling::estimate(
            &self.querier,
            channel,
            &self.commands,
            ip_version,
            table,
            cancel,
        )
        .map(|outcome| outcome.statistics)
        .map_err(|sampling_err| Error::TableStrategiesExhausted {
            table: table.to_owned(),
            exact: exact_err,
            sampling: sampling_err,
        })
    }
}
