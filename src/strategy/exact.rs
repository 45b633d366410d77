//! Whole-table statistics by exact enumeration.
//!
//! For every valid prefix length `L` of the family, one count query restricted to `{L,L}` is
//! sent and its reply read with [`parse_route_count`]. No listing is transferred, which keeps
//! the cost at one cheap aggregate round trip per length even for full tables.
//!
//! Prefix length 0 is never queried, so a default route is not part of the result.

use crate::channel::Querier;
use crate::commands::CommandSet;
use crate::error::ResultOkLogExt;
use crate::parser::parse_route_count;
use crate::prefix::{IpVersion, PrefixStatistics};

use super::{CancelFlag, StrategyError, StrategyOutcome};

/// Counts the routes of each prefix length in the family's table.
///
/// A failed query for one length is logged and skipped. `cancel` is checked before every
/// query; once it is raised the sweep is abandoned.
///
/// # Errors
///
/// - [`StrategyError::NoData`] if no length yielded a nonzero count.
/// - [`StrategyError::Cancelled`] if the sweep was cancelled; counts gathered so far are
///   discarded.
pub fn enumerate(
    querier: &dyn Querier,
    channel: &str,
    commands: &dyn CommandSet,
    ip_version: IpVersion,
    subject: &str,
    cancel: &CancelFlag,
) -> Result<StrategyOutcome, StrategyError> {
    let mut stats = PrefixStatistics::new(subject, ip_version);
    let total = usize::from(ip_version.max_prefix_len());
    let before = std::time::Instant::now();

    for (completed, prefix_len) in ip_version.prefix_lengths().enumerate() {
        if cancel.is_cancelled() {
            log::debug!(
                "exact enumeration of {} cancelled after {}/{} lengths",
                subject,
                completed,
                total
            );
            return Err(StrategyError::Cancelled { completed, total });
        }

        let command = commands.count_by_length(ip_version, prefix_len);
        let Some(reply) = querier.query(channel, &command).ok_log(log::Level::Debug) else {
            continue;
        };
        let count = parse_route_count(&reply);
        if count > 0 {
            stats.set_count(prefix_len, count);
        }
    }

    log::trace!(
        "exact enumeration of {} took {} ms",
        subject,
        before.elapsed().as_millis()
    );

    let outcome = StrategyOutcome::new(stats);
    if !outcome.is_success() {
        return Err(StrategyError::NoData);
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::channel::TransportError;
    use crate::commands::BirdCommands;
    use crate::strategy::testutil::ScriptedQuerier;

    const CHANNEL: &str = "/run/bird/bird.ctl";

    fn scripted_table(ip_version: IpVersion, table: &BTreeMap<u8, i64>) -> ScriptedQuerier {
        let commands = BirdCommands::default();
        ip_version
            .prefix_lengths()
            .fold(ScriptedQuerier::new(), |querier, len| {
                let count = table.get(&len).copied().unwrap_or(0);
                querier.reply(
                    commands.count_by_length(ip_version, len),
                    format!("1007-{count} of 440662 routes for 220785 networks in table master6\n0000 \n"),
                )
            })
    }

    #[test]
    fn test_reproduces_lookup_table() {
        let table = BTreeMap::from([(32, 30_000), (44, 12_000), (48, 150_000), (64, 7)]);
        let querier = scripted_table(IpVersion::V6, &table);

        let outcome = enumerate(
            &querier,
            CHANNEL,
            &BirdCommands::default(),
            IpVersion::V6,
            "master6",
            &CancelFlag::default(),
        )
        .unwrap();

        assert_eq!(outcome.statistics.counts(), &table);
        assert_eq!(outcome.total_observed, 192_007);
        assert_eq!(outcome.statistics.subject(), "master6");
    }

    #[test]
    fn test_one_query_per_length() {
        let table = BTreeMap::from([(24, 900_000)]);
        let querier = scripted_table(IpVersion::V4, &table);
        let commands = BirdCommands::default();

        enumerate(
            &querier,
            CHANNEL,
            &commands,
            IpVersion::V4,
            "master4",
            &CancelFlag::default(),
        )
        .unwrap();

        let expected: Vec<String> = (1..=32)
            .map(|len| commands.count_by_length(IpVersion::V4, len))
            .collect();
        assert_eq!(querier.issued(), expected);
    }

    #[test]
    fn test_failed_lengths_are_skipped() {
        let commands = BirdCommands::default();
        // only /8 and /24 answer, every other length fails at the transport
        let querier = ScriptedQuerier::new()
            .reply(commands.count_by_length(IpVersion::V4, 8), "12 routes")
            .reply(commands.count_by_length(IpVersion::V4, 24), "3400 routes");

        let outcome = enumerate(
            &querier,
            CHANNEL,
            &commands,
            IpVersion::V4,
            "master4",
            &CancelFlag::default(),
        )
        .unwrap();

        assert_eq!(outcome.statistics.count(8), 12);
        assert_eq!(outcome.statistics.count(24), 3400);
        assert_eq!(outcome.total_observed, 3412);
        assert_eq!(querier.issued().len(), 32);
    }

    #[test]
    fn test_all_zero_is_no_data() {
        let querier = scripted_table(IpVersion::V4, &BTreeMap::new());
        let err = enumerate(
            &querier,
            CHANNEL,
            &BirdCommands::default(),
            IpVersion::V4,
            "master4",
            &CancelFlag::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StrategyError::NoData));
    }

    #[test]
    fn test_all_failed_is_no_data() {
        let querier = ScriptedQuerier::new();
        let err = enumerate(
            &querier,
            CHANNEL,
            &BirdCommands::default(),
            IpVersion::V6,
            "master6",
            &CancelFlag::default(),
        )
        .unwrap_err();
        assert!(matches!(err, StrategyError::NoData));
        assert_eq!(querier.issued().len(), 128);
    }

    /// Raises the cancel flag once a number of queries went through.
    struct CancellingQuerier {
        inner: ScriptedQuerier,
        cancel: CancelFlag,
        after: usize,
    }

    impl Querier for CancellingQuerier {
        fn query(&self, channel: &str, command: &str) -> Result<String, TransportError> {
            let reply = self.inner.query(channel, command);
            if self.inner.issued().len() >= self.after {
                self.cancel.cancel();
            }
            reply
        }
    }

    #[test]
    fn test_cancelled_sweep_discards_partial_counts() {
        let table: BTreeMap<u8, i64> = (1..=32).map(|len| (len, 10)).collect();
        let cancel = CancelFlag::default();
        let querier = CancellingQuerier {
            inner: scripted_table(IpVersion::V4, &table),
            cancel: cancel.clone(),
            after: 5,
        };

        let err = enumerate(
            &querier,
            CHANNEL,
            &BirdCommands::default(),
            IpVersion::V4,
            "master4",
            &cancel,
        )
        .unwrap_err();

        match err {
            StrategyError::Cancelled { completed, total } => {
                assert_eq!(completed, 5);
                assert_eq!(total, 32);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(querier.inner.issued().len(), 5);
    }
}
