//! Whole-table statistics estimated from one listing.
//!
//! The listing is taken as a sample of the table and its per-length counts are scaled by
//! `true_total / sample_total`, where `true_total` comes from a separate aggregate count.
//! The estimate is biased whenever the listing is not representative (truncated output,
//! recency ordering), so callers must treat it as approximate.

use crate::channel::Querier;
use crate::commands::CommandSet;
use crate::parser::{parse_route_count, parse_route_list};
use crate::prefix::IpVersion;

use super::{CancelFlag, StrategyError, StrategyOutcome};

/// Estimates the table's prefix length distribution from a sampled listing.
///
/// The table listing is tried first, then the daemon's default listing. If the true-count
/// query fails or its reply carries no count, the unscaled sample is returned. Scaled counts
/// are truncated toward zero.
///
/// # Errors
///
/// - [`StrategyError::Transport`] with the last error if both listing commands failed.
/// - [`StrategyError::Cancelled`] if `cancel` was raised before the listing was requested.
pub fn estimate(
    querier: &dyn Querier,
    channel: &str,
    commands: &dyn CommandSet,
    ip_version: IpVersion,
    subject: &str,
    cancel: &CancelFlag,
) -> Result<StrategyOutcome, StrategyError> {
    if cancel.is_cancelled() {
        return Err(StrategyError::Cancelled {
            completed: 0,
            total: 2,
        });
    }

    let listing = match querier.query(channel, &commands.list_table(ip_version)) {
        Ok(listing) => listing,
        Err(err) => {
            log::warn!("table listing failed, trying default listing: {}", err);
            querier.query(channel, &commands.list_default())?
        }
    };

    let mut stats = parse_route_list(subject, ip_version, &listing);
    let sample_total = stats.total();

    let true_total = match querier.query(channel, &commands.count_table(ip_version)) {
        Ok(reply) => parse_route_count(&reply),
        Err(err) => {
            log::warn!("table count failed, returning unscaled sample: {}", err);
            return Ok(StrategyOutcome::new(stats));
        }
    };

    if true_total > 0 && sample_total > 0 {
        log::debug!(
            "scaling sample of {} routes to {} routes for {}",
            sample_total,
            true_total,
            subject
        );
        stats.scale(true_total, sample_total);
    }

    Ok(StrategyOutcome::new(stats))
}
