//! Prefix Monitor: prefix length statistics for a BIRD routing daemon.
//!
//! The daemon only offers a human-formatted command channel, so the statistics are scraped
//! from count replies and route listings. For a session, the ordered listing variants are
//! tried until one yields routes. For a whole table, one count query is sent per prefix
//! length, and a scaled sample of a single listing is used when that sweep comes up empty.

use std::sync::Arc;

use service::PrefixStatisticsService;

pub mod api;
pub mod channel;
pub mod commands;
pub mod config;
pub mod error;
pub mod parser;
pub mod prefix;
pub mod service;
pub mod strategy;

/// Runs the Prefix Monitor application.
///
/// Reads the configuration from the environment, then serves prefix statistics over HTTP.
///
/// # Errors
///
/// Possible errors include:
/// - Invalid environment variables (e.g., a non-numeric `QUERY_TIMEOUT_SECS`).
/// - Failure to bind the HTTP listener.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::from_env()?;
    log::debug!("Configuration: {:?}", config);

    let channels = config.channels();
    log::info!(
        "Querying IPv4 on `{}` and IPv6 on `{}`",
        channels.for_version(prefix::IpVersion::V4),
        channels.for_version(prefix::IpVersion::V6)
    );

    let service = Arc::new(PrefixStatisticsService::new(
        config.querier(),
        config.commands(),
        channels,
    ));

    api::APIServer::new(service)
        .listen(config.listen_addr.as_str())
        .await?;

    Ok(())
}
