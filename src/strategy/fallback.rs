//! Per-session statistics from an ordered list of listing commands.
//!
//! Which listing variant answers usefully depends on the session's state and the daemon
//! version, so the variants are tried in order and the first one that yields routes wins.
//! The ordering and stop rule live in [`run`], a small interpreter over [`Descriptor`]s that
//! knows nothing about sessions or daemons.

use crate::channel::{Querier, TransportError};
use crate::commands::CommandSet;
use crate::parser::parse_route_list;
use crate::prefix::{PrefixStatistics, Session};

use super::{StrategyError, StrategyOutcome};

/// One attempt: a command and the parser for its reply.
#[derive(Debug, Clone)]
pub struct Descriptor<P> {
    pub command: String,
    pub parse: P,
}

impl<P> Descriptor<P> {
    pub fn new(command: impl Into<String>, parse: P) -> Self {
        Self {
            command: command.into(),
            parse,
        }
    }
}

/// Evaluates `descriptors` left to right and stops at the first outcome with routes.
///
/// A transport failure is recorded and the next descriptor tried. When no descriptor yields
/// routes, the last successfully parsed (possibly empty) outcome is returned.
///
/// # Errors
///
/// Returns [`StrategyError::Exhausted`] with the last transport error if no descriptor got a
/// reply at all.
pub fn run<Q, P, I>(mut query: Q, descriptors: I) -> Result<StrategyOutcome, StrategyError>
where
    Q: FnMut(&str) -> Result<String, TransportError>,
    P: Fn(&str) -> PrefixStatistics,
    I: IntoIterator<Item = Descriptor<P>>,
{
    let mut last_parsed = None;
    let mut last_err = None;
    let mut attempts = 0;

    for descriptor in descriptors {
        attempts += 1;
        let reply = match query(descriptor.command.as_str()) {
            Ok(reply) => reply,
            Err(err) => {
                log::debug!("attempt {} failed: {}", attempts, err);
                last_err = Some(err);
                continue;
            }
        };

        let outcome = StrategyOutcome::new((descriptor.parse)(reply.as_str()));
        if outcome.is_success() {
            return Ok(outcome);
        }
        log::debug!("`{}` returned no routes", descriptor.command);
        last_parsed = Some(outcome);
    }

    last_parsed.ok_or(StrategyError::Exhausted {
        attempts,
        last: last_err,
    })
}

/// Collects prefix statistics for one session by trying each of its listing variants.
///
/// # Errors
///
/// See [`run`].
pub fn session_stats(
    querier: &dyn Querier,
    channel: &str,
    commands: &dyn CommandSet,
    session: &Session,
) -> Result<StrategyOutcome, StrategyError> {
    let parse = |reply: &str| parse_route_list(session.name(), session.ip_version(), reply);
    let descriptors = commands
        .session_listings(session)
        .into_iter()
        .map(|command| Descriptor::new(command, &parse));

    let result = run(|command| querier.query(channel, command), descriptors);
    if let Err(err) = &result {
        log::warn!("no listing variant answered for session {}: {}", session.name(), err);
    }
    result
}
