//! Route listing parser.
//!
//! A listing is a banner and table header followed by one entry per route, where an entry may
//! wrap onto indented continuation lines (next hops, alternative paths, attributes):
//!
//! ```text
//! BIRD 2.0.12 ready.
//! Table master6:
//! 2800:200:ea00::/48   unicast [up1 13:09:51.102 from 2a0e:97c0:e61:ff80::101] * (100) [AS12252i]
//!         dev nyc01
//!                      unicast [up2 13:09:46.383 from 2a0e:97c0:e61:ff80::9] (100) [AS12252i]
//! 192.0.2.0/24         via 10.0.0.1 on eth0 [bgp1 12:34:56] * (100) [AS65001i]
//! ```
//!
//! Entry lines differ between daemon versions and route types, so each line is offered to a
//! priority-ordered table of [`LineMatcher`]s. The first matcher that yields a prefix length
//! valid for the token's address family wins. A new dialect is supported by appending a
//! matcher to the table handed to [`parse_route_list_with`].

use std::sync::LazyLock;

use regex::Regex;

use crate::prefix::{IpVersion, PrefixStatistics};

use super::{is_coded_reply, strip_reply_code, strip_socket_framing};

/// A `network/length` token found on a listing line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixToken<'a> {
    pub network: &'a str,
    pub prefix_len: u32,
}

impl PrefixToken<'_> {
    /// Returns the prefix length if it is valid for the family inferred from the network.
    pub fn valid_prefix_len(&self) -> Option<u8> {
        let family = IpVersion::infer(self.network)?;
        if !family.is_valid_prefix_len(self.prefix_len) {
            return None;
        }
        u8::try_from(self.prefix_len).ok()
    }
}

/// Extracts a prefix token from a single, already classified entry line.
///
/// Implementations are stateless and shared between threads.
pub trait LineMatcher: Send + Sync {
    /// Short name used in trace logs.
    fn name(&self) -> &str;

    /// Returns the token this matcher recognises on `line`, if any.
    fn find<'l>(&self, line: &'l str) -> Option<PrefixToken<'l>>;
}

/// A [`LineMatcher`] backed by a regular expression with two capture groups:
/// the network and the prefix length.
#[derive(Debug)]
pub struct PatternMatcher {
    name: &'static str,
    pattern: Regex,
}

impl PatternMatcher {
    /// Compiles a matcher.
    ///
    /// # Errors
    ///
    /// Returns the compilation error if `pattern` is not a valid regular expression.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }
}

impl LineMatcher for PatternMatcher {
    fn name(&self) -> &str {
        self.name
    }

    fn find<'l>(&self, line: &'l str) -> Option<PrefixToken<'l>> {
        let caps = self.pattern.captures(line)?;
        let network = caps.get(1)?.as_str();
        let prefix_len = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some(PrefixToken {
            network,
            prefix_len,
        })
    }
}

/// Built-in matchers, most specific first.
pub static DEFAULT_LINE_MATCHERS: LazyLock<Vec<Box<dyn LineMatcher>>> = LazyLock::new(|| {
    let matchers: [(&'static str, &str); 3] = [
        (
            "route-type",
            r"^([0-9A-Fa-f:.]+)/(\d+)\s+(?:unicast|blackhole|unreachable)\b",
        ),
        ("leading-prefix", r"^([0-9A-Fa-f:.]+)/(\d+)(?:\s|$)"),
        ("anywhere", r"(?:^|\s)([0-9A-Fa-f:.]+)/(\d+)(?:\s|$)"),
    ];

    matchers
        .into_iter()
        .map(|(name, pattern)| {
            let matcher = PatternMatcher::new(name, pattern).expect("valid built-in pattern");
            Box::new(matcher) as Box<dyn LineMatcher>
        })
        .collect()
});

const SKIPPED_PREFIXES: [&str; 3] = ["BIRD", "Access restricted", "Table"];

/// Returns `true` for lines that never carry an entry: banners, notices, headers and
/// indented continuation lines of the previous entry.
fn is_non_data_line(line: &str) -> bool {
    line.trim().is_empty()
        || line.starts_with(char::is_whitespace)
        || SKIPPED_PREFIXES.iter().any(|prefix| line.starts_with(prefix))
        || line.contains("Preference")
}

/// Returns the first valid prefix length the matchers find on `line`.
fn match_line(matchers: &[Box<dyn LineMatcher>], line: &str) -> Option<u8> {
    matchers.iter().find_map(|matcher| {
        let prefix_len = matcher.find(line)?.valid_prefix_len()?;
        log::trace!("matcher `{}` accepted /{}: {}", matcher.name(), prefix_len, line);
        Some(prefix_len)
    })
}

/// Extracts the prefix length of the entry starting on `line` using the built-in matchers.
///
/// Returns `None` for non-entry lines.
///
/// # Examples
///
/// ```
/// # use prefix_monitor::parser::extract_prefix_length;
/// assert_eq!(extract_prefix_length("2001:db8::/32  via 2001:db8::1 on eth0 [bgp1 12:34:56] * (100)"), Some(32));
/// assert_eq!(extract_prefix_length("        dev nyc01"), None);
/// assert_eq!(extract_prefix_length("Table master6:"), None);
/// ```
pub fn extract_prefix_length(line: &str) -> Option<u8> {
    let line = strip_reply_code(line.trim_end());
    if is_non_data_line(line) {
        return None;
    }
    match_line(&DEFAULT_LINE_MATCHERS, line)
}

/// Parses a route listing with the built-in matchers.
///
/// See [`parse_route_list_with`].
pub fn parse_route_list(subject: &str, ip_version: IpVersion, listing: &str) -> PrefixStatistics {
    parse_route_list_with(&DEFAULT_LINE_MATCHERS, subject, ip_version, listing)
}

/// Parses a route listing into counts by prefix length, using `matchers` in order.
///
/// Every recognised entry adds one route at its length, whatever `ip_version` says;
/// `ip_version` only labels the result. Unrecognised lines are ignored, so a listing made
/// only of headers yields empty statistics. Listings read straight off the control socket
/// have their reply codes and same-code markers removed before matching.
pub fn parse_route_list_with(
    matchers: &[Box<dyn LineMatcher>],
    subject: &str,
    ip_version: IpVersion,
    listing: &str,
) -> PrefixStatistics {
    let mut stats = PrefixStatistics::new(subject, ip_version);
    let coded = is_coded_reply(listing);

    for line in listing.lines() {
        let line = line.trim_end();
        let line = if coded {
            strip_socket_framing(line)
        } else {
            strip_reply_code(line)
        };
        if is_non_data_line(line) {
            continue;
        }
        if let Some(prefix_len) = match_line(matchers, line) {
            stats.add_route(prefix_len);
        }
    }

    stats
}
