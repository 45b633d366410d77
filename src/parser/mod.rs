//! Parsers for the daemon's human-formatted replies.
//!
//! The daemon offers no structured statistics endpoint, so every number this crate reports
//! is scraped from text meant for an operator's terminal. Two reply shapes matter:
//!
//! - [`parse_route_count`]: the one-line summary printed for `... count` queries.
//! - [`parse_route_list`]: a full route listing, counted per prefix length.
//!
//! Both parsers are total: unrecognised input yields zero counts, never an error. Every
//! regular expression lives in a [`std::sync::LazyLock`] table that is compiled once and
//! only ever read afterwards.
//!
//! # Example
//!
//! ```rust
//! use prefix_monitor::parser::{parse_route_count, parse_route_list};
//! use prefix_monitor::prefix::IpVersion;
//!
//! assert_eq!(parse_route_count("197991 routes"), 197991);
//!
//! let listing = "\
//! BIRD 2.0.12 ready.
//! Table master4:
//! 10.0.0.0/8           unicast [bgp1 12:34:56] * (100) [AS65001i]
//! 192.0.2.0/24         unreachable [static1 12:34:56] * (200)
//! ";
//! let stats = parse_route_list("bgp1", IpVersion::V4, listing);
//! assert_eq!(stats.count(8), 1);
//! assert_eq!(stats.count(24), 1);
//! ```

mod count;
mod route;

pub use count::parse_route_count;
pub use route::{
    DEFAULT_LINE_MATCHERS, LineMatcher, PatternMatcher, PrefixToken, extract_prefix_length,
    parse_route_list, parse_route_list_with,
};

/// Strips the four-digit reply code that prefixes lines read straight off the control socket.
///
/// `"1007-10.0.0.0/8 unicast"` becomes `"10.0.0.0/8 unicast"`; lines without a code are
/// returned unchanged.
pub(crate) fn strip_reply_code(line: &str) -> &str {
    if has_reply_code(line) { &line[5..] } else { line }
}

fn has_reply_code(line: &str) -> bool {
    let bytes = line.as_bytes();
    bytes.len() >= 5 && bytes[..4].iter().all(u8::is_ascii_digit) && matches!(bytes[4], b'-' | b' ')
}

/// Returns `true` if `reply` was read straight off the control socket, i.e. its first
/// non-empty line carries a reply code.
pub(crate) fn is_coded_reply(reply: &str) -> bool {
    reply
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(has_reply_code)
}

/// Strips the socket framing from one line of a coded reply.
///
/// A line repeating the previous line's code arrives with the code replaced by a single
/// space, so `" 10.0.0.0/8 unicast"` becomes `"10.0.0.0/8 unicast"`. A space followed by more
/// whitespace marks an indented continuation and is kept.
pub(crate) fn strip_socket_framing(line: &str) -> &str {
    if has_reply_code(line) {
        return &line[5..];
    }
    match line.strip_prefix(' ') {
        Some(rest) if rest.starts_with(|c: char| !c.is_whitespace()) => rest,
        _ => line,
    }
}
