//! Parser for replies to `show route ... count` queries.
//!
//! Recognised dialects, in priority order:
//!
//! - `1007-197991 of 440662 routes for 220785 networks in table master6` (socket reply with
//!   code). The filtered sub-count after the dash is the answer.
//! - `197991 of 440662 routes for 220785 networks in table master6` (same reply as printed by
//!   the interactive client).
//! - `42 routes` / `1 route`.
//!
//! On the control socket the final line of a reply carries its code followed by a space, as in
//! `0014 197991 of 440662 routes for 220785 networks in table master6`. A line that matches no
//! dialect as read is tried again with that code stripped.

use std::sync::LazyLock;

use regex::Regex;

use super::strip_reply_code;

static COUNT_DIALECTS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"^\d+-(\d+)\s+of\s+\d+\s+routes\s+for\s+\d+\s+networks\s+in\s+table")
            .expect("valid coded count pattern"),
        Regex::new(r"^(\d+)\s+of\s+\d+\s+routes\s+for\s+\d+\s+networks")
            .expect("valid summary count pattern"),
        Regex::new(r"^(\d+)\s+routes?\b").expect("valid plain count pattern"),
    ]
});

/// Extracts the route count from a count reply.
///
/// Lines are tried top to bottom, each against the dialects in priority order; the first match
/// wins. Returns `0` if nothing matches.
pub fn parse_route_count(reply: &str) -> i64 {
    for line in reply.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let count =
            match_dialects(line).or_else(|| match_dialects(strip_reply_code(line).trim_start()));
        if let Some(count) = count {
            return count;
        }
    }

    0
}

fn match_dialects(line: &str) -> Option<i64> {
    COUNT_DIALECTS.iter().find_map(|dialect| {
        let caps = dialect.captures(line)?;
        caps[1].parse::<i64>().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_routes() {
        assert_eq!(parse_route_count("197991 routes"), 197991);
        assert_eq!(parse_route_count("1 route\n"), 1);
        assert_eq!(parse_route_count("0 routes"), 0);
    }

    #[test]
    fn test_coded_reply_returns_filtered_count() {
        let reply = "1007-197991 of 440662 routes for 220785 networks in table master6";
        assert_eq!(parse_route_count(reply), 197991);
    }

    #[test]
    fn test_final_line_code_is_stripped() {
        let reply = "0014 197991 of 440662 routes for 220785 networks in table master6\n";
        assert_eq!(parse_route_count(reply), 197991);
        assert_eq!(parse_route_count("0014 1 route\n"), 1);
    }

    #[test]
    fn test_four_digit_plain_count_is_not_a_code() {
        assert_eq!(parse_route_count("1234 routes"), 1234);
        assert_eq!(parse_route_count("1234 of 5000 routes for 4000 networks in table master4"), 1234);
    }

    #[test]
    fn test_socket_reply_after_welcome() {
        let reply = "\
0001 BIRD 2.0.12 ready.
0014 512 of 1024 routes for 600 networks in table master4
";
        assert_eq!(parse_route_count(reply), 512);
    }

    #[test]
    fn test_summary_without_code() {
        let reply = "197991 of 440662 routes for 220785 networks in table master6";
        assert_eq!(parse_route_count(reply), 197991);
    }

    #[test]
    fn test_first_matching_line_wins() {
        let reply = "\
0001 BIRD 2.0.12 ready.
1007-512 of 1024 routes for 600 networks in table master4
0000
";
        assert_eq!(parse_route_count(reply), 512);
    }

    #[test]
    fn test_unmatched_text_is_zero() {
        assert_eq!(parse_route_count(""), 0);
        assert_eq!(parse_route_count("Access restricted"), 0);
        assert_eq!(parse_route_count("routes: many"), 0);
        assert_eq!(parse_route_count("9001 syntax error"), 0);
    }

    #[test]
    fn test_overflowing_number_is_skipped() {
        assert_eq!(parse_route_count("99999999999999999999999 routes\n3 routes"), 3);
    }
}
