//! Core value types shared by the parsers, strategies and the service.
//!
//! - [`IpVersion`] — Address family of a table or session, with its prefix-length bounds.
//! - [`Proto`] — Protocol kind of a session, mapped onto the daemon's route source.
//! - [`Session`] — One configured protocol instance contributing routes to a table.
//! - [`PrefixStatistics`] — Route counts keyed by prefix length.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

mod error;

pub use error::{Error, Result};

/// Address family of a routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IpVersion {
    #[serde(rename = "4")]
    V4,
    #[serde(rename = "6")]
    V6,
}

impl IpVersion {
    /// Longest valid prefix length for this family.
    pub const fn max_prefix_len(self) -> u8 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    /// Iterates every prefix length the exact sweep queries.
    ///
    /// Length 0 (the default route) is not part of the range.
    pub fn prefix_lengths(self) -> impl Iterator<Item = u8> {
        1..=self.max_prefix_len()
    }

    /// Returns `true` if `len` is a valid, non-default prefix length for this family.
    pub fn is_valid_prefix_len(self, len: u32) -> bool {
        len >= 1 && len <= u32::from(self.max_prefix_len())
    }

    /// Infers the family of a `network/length` token from its network part.
    ///
    /// A colon marks IPv6, a dot marks IPv4. Anything else has no family.
    pub fn infer(network: &str) -> Option<Self> {
        if network.contains(':') {
            Some(IpVersion::V6)
        } else if network.contains('.') {
            Some(IpVersion::V4)
        } else {
            None
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => f.write_str("4"),
            IpVersion::V6 => f.write_str("6"),
        }
    }
}

impl FromStr for IpVersion {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "4" | "v4" | "ipv4" => Ok(IpVersion::V4),
            "6" | "v6" | "ipv6" => Ok(IpVersion::V6),
            other => Err(Error::InvalidIpVersion(other.to_owned())),
        }
    }
}

/// Protocol kind of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Proto {
    #[default]
    Unknown,
    Bgp,
    Ospf,
    Kernel,
    Static,
    Direct,
    Babel,
    Rpki,
    Bfd,
}

impl Proto {
    /// Route source token used in `where source = RTS_<..>` filters.
    ///
    /// Kinds without a route source of their own fall back to `BGP`.
    pub fn route_source(self) -> &'static str {
        match self {
            Proto::Bgp => "BGP",
            Proto::Ospf => "OSPF",
            Proto::Kernel => "KERNEL",
            Proto::Static => "STATIC",
            Proto::Direct => "DIRECT",
            Proto::Babel => "BABEL",
            Proto::Unknown | Proto::Rpki | Proto::Bfd => "BGP",
        }
    }
}

impl FromStr for Proto {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let proto = match s.trim().to_ascii_lowercase().as_str() {
            "bgp" => Proto::Bgp,
            "ospf" => Proto::Ospf,
            "kernel" => Proto::Kernel,
            "static" => Proto::Static,
            "direct" => Proto::Direct,
            "babel" => Proto::Babel,
            "rpki" => Proto::Rpki,
            "bfd" => Proto::Bfd,
            "" | "unknown" => Proto::Unknown,
            other => return Err(Error::InvalidProto(other.to_owned())),
        };
        Ok(proto)
    }
}

impl fmt::Display for Proto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Proto::Bgp => "BGP",
            Proto::Ospf => "OSPF",
            Proto::Kernel => "Kernel",
            Proto::Static => "Static",
            Proto::Direct => "Direct",
            Proto::Babel => "Babel",
            Proto::Rpki => "RPKI",
            Proto::Bfd => "BFD",
            Proto::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// One configured protocol instance of the daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    name: String,
    proto: Proto,
    ip_version: IpVersion,
}

impl Session {
    /// Creates a session descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSessionName`] if `name` is empty or contains whitespace,
    /// since it is interpolated into daemon commands verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// # use prefix_monitor::prefix::{IpVersion, Proto, Session};
    /// let session = Session::new("upstream1", Proto::Bgp, IpVersion::V6).unwrap();
    /// assert_eq!(session.name(), "upstream1");
    /// assert!(Session::new("bad name", Proto::Bgp, IpVersion::V6).is_err());
    /// ```
    pub fn new(name: impl AsRef<str>, proto: Proto, ip_version: IpVersion) -> Result<Self> {
        let name = name.as_ref();
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidSessionName(name.to_owned()));
        }

        Ok(Self {
            name: name.to_owned(),
            proto,
            ip_version,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proto(&self) -> Proto {
        self.proto
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }
}

/// Route counts by prefix length for one session or table.
///
/// A length without an entry had no observed (or estimated) routes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PrefixStatistics {
    subject: String,
    ip_version: IpVersion,
    counts: BTreeMap<u8, i64>,
}

impl PrefixStatistics {
    pub fn new(subject: impl Into<String>, ip_version: IpVersion) -> Self {
        Self {
            subject: subject.into(),
            ip_version,
            counts: BTreeMap::new(),
        }
    }

    /// Counts one more route of the given length.
    pub fn add_route(&mut self, prefix_len: u8) {
        *self.counts.entry(prefix_len).or_default() += 1;
    }

    /// Sets the count for a length. Zero counts are not stored.
    pub fn set_count(&mut self, prefix_len: u8, count: i64) {
        if count == 0 {
            self.counts.remove(&prefix_len);
        } else {
            self.counts.insert(prefix_len, count);
        }
    }

    /// Rescales every count by `numerator / denominator`, truncating toward zero.
    ///
    /// Does nothing if `denominator` is zero.
    pub fn scale(&mut self, numerator: i64, denominator: i64) {
        if denominator == 0 {
            return;
        }
        self.counts.retain(|_, count| {
            let scaled = i128::from(*count) * i128::from(numerator) / i128::from(denominator);
            *count = i64::try_from(scaled).unwrap_or(i64::MAX);
            *count != 0
        });
    }

    /// Returns a copy relabelled with another subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    /// Count at `prefix_len`, zero if absent.
    pub fn count(&self, prefix_len: u8) -> i64 {
        self.counts.get(&prefix_len).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &BTreeMap<u8, i64> {
        &self.counts
    }

    /// Sum over all lengths.
    pub fn total(&self) -> i64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
