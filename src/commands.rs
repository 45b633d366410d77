//! Command vocabulary of the routing daemon.
//!
//! The strategies only rely on two contracts: a reply to a count command is readable by
//! [`crate::parser::parse_route_count`], and a reply to a listing command is readable by
//! [`crate::parser::parse_route_list`]. The exact wire syntax lives here.

use crate::prefix::{IpVersion, Session};

/// Builds the text commands the strategies send through a [`crate::channel::Querier`].
pub trait CommandSet: Send + Sync {
    /// Name of the routing table holding routes of `ip_version`.
    fn table_name(&self, ip_version: IpVersion) -> &str;

    /// Counts routes of exactly `prefix_len` bits in the family's table.
    fn count_by_length(&self, ip_version: IpVersion, prefix_len: u8) -> String;

    /// Counts all routes in the family's table.
    fn count_table(&self, ip_version: IpVersion) -> String;

    /// Listing variants for one session, most inclusive first.
    fn session_listings(&self, session: &Session) -> Vec<String>;

    /// Unrestricted listing of the family's table.
    fn list_table(&self, ip_version: IpVersion) -> String;

    /// Listing of the daemon's default table, used when the table listing fails.
    fn list_default(&self) -> String;
}

/// Commands understood by BIRD 2.x (and BIRD 1.x when table names are set accordingly).
#[derive(Debug, Clone)]
pub struct BirdCommands {
    table_v4: String,
    table_v6: String,
}

impl Default for BirdCommands {
    fn default() -> Self {
        Self::new("master4", "master6")
    }
}

impl BirdCommands {
    pub fn new(table_v4: impl Into<String>, table_v6: impl Into<String>) -> Self {
        Self {
            table_v4: table_v4.into(),
            table_v6: table_v6.into(),
        }
    }
}

impl CommandSet for BirdCommands {
    fn table_name(&self, ip_version: IpVersion) -> &str {
        match ip_version {
            IpVersion::V4 => &self.table_v4,
            IpVersion::V6 => &self.table_v6,
        }
    }

    fn count_by_length(&self, ip_version: IpVersion, prefix_len: u8) -> String {
        let any = match ip_version {
            IpVersion::V4 => "0.0.0.0/0",
            IpVersion::V6 => "::/0",
        };
        format!(
            "show route table {} where net ~ [{any}{{{prefix_len},{prefix_len}}}] primary count",
            self.table_name(ip_version)
        )
    }

    fn count_table(&self, ip_version: IpVersion) -> String {
        format!("show route table {} count", self.table_name(ip_version))
    }

    fn session_listings(&self, session: &Session) -> Vec<String> {
        let name = session.name();
        let table = self.table_name(session.ip_version());
        vec![
            format!("show route all protocol {name}"),
            format!("show route protocol {name} all"),
            format!("show route protocol {name}"),
            format!("show route table {table} protocol {name} all"),
            format!(
                "show route where source = RTS_{}",
                session.proto().route_source()
            ),
        ]
    }

    fn list_table(&self, ip_version: IpVersion) -> String {
        format!("show route table {}", self.table_name(ip_version))
    }

    fn list_default(&self) -> String {
        "show route".to_owned()
    }
}
