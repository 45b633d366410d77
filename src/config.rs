//! Runtime configuration read from environment variables.
//!
//! | Variable             | Default               |
//! |----------------------|-----------------------|
//! | `BIRD_SOCKET`        | `/run/bird/bird.ctl`  |
//! | `BIRD6_SOCKET`       | `/run/bird/bird6.ctl` |
//! | `BIRD_V2`            | `true`                |
//! | `BIRD_TABLE_V4`      | `master4`             |
//! | `BIRD_TABLE_V6`      | `master6`             |
//! | `QUERY_TIMEOUT_SECS` | `10`                  |
//! | `MAX_REPLY_BYTES`    | `268435456` (256 MiB) |
//! | `LISTEN_ADDR`        | `0.0.0.0:9324`        |
//!
//! With `BIRD_V2` set, one daemon on `BIRD_SOCKET` serves both address families. Otherwise
//! IPv6 is queried on `BIRD6_SOCKET`. Raise `MAX_REPLY_BYTES` when full-table listings of a
//! large table exceed the default cap.

use std::time::Duration;

use crate::channel::{DEFAULT_MAX_REPLY_BYTES, UnixSocketQuerier};
use crate::commands::BirdCommands;
use crate::service::Channels;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid value for environment variable `{var}`: `{value}`")]
    InvalidValue { var: &'static str, value: String },
    #[error("environment variable `{var}` is not valid unicode")]
    NotUnicode { var: &'static str },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bird_socket: String,
    pub bird6_socket: String,
    pub bird_v2: bool,
    pub table_v4: String,
    pub table_v6: String,
    pub query_timeout: Duration,
    pub max_reply_bytes: usize,
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bird_socket: "/run/bird/bird.ctl".to_owned(),
            bird6_socket: "/run/bird/bird6.ctl".to_owned(),
            bird_v2: true,
            table_v4: "master4".to_owned(),
            table_v6: "master6".to_owned(),
            query_timeout: Duration::from_secs(10),
            max_reply_bytes: DEFAULT_MAX_REPLY_BYTES,
            listen_addr: "0.0.0.0:9324".to_owned(),
        }
    }
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|var| std::env::var_os(var))
    }

    /// Reads the configuration through `lookup`, falling back to defaults for unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<std::ffi::OsString>,
    {
        let get = |var: &'static str| -> Result<Option<String>> {
            lookup(var)
                .map(|value| value.into_string().map_err(|_| Error::NotUnicode { var }))
                .transpose()
        };
        let defaults = Self::default();

        let bird_v2 = match get("BIRD_V2")? {
            Some(value) => parse_bool(&value).ok_or(Error::InvalidValue {
                var: "BIRD_V2",
                value,
            })?,
            None => defaults.bird_v2,
        };
        let query_timeout = match get("QUERY_TIMEOUT_SECS")? {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(Error::InvalidValue {
                        var: "QUERY_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => defaults.query_timeout,
        };
        let max_reply_bytes = match get("MAX_REPLY_BYTES")? {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(Error::InvalidValue {
                        var: "MAX_REPLY_BYTES",
                        value,
                    });
                }
            },
            None => defaults.max_reply_bytes,
        };

        Ok(Self {
            bird_socket: get("BIRD_SOCKET")?.unwrap_or(defaults.bird_socket),
            bird6_socket: get("BIRD6_SOCKET")?.unwrap_or(defaults.bird6_socket),
            bird_v2,
            table_v4: get("BIRD_TABLE_V4")?.unwrap_or(defaults.table_v4),
            table_v6: get("BIRD_TABLE_V6")?.unwrap_or(defaults.table_v6),
            query_timeout,
            max_reply_bytes,
            listen_addr: get("LISTEN_ADDR")?.unwrap_or(defaults.listen_addr),
        })
    }

    /// Channel identifiers per address family.
    pub fn channels(&self) -> Channels {
        if self.bird_v2 {
            Channels::shared(&self.bird_socket)
        } else {
            Channels::split(&self.bird_socket, &self.bird6_socket)
        }
    }

    /// Control socket client honouring the configured timeout and reply cap.
    pub fn querier(&self) -> UnixSocketQuerier {
        UnixSocketQuerier::new(self.query_timeout).with_max_reply_bytes(self.max_reply_bytes)
    }

    pub fn commands(&self) -> BirdCommands {
        BirdCommands::new(&self.table_v4, &self.table_v6)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
