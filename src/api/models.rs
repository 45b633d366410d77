use std::collections::BTreeMap;

use crate::prefix::{IpVersion, PrefixStatistics};

#[derive(Debug, serde::Serialize)]
pub struct PrefixStatsResponse {
    pub subject: String,
    pub ip_version: IpVersion,
    pub total: i64,
    pub counts: BTreeMap<u8, i64>,
}

impl From<PrefixStatistics> for PrefixStatsResponse {
    fn from(value: PrefixStatistics) -> Self {
        Self {
            subject: value.subject().to_owned(),
            ip_version: value.ip_version(),
            total: value.total(),
            counts: value.counts().clone(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
pub struct SessionParams {
    pub proto: Option<String>,
    pub ip_version: Option<String>,
}
