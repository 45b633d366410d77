use crate::strategy::StrategyError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unable to get prefix stats for session `{session}`: {source}")]
    AllStrategiesExhausted {
        session: String,
        #[source]
        source: StrategyError,
    },

    #[error(
        "unable to get prefix stats for table `{table}`: count failed ({exact}), sampling failed ({sampling})"
    )]
    TableStrategiesExhausted {
        table: String,
        exact: StrategyError,
        sampling: StrategyError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
