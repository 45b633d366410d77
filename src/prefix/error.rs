#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid ip version: {0}")]
    InvalidIpVersion(String),
    #[error("invalid protocol kind: {0}")]
    InvalidProto(String),
    #[error("invalid session name: `{0}`")]
    InvalidSessionName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
