/// A channel-level failure of a single query.
#[derive(Debug, thiserror::Error)]
#[error("query `{command}` on channel `{channel}` failed: {source}")]
pub struct TransportError {
    pub channel: String,
    pub command: String,
    #[source]
    pub source: std::io::Error,
}

impl TransportError {
    pub fn new(
        channel: impl Into<String>,
        command: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Self {
            channel: channel.into(),
            command: command.into(),
            source,
        }
    }
}
