use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The backend answered with a non-success status.
    #[error("{request} failed with status {status}")]
    Status { request: String, status: StatusCode },

    /// Connect, IO or body decode failure.
    #[error("{request} failed: {source}")]
    Transport {
        request: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{field}` must not be empty")]
    Validation { field: &'static str },
}

impl FeedError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Status { .. } | Self::Transport { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}
