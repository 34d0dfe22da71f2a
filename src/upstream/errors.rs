//! Error types for the upstream listings client.

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to parse upstream response from {url}")]
    ParseFailed {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(transparent)]
    RequestFailed(#[from] reqwest::Error),
}
