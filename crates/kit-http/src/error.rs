#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("failed to decode {encoding} response body: {source}")]
    Decode {
        encoding: String,
        #[source]
        source: std::io::Error,
    },

    #[error("decoded response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_connect())
    }
}
