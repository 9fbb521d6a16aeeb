use marquee_lib::PoolError;

/// Why a single HTTP exchange failed.
#[derive(Debug, thiserror::Error)]
pub enum TransportCause {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    #[error("{0}")]
    Other(String),
}

/// Errors that can occur while ingesting from the catalog API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {cause}")]
    Transport {
        url: String,
        #[source]
        cause: TransportCause,
    },

    #[error("Malformed {context} response: {message}")]
    MalformedResponse { context: String, message: String },

    #[error("Catalog API error {code}: {message}")]
    Application { code: i64, message: String },

    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FetchError {
    pub fn transport(url: impl Into<String>, cause: TransportCause) -> Self {
        Self::Transport {
            url: url.into(),
            cause,
        }
    }

    pub fn malformed(context: impl Into<String>, message: impl ToString) -> Self {
        Self::MalformedResponse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Pool and configuration failures abort a run; everything else is
    /// absorbed at page or record granularity.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Pool(_) | Self::Config(_))
    }
}
