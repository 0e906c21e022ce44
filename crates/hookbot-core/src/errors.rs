/// Error returned by every webhook send.
///
/// Each variant matches exactly one failure branch of a send, so callers can
/// tell a missing credential (nothing was sent) from a provider rejection
/// (the request went out and the bot said no).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{provider}: missing credential")]
    MissingCredential { provider: &'static str },

    #[error("invalid url {url:?}: {reason}")]
    Url { url: String, reason: String },

    #[error("encoding error: {0}")]
    Encoding(#[source] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("unexpected http status: {code}")]
    UnexpectedStatus { code: u16 },

    #[error("unexpected content type: {value:?}")]
    UnexpectedContentType { value: String },

    #[error("decoding error: {0}")]
    Decoding(#[source] serde_json::Error),

    #[error("{provider} error {code}: {message}")]
    Provider {
        provider: &'static str,
        code: i64,
        message: String,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("{provider} does not support {kind} messages")]
    Unsupported {
        provider: &'static str,
        kind: &'static str,
    },
}

impl Error {
    pub(crate) fn url(url: &str, reason: impl ToString) -> Self {
        Self::Url {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Network-level failure of an attempted request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
