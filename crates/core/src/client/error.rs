use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error requesting {url}: {detail}")]
    Network { url: String, detail: String },

    #[error("HTTP {status} from {url}")]
    Http {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("failed to decode response from {url}: {detail}")]
    Decode { url: String, detail: String },
}

impl ApiError {
    pub(crate) fn network(url: &str, err: &reqwest::Error) -> Self {
        ApiError::Network {
            url: url.to_string(),
            detail: error_chain(err),
        }
    }

    pub(crate) fn decode(url: &str, detail: impl Into<String>) -> Self {
        ApiError::Decode {
            url: url.to_string(),
            detail: detail.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Network { .. } => "NetworkError",
            ApiError::Http { .. } => "HttpError",
            ApiError::Decode { .. } => "DecodeError",
        }
    }

    pub fn url(&self) -> &str {
        match self {
            ApiError::Network { url, .. }
            | ApiError::Http { url, .. }
            | ApiError::Decode { url, .. } => url,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport failures, 429 and 5xx may succeed on a later attempt; a body
    /// that failed to decode will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Http { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ApiError::Decode { .. } => false,
        }
    }
}

// reqwest's Display omits the underlying cause (connection refused, dns, ...).
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
