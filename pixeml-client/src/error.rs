use thiserror::Error;

/// Anything that can go wrong talking to the task server.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{endpoint}: HTTP {status}: {body}")]
    Server {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("{endpoint}: could not decode response: {message}")]
    Decode { endpoint: String, message: String },

    /// The server answered, but not with the empty-object acknowledgement.
    #[error("{endpoint}: server rejected the request: {body}")]
    Rejected {
        endpoint: String,
        body: serde_json::Value,
    },
}

pub type Result<T> = std::result::Result<T, ClientError>;
