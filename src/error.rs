use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// A required environment value is absent or empty.
    #[error("missing {0}.")]
    MissingEnv(&'static str),

    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The request never completed (DNS, TLS, connection reset, timeout).
    #[error("Network error on {endpoint}: {source}")]
    Network {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error on {endpoint}: HTTP {status} - {message}")]
    Api {
        endpoint: &'static str,
        status: u16,
        message: String,
    },

    /// Body was returned but does not match the expected schema.
    #[error("Unexpected response from {endpoint}: {source}")]
    DataContract {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected response from {endpoint}: missing field `{field}`")]
    MissingField {
        endpoint: &'static str,
        field: &'static str,
    },

    #[error("No liquidity available for this pair ({endpoint})")]
    NoLiquidity { endpoint: &'static str },

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("Invalid sell amount: {0}")]
    Amount(String),
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
