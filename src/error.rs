use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Malformed server message: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid endpoint '{url}': {source}")]
    InvalidEndpoint {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid {field} value '{value}'")]
    InvalidArgument {
        field: &'static str,
        value: String,
    },
}
