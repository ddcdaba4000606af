use thiserror::Error;

/// Failures that prevent a countdown engine from starting.
#[derive(Debug, Error)]
pub enum CountdownError {
    #[error("invalid countdown target '{input}': expected an ISO-8601 timestamp with a UTC offset")]
    InvalidTarget {
        input: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("tick interval must be greater than zero")]
    InvalidTickInterval,
}
