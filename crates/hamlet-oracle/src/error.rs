//! Error types for the oracle adapter.
//!
//! Every variant is an oracle failure in the sense of the cycle's error
//! policy: the adapter logs it and substitutes the phase's fallback. None of
//! these ever reach the scheduler, except [`OracleError::Config`] raised
//! while building a backend at startup.

/// Errors that can occur while consulting the oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The HTTP call failed or the backend returned an error status.
    #[error("LLM transport error: {0}")]
    Transport(String),

    /// The call exceeded its deadline.
    #[error("oracle call timed out after {0} ms")]
    Timeout(u128),

    /// The backend returned no usable text.
    #[error("empty oracle response")]
    EmptyResponse,

    /// The response did not have the expected structured shape.
    #[error("response parse error: {0}")]
    Parse(String),

    /// A prompt template failed to load or render.
    #[error("template error: {0}")]
    Template(String),

    /// No oracle is configured (offline mode or test stub).
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// Backend configuration is invalid or missing credentials.
    #[error("config error: {0}")]
    Config(String),
}
