//! Error types shared by every crate in the workspace

use thiserror::Error;

/// Result alias using the core [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Core errors
///
/// Collaborator crates (gateway, persistence) keep their own richer error
/// enums and convert into this one at the trait boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),

    #[error("Timed out after {0} ms")]
    Timeout(u64),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Error::Timeout(250).to_string(), "Timed out after 250 ms");
    }
}
