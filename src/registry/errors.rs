//! # Registry Errors

use thiserror::Error;

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Discovery not found: #{0}")]
    NotFound(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            RegistryError::NotFound(_) => 404,
            RegistryError::Internal(_) => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(RegistryError::NotFound(3).status_code(), 404);
        assert_eq!(RegistryError::Internal("x".into()).status_code(), 500);
    }
}
