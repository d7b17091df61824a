//! Error types for dependency injection

use thiserror::Error;

/// Errors that can occur during dependency injection operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// Name is not registered in the container or any of its ancestors
    #[error("Unresolved dependency: {name}")]
    UnresolvedDependency { name: String },

    /// A resolved value was requested as a type it does not hold
    #[error("Dependency `{name}` is not a {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
    },

    /// The argument list ran out before the callable took all its parameters
    #[error("No argument supplied at position {position}")]
    MissingArgument { position: usize },

    /// A method-form callable was invoked without a matching receiver
    #[error("Method requires a receiver of type {expected}")]
    MissingReceiver { expected: &'static str },

    /// Constructor failed to build its instance
    #[error("Failed to create {type_name}: {reason}")]
    CreationFailed {
        type_name: &'static str,
        reason: String,
    },

    /// The container a service was registered on has been dropped
    #[error("Owning container has been dropped")]
    ContainerDropped,
}

impl DiError {
    /// Create an UnresolvedDependency error for a name
    #[inline]
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::UnresolvedDependency { name: name.into() }
    }

    /// Create a TypeMismatch error for a named dependency
    #[inline]
    pub fn type_mismatch<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a MissingReceiver error
    #[inline]
    pub fn missing_receiver<T: 'static>() -> Self {
        Self::MissingReceiver {
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed<T: 'static>(reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Whether this error means a name could not be found
    #[inline]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::UnresolvedDependency { .. })
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message() {
        let err = DiError::unresolved("database");
        assert_eq!(err.to_string(), "Unresolved dependency: database");
        assert!(err.is_unresolved());
    }

    #[test]
    fn test_type_mismatch_names_type() {
        let err = DiError::type_mismatch::<u32>("port");
        assert_eq!(err.to_string(), "Dependency `port` is not a u32");
        assert!(!err.is_unresolved());
    }

    #[test]
    fn test_creation_failed_message() {
        struct Listener;

        let err = DiError::creation_failed::<Listener>("address in use");
        let message = err.to_string();
        assert!(message.starts_with("Failed to create "));
        assert!(message.ends_with("Listener: address in use"));
    }
}
