use thiserror::Error;

use crate::{Lifecycle, RegistrationKey};

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors returned by registry operations.
///
/// Every variant carries the key of the slot involved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `register` was called for a slot that already holds a factory.
    #[error("Already registered in registry: {key}")]
    AlreadyRegistered { key: RegistrationKey },

    /// No factory is registered for the slot.
    #[error("Not found in registry: {key}")]
    NotFound { key: RegistrationKey },

    /// The factory under the slot produced a value of another type.
    #[error("Type mismatch in registry: {key} does not produce {expected}")]
    TypeMismatch {
        key: RegistrationKey,
        expected: &'static str,
    },

    /// The requested lifecycle differs from the one the slot was registered with.
    #[error("Lifecycle mismatch in registry: {key} is registered as {registered}, requested as {requested}")]
    LifecycleMismatch {
        key: RegistrationKey,
        registered: Lifecycle,
        requested: Lifecycle,
    },

    /// The background resolution task was cancelled before it finished.
    #[error("Resolution cancelled: {key}")]
    Cancelled { key: RegistrationKey },
}

impl RegistryError {
    /// Key of the slot the error refers to.
    pub fn key(&self) -> &RegistrationKey {
        match self {
            RegistryError::AlreadyRegistered { key }
            | RegistryError::NotFound { key }
            | RegistryError::TypeMismatch { key, .. }
            | RegistryError::LifecycleMismatch { key, .. }
            | RegistryError::Cancelled { key } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_already_registered_display() {
        let err = RegistryError::AlreadyRegistered {
            key: RegistrationKey::of::<i32>(None),
        };
        assert_eq!(err.to_string(), "Already registered in registry: i32");
    }

    #[test]
    fn test_not_found_display() {
        let err = RegistryError::NotFound {
            key: RegistrationKey::of::<i32>(Some("answer")),
        };
        assert_eq!(err.to_string(), "Not found in registry: i32#answer");
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = RegistryError::TypeMismatch {
            key: RegistrationKey::of::<u8>(Some("level")),
            expected: "u8",
        };
        assert_eq!(
            err.to_string(),
            "Type mismatch in registry: u8#level does not produce u8"
        );
    }

    #[test]
    fn test_lifecycle_mismatch_display() {
        let err = RegistryError::LifecycleMismatch {
            key: RegistrationKey::of::<u8>(None),
            registered: Lifecycle::Singleton,
            requested: Lifecycle::Runtime,
        };
        assert_eq!(
            err.to_string(),
            "Lifecycle mismatch in registry: u8 is registered as singleton, requested as runtime"
        );
    }

    #[test]
    fn test_key_accessor() {
        let key = RegistrationKey::of::<bool>(Some("flag"));
        let err = RegistryError::Cancelled { key: key.clone() };
        assert_eq!(err.key(), &key);
    }

    #[test]
    fn test_error_trait() {
        let err: &dyn std::error::Error = &RegistryError::NotFound {
            key: RegistrationKey::of::<bool>(None),
        };
        assert_eq!(err.to_string(), "Not found in registry: bool");
    }
}
