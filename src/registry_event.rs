use crate::{Lifecycle, RegistrationKey};

/// Events emitted by the registry during operations.
///
/// These events are passed to the tracing callback set via `Registry::set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use service_registry::{Lifecycle, RegistrationKey, RegistryEvent};
///
/// let event = RegistryEvent::Register {
///     key: RegistrationKey::of::<i32>(None),
///     lifecycle: Lifecycle::Singleton,
/// };
/// assert_eq!(event.to_string(), "register { key: i32, lifecycle: singleton }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    /// A factory was registered.
    Register {
        key: RegistrationKey,
        lifecycle: Lifecycle,
    },

    /// A factory was overridden (or created by an override).
    Override {
        key: RegistrationKey,
        lifecycle: Lifecycle,
    },

    /// A slot was resolved.
    Resolve {
        key: RegistrationKey,
        /// Whether a value was returned.
        found: bool,
        /// Whether the value was served from the cache without running the factory.
        cached: bool,
    },

    /// A slot was unregistered.
    Unregister {
        key: RegistrationKey,
        /// Whether a factory was actually removed.
        removed: bool,
    },

    /// The registry was cleared.
    Clear {},
}

impl std::fmt::Display for RegistryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEvent::Register { key, lifecycle } => {
                write!(f, "register {{ key: {}, lifecycle: {} }}", key, lifecycle)
            }
            RegistryEvent::Override { key, lifecycle } => {
                write!(f, "override {{ key: {}, lifecycle: {} }}", key, lifecycle)
            }
            RegistryEvent::Resolve { key, found, cached } => write!(
                f,
                "resolve {{ key: {}, found: {}, cached: {} }}",
                key, found, cached
            ),
            RegistryEvent::Unregister { key, removed } => {
                write!(f, "unregister {{ key: {}, removed: {} }}", key, removed)
            }
            RegistryEvent::Clear {} => write!(f, "Clearing the Registry"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_event_display() {
        let event = RegistryEvent::Override {
            key: RegistrationKey::of::<u8>(Some("x")),
            lifecycle: Lifecycle::Runtime,
        };
        assert_eq!(event.to_string(), "override { key: u8#x, lifecycle: runtime }");

        let event = RegistryEvent::Resolve {
            key: RegistrationKey::of::<String>(None),
            found: true,
            cached: false,
        };
        assert_eq!(
            event.to_string(),
            "resolve { key: alloc::string::String, found: true, cached: false }"
        );

        let event = RegistryEvent::Unregister {
            key: RegistrationKey::of::<u8>(None),
            removed: false,
        };
        assert_eq!(event.to_string(), "unregister { key: u8, removed: false }");

        assert_eq!(RegistryEvent::Clear {}.to_string(), "Clearing the Registry");
    }

    #[test]
    fn test_registry_event_clone() {
        let event = RegistryEvent::Register {
            key: RegistrationKey::of::<i32>(None),
            lifecycle: Lifecycle::Singleton,
        };
        assert_eq!(event.clone(), event);
    }
}
