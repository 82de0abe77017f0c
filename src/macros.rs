//! Macros for declaring process-wide registries.

/// Declares a module holding a process-wide [`Registry`](crate::Registry).
///
/// The macro generates a module containing:
/// - The registry static (hidden, created on first use)
/// - `registry()`, returning the `&'static Registry`
/// - Free functions delegating to every registry operation
///
/// Prefer passing an `Arc<Registry>` from the composition root. This macro is for hosts that
/// want one registry for the whole process lifetime.
///
/// # Examples
///
/// ```rust
/// use service_registry::{define_registry, Lifecycle};
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// services::register(Lifecycle::Singleton, None, || Arc::new(42i32)).unwrap();
/// services::register(Lifecycle::Runtime, Some("greeting"), || Arc::new("Hello".to_string()))
///     .unwrap();
///
/// let num = services::get::<i32>(None).unwrap();
/// let msg = services::get::<String>(Some("greeting")).unwrap();
///
/// assert_eq!(*num, 42);
/// assert_eq!(&*msg, "Hello");
/// ```
///
/// # Multiple Registries
///
/// Each declared registry is isolated:
///
/// ```rust
/// use service_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::register_instance(None, Arc::new("db_connection".to_string())).unwrap();
///
/// assert!(database::contains::<String>(None));
/// assert!(!cache::contains::<String>(None));
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            use $crate::{Lifecycle, Registry, RegistryEvent, RegistryResult};

            static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

            /// The registry behind this module.
            pub fn registry() -> &'static Registry {
                &REGISTRY
            }

            /// Register a factory. See [`Registry::register`].
            pub fn register<C, F>(
                lifecycle: Lifecycle,
                identifier: Option<&str>,
                factory: F,
            ) -> RegistryResult<()>
            where
                C: ?Sized + Send + Sync + 'static,
                F: Fn() -> Arc<C> + Send + Sync + 'static,
            {
                REGISTRY.register(lifecycle, identifier, factory)
            }

            /// Register a built instance as a singleton.
            pub fn register_instance<C>(identifier: Option<&str>, instance: Arc<C>) -> RegistryResult<()>
            where
                C: ?Sized + Send + Sync + 'static,
            {
                REGISTRY.register_instance(identifier, instance)
            }

            /// Replace a factory. See [`Registry::override_factory`].
            pub fn override_factory<C, F>(lifecycle: Lifecycle, identifier: Option<&str>, factory: F)
            where
                C: ?Sized + Send + Sync + 'static,
                F: Fn() -> Arc<C> + Send + Sync + 'static,
            {
                REGISTRY.override_factory(lifecycle, identifier, factory)
            }

            /// Remove a slot.
            pub fn unregister<C: ?Sized + 'static>(identifier: Option<&str>) {
                REGISTRY.unregister::<C>(identifier)
            }

            /// Reset the registry.
            pub fn clear_cache() {
                REGISTRY.clear_cache()
            }

            /// Resolve with an explicit lifecycle. See [`Registry::resolve`].
            pub fn resolve<C>(lifecycle: Lifecycle, identifier: Option<&str>) -> RegistryResult<Arc<C>>
            where
                C: ?Sized + Send + Sync + 'static,
            {
                REGISTRY.resolve::<C>(lifecycle, identifier)
            }

            /// Resolve with the registered lifecycle.
            pub fn get<C>(identifier: Option<&str>) -> RegistryResult<Arc<C>>
            where
                C: ?Sized + Send + Sync + 'static,
            {
                REGISTRY.get::<C>(identifier)
            }

            /// Resolve and clone the value.
            pub fn get_cloned<C>(identifier: Option<&str>) -> RegistryResult<C>
            where
                C: Clone + Send + Sync + 'static,
            {
                REGISTRY.get_cloned::<C>(identifier)
            }

            /// Check if a slot is registered.
            pub fn contains<C: ?Sized + 'static>(identifier: Option<&str>) -> bool {
                REGISTRY.contains::<C>(identifier)
            }

            /// Set a tracing callback for registry operations.
            pub fn set_trace_callback(callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
                REGISTRY.set_trace_callback(callback)
            }

            /// Clear the tracing callback.
            pub fn clear_trace_callback() {
                REGISTRY.clear_trace_callback()
            }
        }
    };
}
