//! A thread-safe typed registry mapping capabilities to factories.
//!
//! Each registration slot is named by a [`RegistrationKey`] derived from the capability type
//! and an optional identifier. A slot holds a type-erased factory and, for
//! [`Lifecycle::Singleton`] registrations, a cache entry with the materialized instance.
//!
//! # Examples
//!
//! ```
//! use service_registry::{Lifecycle, Registry};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "Hello".to_string()
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .register::<dyn Greeter, _>(Lifecycle::Singleton, None, || Arc::new(English))
//!     .unwrap();
//!
//! let greeter = registry.get::<dyn Greeter>(None).unwrap();
//! assert_eq!(greeter.greet(), "Hello");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace, warn};

use crate::{Lifecycle, RegistrationKey, RegistryError, RegistryEvent, RegistryResult};

/// Type-erased instance. Always holds an `Arc<C>` for the capability `C` it was built for.
type Instance = Box<dyn Any + Send + Sync>;

/// Type-erased factory.
type Factory = Arc<dyn Fn() -> Instance + Send + Sync>;

/// Cache entry of a singleton slot, filled at most once.
type Slot = Arc<OnceLock<Instance>>;

/// Type alias for the user-supplied tracing callback.
///
/// The callback receives a reference to a `RegistryEvent` every time the registry is
/// interacted with. It is invoked outside of the registry locks.
pub type TraceCallback = dyn Fn(&RegistryEvent) + Send + Sync + 'static;

struct Registration {
    lifecycle: Lifecycle,
    factory: Factory,
}

#[derive(Default)]
struct RegistryState {
    factories: HashMap<RegistrationKey, Registration>,
    cache: HashMap<RegistrationKey, Slot>,
}

/// What a resolution has to do once the state lock is released.
enum Resolution {
    Shared { slot: Slot, factory: Factory },
    Fresh(Factory),
}

/// Typed service registry.
///
/// All operations on the factory map and the cache go through one mutex. Factories are
/// never invoked while it is held, so a factory may resolve or register other keys.
/// Concurrent first resolutions of a singleton share one cache slot, which runs the
/// factory exactly once.
///
/// The registry is meant to be built by the composition root and shared as
/// `Arc<Registry>`, or declared process-wide with [`define_registry!`](crate::define_registry).
pub struct Registry {
    state: Mutex<RegistryState>,
    trace: RwLock<Option<Arc<TraceCallback>>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            trace: RwLock::new(None),
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Tracing
    // -------------------------------------------------------------------------------------------------

    /// Sets a tracing callback that will be invoked on every registry interaction.
    ///
    /// The callback runs without any registry lock held and may call back into the registry.
    pub fn set_trace_callback(&self, callback: impl Fn(&RegistryEvent) + Send + Sync + 'static) {
        *self.trace.write() = Some(Arc::new(callback));
    }

    /// Clears the tracing callback (disables registry tracing).
    pub fn clear_trace_callback(&self) {
        *self.trace.write() = None;
    }

    fn emit_event(&self, event: &RegistryEvent) {
        let callback = self.trace.read().clone();
        if let Some(callback) = callback {
            callback(event);
        }
    }

    // -------------------------------------------------------------------------------------------------
    // Mutation
    // -------------------------------------------------------------------------------------------------

    /// Registers a factory for capability `C` under an optional identifier.
    ///
    /// Registration is one-shot: a second registration of the same slot fails with
    /// [`RegistryError::AlreadyRegistered`] and leaves the first one intact. Use
    /// [`override_factory`](Self::override_factory) to replace a registration.
    ///
    /// A [`Lifecycle::Singleton`] factory is invoked immediately and its result cached.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_registry::{Lifecycle, Registry, RegistryError};
    /// use std::sync::Arc;
    ///
    /// let registry = Registry::new();
    /// registry
    ///     .register(Lifecycle::Runtime, Some("port"), || Arc::new(8080u16))
    ///     .unwrap();
    ///
    /// let again = registry.register(Lifecycle::Runtime, Some("port"), || Arc::new(9090u16));
    /// assert!(matches!(again, Err(RegistryError::AlreadyRegistered { .. })));
    /// assert_eq!(*registry.get::<u16>(Some("port")).unwrap(), 8080);
    /// ```
    pub fn register<C, F>(
        &self,
        lifecycle: Lifecycle,
        identifier: Option<&str>,
        factory: F,
    ) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        let factory = erase(factory);

        let eager = {
            let mut state = self.state.lock();
            if state.factories.contains_key(&key) {
                None
            } else {
                state.factories.insert(
                    key.clone(),
                    Registration {
                        lifecycle,
                        factory: Arc::clone(&factory),
                    },
                );
                let slot = match lifecycle {
                    Lifecycle::Singleton => {
                        let slot = Slot::default();
                        state.cache.insert(key.clone(), Arc::clone(&slot));
                        Some(slot)
                    }
                    Lifecycle::Runtime => None,
                };
                Some(slot)
            }
        };

        let Some(slot) = eager else {
            warn!(key = %key, "rejected duplicate registration");
            return Err(RegistryError::AlreadyRegistered { key });
        };

        debug!(key = %key, %lifecycle, "registered factory");
        self.emit_event(&RegistryEvent::Register {
            key: key.clone(),
            lifecycle,
        });

        if let Some(slot) = slot {
            slot.get_or_init(|| factory());
            debug!(key = %key, "materialized singleton");
        }

        Ok(())
    }

    /// Registers an already built instance as a materialized singleton.
    pub fn register_instance<C>(&self, identifier: Option<&str>, instance: Arc<C>) -> RegistryResult<()>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.register(Lifecycle::Singleton, identifier, move || Arc::clone(&instance))
    }

    /// Replaces the factory of a slot, creating the slot if it does not exist. Never fails.
    ///
    /// Any cached instance of the slot is dropped. A singleton is rebuilt from the new
    /// factory on its next resolution.
    pub fn override_factory<C, F>(&self, lifecycle: Lifecycle, identifier: Option<&str>, factory: F)
    where
        C: ?Sized + Send + Sync + 'static,
        F: Fn() -> Arc<C> + Send + Sync + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        let registration = Registration {
            lifecycle,
            factory: erase(factory),
        };

        let (evicted, previous) = {
            let mut state = self.state.lock();
            (
                state.cache.remove(&key),
                state.factories.insert(key.clone(), registration),
            )
        };
        let replaced = previous.is_some();
        // Dropped outside the lock, cached values may run arbitrary Drop code.
        drop((evicted, previous));

        debug!(key = %key, %lifecycle, replaced, "overrode factory");
        self.emit_event(&RegistryEvent::Override { key, lifecycle });
    }

    /// Removes the factory and any cached instance of a slot.
    ///
    /// Unregistering a slot that was never registered is a no-op.
    pub fn unregister<C>(&self, identifier: Option<&str>)
    where
        C: ?Sized + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);

        let (evicted, previous) = {
            let mut state = self.state.lock();
            (state.cache.remove(&key), state.factories.remove(&key))
        };
        let removed = previous.is_some();
        drop((evicted, previous));

        if removed {
            debug!(key = %key, "unregistered factory");
        }
        self.emit_event(&RegistryEvent::Unregister { key, removed });
    }

    /// Removes every factory and every cached instance.
    ///
    /// Despite the name this resets the whole registry, not only the cache. Instances
    /// already handed out stay valid.
    pub fn clear_cache(&self) {
        let state = std::mem::take(&mut *self.state.lock());
        debug!(
            factories = state.factories.len(),
            cached = state.cache.len(),
            "cleared registry"
        );
        drop(state);

        self.emit_event(&RegistryEvent::Clear {});
    }

    // -------------------------------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------------------------------

    /// Resolves capability `C`, checking that the slot was registered with `lifecycle`.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no factory is registered for the slot
    /// - [`RegistryError::LifecycleMismatch`] if the slot was registered with another lifecycle
    /// - [`RegistryError::TypeMismatch`] if the factory produced a value of another type
    pub fn resolve<C>(&self, lifecycle: Lifecycle, identifier: Option<&str>) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_key(RegistrationKey::of::<C>(identifier), Some(lifecycle))
    }

    /// Resolves capability `C` with whatever lifecycle the slot was registered with.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::NotFound`] if no factory is registered for the slot
    /// - [`RegistryError::TypeMismatch`] if the factory produced a value of another type
    pub fn get<C>(&self, identifier: Option<&str>) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        self.resolve_key(RegistrationKey::of::<C>(identifier), None)
    }

    /// Resolves capability `C` and returns a clone of the value.
    pub fn get_cloned<C>(&self, identifier: Option<&str>) -> RegistryResult<C>
    where
        C: Clone + Send + Sync + 'static,
    {
        let value = self.get::<C>(identifier)?;
        Ok((*value).clone())
    }

    fn resolve_key<C>(&self, key: RegistrationKey, requested: Option<Lifecycle>) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let outcome = self.plan(&key, requested).and_then(|resolution| match resolution {
            Resolution::Shared { slot, factory } => {
                let mut built = false;
                let instance = slot.get_or_init(|| {
                    built = true;
                    factory()
                });
                downcast::<C>(&key, &**instance).map(|value| (value, !built))
            }
            Resolution::Fresh(factory) => {
                let instance = factory();
                downcast::<C>(&key, &*instance).map(|value| (value, false))
            }
        });

        match &outcome {
            Ok((_, true)) => trace!(key = %key, "served cached instance"),
            Ok((_, false)) => debug!(key = %key, "invoked factory"),
            Err(err) => debug!(key = %key, error = %err, "resolution failed"),
        }

        self.emit_event(&RegistryEvent::Resolve {
            key,
            found: outcome.is_ok(),
            cached: matches!(outcome, Ok((_, true))),
        });

        outcome.map(|(value, _)| value)
    }

    /// Looks the slot up under the lock and hands back what is needed to finish without it.
    fn plan(&self, key: &RegistrationKey, requested: Option<Lifecycle>) -> RegistryResult<Resolution> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let registration = state
            .factories
            .get(key)
            .ok_or_else(|| RegistryError::NotFound { key: key.clone() })?;

        let lifecycle = registration.lifecycle;
        if let Some(requested) = requested {
            if requested != lifecycle {
                return Err(RegistryError::LifecycleMismatch {
                    key: key.clone(),
                    registered: lifecycle,
                    requested,
                });
            }
        }

        let factory = Arc::clone(&registration.factory);
        Ok(match lifecycle {
            Lifecycle::Singleton => Resolution::Shared {
                slot: Arc::clone(state.cache.entry(key.clone()).or_default()),
                factory,
            },
            Lifecycle::Runtime => Resolution::Fresh(factory),
        })
    }

    // -------------------------------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------------------------------

    /// Checks whether a factory is registered for the slot.
    pub fn contains<C>(&self, identifier: Option<&str>) -> bool
    where
        C: ?Sized + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        self.state.lock().factories.contains_key(&key)
    }

    /// Checks whether the slot holds a materialized singleton.
    pub fn is_cached<C>(&self, identifier: Option<&str>) -> bool
    where
        C: ?Sized + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        self.state
            .lock()
            .cache
            .get(&key)
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Lifecycle the slot is registered with, if any.
    pub fn lifecycle_of<C>(&self, identifier: Option<&str>) -> Option<Lifecycle>
    where
        C: ?Sized + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        self.state
            .lock()
            .factories
            .get(&key)
            .map(|registration| registration.lifecycle)
    }

    /// Number of registered factories.
    pub fn len(&self) -> usize {
        self.state.lock().factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().factories.is_empty()
    }

    /// Keys of all registered factories, sorted.
    pub fn keys(&self) -> Vec<RegistrationKey> {
        let mut keys: Vec<_> = self.state.lock().factories.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Registry")
            .field("factories", &state.factories.len())
            .field("cached", &state.cache.len())
            .finish()
    }
}

fn erase<C, F>(factory: F) -> Factory
where
    C: ?Sized + Send + Sync + 'static,
    F: Fn() -> Arc<C> + Send + Sync + 'static,
{
    Arc::new(move || Box::new(factory()) as Instance)
}

fn downcast<C>(key: &RegistrationKey, instance: &(dyn Any + Send + Sync)) -> RegistryResult<Arc<C>>
where
    C: ?Sized + Send + Sync + 'static,
{
    instance
        .downcast_ref::<Arc<C>>()
        .map(Arc::clone)
        .ok_or_else(|| RegistryError::TypeMismatch {
            key: key.clone(),
            expected: std::any::type_name::<C>(),
        })
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
