//! # Service Registry
//!
//! A thread-safe typed service registry for dependency injection.
//!
//! Parts of an application register factories for a capability (any type, including trait
//! objects) under an optional identifier, and other parts resolve an instance of that
//! capability without knowing how it is built.
//!
//! ## Quick Start
//!
//! ```rust
//! use service_registry::{Lifecycle, Registry};
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//!
//! // Built once and shared
//! registry
//!     .register(Lifecycle::Singleton, None, || Arc::new("Hello, World!".to_string()))
//!     .unwrap();
//!
//! let message = registry.get::<String>(None).unwrap();
//! assert_eq!(&*message, "Hello, World!");
//! ```
//!
//! ## Features
//!
//! - **Thread-safe**: Every operation may be called from any thread at any time
//! - **Type-safe**: Resolution checks the produced type and reports mismatches as errors
//! - **Two lifecycles**: [`Lifecycle::Singleton`] caches, [`Lifecycle::Runtime`] builds per call
//! - **Tracing support**: `tracing` logs plus an optional callback receiving [`RegistryEvent`]s
//! - **Async resolution**: [`Registry::resolve_async`] behind the `async` feature
//!
//! ## Main Operations
//!
//! - [`Registry::register`] - Register a factory (one-shot per slot)
//! - [`Registry::override_factory`] - Replace a factory, never fails
//! - [`Registry::unregister`] - Remove a slot, idempotent
//! - [`Registry::clear_cache`] - Reset the registry
//! - [`Registry::resolve`] / [`Registry::get`] - Resolve an instance
//! - [`define_registry!`] - Declare a process-wide registry module

#[cfg(feature = "async")]
mod async_resolve;
mod lifecycle;
mod macros;
mod registry;
mod registry_error;
mod registry_event;
mod registry_key;

pub use lifecycle::Lifecycle;
pub use registry::{Registry, TraceCallback};
pub use registry_error::{RegistryError, RegistryResult};
pub use registry_event::RegistryEvent;
pub use registry_key::RegistrationKey;
