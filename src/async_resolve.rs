//! Asynchronous resolution on top of tokio.
//!
//! The resolution algorithm is the synchronous one; it runs on the blocking pool so a slow
//! factory never stalls the calling task. Dropping the returned future only stops waiting.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::warn;

use crate::{Lifecycle, RegistrationKey, Registry, RegistryError, RegistryResult};

impl Registry {
    /// Asynchronous form of [`Registry::resolve`].
    ///
    /// A panic raised by the factory is resumed on the awaiting task.
    ///
    /// # Errors
    ///
    /// Same as [`Registry::resolve`], plus [`RegistryError::Cancelled`] when the runtime
    /// shuts down before the resolution finished.
    ///
    /// # Examples
    ///
    /// ```
    /// use service_registry::{Lifecycle, Registry};
    /// use std::sync::Arc;
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let registry = Arc::new(Registry::new());
    /// registry
    ///     .register(Lifecycle::Runtime, None, || Arc::new(7u8))
    ///     .unwrap();
    ///
    /// let value = registry.resolve_async::<u8>(Lifecycle::Runtime, None).await.unwrap();
    /// assert_eq!(*value, 7);
    /// # }
    /// ```
    pub async fn resolve_async<C>(
        self: &Arc<Self>,
        lifecycle: Lifecycle,
        identifier: Option<&str>,
    ) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        let registry = Arc::clone(self);
        let identifier = identifier.map(str::to_owned);

        join(
            key,
            tokio::task::spawn_blocking(move || {
                registry.resolve::<C>(lifecycle, identifier.as_deref())
            }),
        )
        .await
    }

    /// Asynchronous form of [`Registry::get`].
    pub async fn get_async<C>(self: &Arc<Self>, identifier: Option<&str>) -> RegistryResult<Arc<C>>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = RegistrationKey::of::<C>(identifier);
        let registry = Arc::clone(self);
        let identifier = identifier.map(str::to_owned);

        join(
            key,
            tokio::task::spawn_blocking(move || registry.get::<C>(identifier.as_deref())),
        )
        .await
    }
}

async fn join<T>(key: RegistrationKey, handle: JoinHandle<RegistryResult<T>>) -> RegistryResult<T> {
    match handle.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        Err(_) => {
            warn!(key = %key, "resolution task cancelled");
            Err(RegistryError::Cancelled { key })
        }
    }
}
