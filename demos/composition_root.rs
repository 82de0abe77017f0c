//! Composition root example for service-registry.
//!
//! Demonstrates:
//! - A bootstrap step registering every factory before anything is resolved
//! - Constructor injection: consumers receive their dependencies, they never look them up
//! - Swapping an implementation with `override_factory`
//! - Watching the registry through `tracing` logs
//!
//! Run with: `RUST_LOG=service_registry=debug cargo run --example composition_root`

use service_registry::{Lifecycle, Registry, RegistryResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

struct TickingClock {
    ticks: AtomicU64,
}

impl Clock for TickingClock {
    fn now(&self) -> u64 {
        self.ticks.fetch_add(1, Ordering::SeqCst)
    }
}

struct StdoutNotifier {
    prefix: String,
}

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("   {} {}", self.prefix, message);
    }
}

/// Consumer wired by constructor injection.
struct ReminderService {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderService {
    fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        Self { clock, notifier }
    }

    fn remind(&self, what: &str) {
        self.notifier
            .notify(&format!("[t={}] reminder: {}", self.clock.now(), what));
    }
}

fn bootstrap(registry: &Registry) -> RegistryResult<()> {
    registry.register(Lifecycle::Singleton, None, || {
        Arc::new(TickingClock {
            ticks: AtomicU64::new(0),
        }) as Arc<dyn Clock>
    })?;

    registry.register(Lifecycle::Runtime, Some("stdout"), || {
        Arc::new(StdoutNotifier {
            prefix: ">>".to_string(),
        }) as Arc<dyn Notifier>
    })?;

    Ok(())
}

fn compose(registry: &Registry) -> RegistryResult<ReminderService> {
    Ok(ReminderService::new(
        registry.get::<dyn Clock>(None)?,
        registry.get::<dyn Notifier>(Some("stdout"))?,
    ))
}

fn main() -> RegistryResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== service-registry: Composition Root ===\n");

    // -------------------------------------------------------------------------
    // 1. Bootstrap
    // -------------------------------------------------------------------------
    println!("1. Registering factories...");

    let registry = Arc::new(Registry::new());
    bootstrap(&registry)?;

    println!("   Registered: {:?}", registry.keys());

    // -------------------------------------------------------------------------
    // 2. Compose and use
    // -------------------------------------------------------------------------
    println!("\n2. Composing ReminderService...");

    let service = compose(&registry)?;
    service.remind("stand up");
    service.remind("drink water");

    // -------------------------------------------------------------------------
    // 3. Swap an implementation
    // -------------------------------------------------------------------------
    println!("\n3. Overriding the notifier...");

    registry.override_factory(Lifecycle::Runtime, Some("stdout"), || {
        Arc::new(StdoutNotifier {
            prefix: "!!".to_string(),
        }) as Arc<dyn Notifier>
    });

    // The clock is a singleton, so the new service shares its ticks.
    let service = compose(&registry)?;
    service.remind("ship it");

    // -------------------------------------------------------------------------
    // 4. Missing dependencies are errors
    // -------------------------------------------------------------------------
    println!("\n4. Resolving an unregistered notifier...");

    match registry.get::<dyn Notifier>(Some("email")) {
        Ok(_) => println!("   unexpected success"),
        Err(err) => println!("   {}", err),
    }

    println!("\n=== Done ===");
    Ok(())
}
