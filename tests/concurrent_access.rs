//! Integration tests for concurrent use of one registry from many threads.

use service_registry::{Lifecycle, Registry, RegistryError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

const THREADS: usize = 16;

struct Connection {
    id: usize,
}

#[test]
fn test_concurrent_first_resolution_builds_once() {
    let registry = Arc::new(Registry::new());
    let calls = Arc::new(AtomicUsize::new(0));

    let calls_clone = Arc::clone(&calls);
    // Override is lazy, so the first resolutions race to build the singleton.
    registry.override_factory(Lifecycle::Singleton, None, move || {
        let id = calls_clone.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(20));
        Arc::new(Connection { id })
    });

    let barrier = Arc::new(Barrier::new(THREADS));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry
                    .resolve::<Connection>(Lifecycle::Singleton, None)
                    .unwrap()
            })
        })
        .collect();

    let resolved: Vec<Arc<Connection>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(resolved.iter().all(|c| Arc::ptr_eq(c, &resolved[0])));
    assert_eq!(resolved[0].id, 0);
}

#[test]
fn test_concurrent_registration_has_one_winner() {
    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                registry.register(Lifecycle::Singleton, None, move || Arc::new(i))
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    let rejected = results
        .iter()
        .filter(|r| matches!(r, Err(RegistryError::AlreadyRegistered { .. })))
        .count();

    assert_eq!(winners, 1);
    assert_eq!(rejected, THREADS - 1);
    assert!(*registry.get::<usize>(None).unwrap() < THREADS);
}

#[test]
fn test_concurrent_distinct_keys_are_not_lost() {
    let registry = Arc::new(Registry::new());

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let identifier = format!("worker-{i}");
                registry
                    .register(Lifecycle::Runtime, Some(&identifier), move || Arc::new(i))
                    .unwrap();
                assert_eq!(*registry.get::<usize>(Some(&identifier)).unwrap(), i);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(registry.len(), THREADS);
    for i in 0..THREADS {
        assert_eq!(*registry.get::<usize>(Some(&format!("worker-{i}"))).unwrap(), i);
    }
}

#[test]
fn test_mixed_operations_never_deadlock_or_tear() {
    let registry = Arc::new(Registry::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..200usize {
                    match (i + round) % 4 {
                        0 => {
                            let _ = registry.register(Lifecycle::Singleton, Some("shared"), || {
                                Arc::new(String::from("registered"))
                            });
                        }
                        1 => registry.override_factory(Lifecycle::Singleton, Some("shared"), || {
                            Arc::new(String::from("overridden"))
                        }),
                        2 => registry.unregister::<String>(Some("shared")),
                        _ => match registry.resolve::<String>(Lifecycle::Singleton, Some("shared")) {
                            Ok(value) => {
                                assert!(value.as_str() == "registered" || value.as_str() == "overridden")
                            }
                            Err(err) => assert!(matches!(err, RegistryError::NotFound { .. })),
                        },
                    }

                    // A private key per thread is never disturbed by the others.
                    let own = format!("own-{i}");
                    registry.override_factory(Lifecycle::Runtime, Some(&own), move || Arc::new(round));
                    assert_eq!(*registry.get::<usize>(Some(&own)).unwrap(), round);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    for i in 0..THREADS {
        assert_eq!(*registry.get::<usize>(Some(&format!("own-{i}"))).unwrap(), 199);
    }
}

#[test]
fn test_nested_resolution_across_threads() {
    let registry = Arc::new(Registry::new());
    registry
        .register(Lifecycle::Runtime, Some("base"), || Arc::new(40u64))
        .unwrap();

    let inner = Arc::clone(&registry);
    registry.override_factory(Lifecycle::Singleton, Some("sum"), move || {
        let base = inner.get::<u64>(Some("base")).unwrap();
        Arc::new(*base + 2)
    });

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || *registry.get::<u64>(Some("sum")).unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 42);
    }
}
