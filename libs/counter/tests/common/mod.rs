//! Behavior every counter store must share, run against each backend.

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use seqid_counter::{Cancellation, CounterError, CounterStore, DEFAULT_SEED};

static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,seqid_counter=debug,sqlx=warn".into()),
        )
        .with_test_writer()
        .try_init();
}

/// A counter name no other test in this process (or a previous run) uses.
pub fn unique_name(base: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0))
        .as_nanos();
    let n = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{base}-{nanos}-{n}")
}

pub async fn seed_then_increment(store: &dyn CounterStore) {
    let name = unique_name("seeded");
    let none = Cancellation::none();

    store.init_seed(&name, 100, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), 101);
}

pub async fn default_seed_starts_at_one(store: &dyn CounterStore) {
    let name = unique_name("default");
    let none = Cancellation::none();

    store.init_seed(&name, DEFAULT_SEED, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), 1);
}

pub async fn reseed_is_noop(store: &dyn CounterStore) {
    let name = unique_name("reseed");
    let none = Cancellation::none();

    store.init_seed(&name, 10, &none).await.unwrap();
    store.init_seed(&name, 20, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), 11);

    store.init_seed(&name, 0, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), 12);
}

pub async fn sequential_increments(store: &dyn CounterStore) {
    let name = unique_name("sequential");
    let none = Cancellation::none();

    store.init_seed(&name, 5, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), 6);
    assert_eq!(store.increment(&name, &none).await.unwrap(), 7);
    assert_eq!(store.increment(&name, &none).await.unwrap(), 8);
}

pub async fn names_are_independent(store: &dyn CounterStore) {
    let first = unique_name("first");
    let second = unique_name("second");
    let none = Cancellation::none();

    store.init_seed(&first, 10, &none).await.unwrap();
    store.init_seed(&second, 20, &none).await.unwrap();

    assert_eq!(store.increment(&first, &none).await.unwrap(), 11);
    assert_eq!(store.increment(&second, &none).await.unwrap(), 21);
    assert_eq!(store.increment(&first, &none).await.unwrap(), 12);
    assert_eq!(store.increment(&second, &none).await.unwrap(), 22);
}

pub async fn negative_seed(store: &dyn CounterStore) {
    let name = unique_name("negative");
    let none = Cancellation::none();

    store.init_seed(&name, -10, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), -9);
    assert_eq!(store.increment(&name, &none).await.unwrap(), -8);
}

pub async fn large_seed_and_overflow(store: &dyn CounterStore) {
    let name = unique_name("large");
    let none = Cancellation::none();

    store.init_seed(&name, i64::MAX - 2, &none).await.unwrap();
    assert_eq!(store.increment(&name, &none).await.unwrap(), i64::MAX - 1);
    assert_eq!(store.increment(&name, &none).await.unwrap(), i64::MAX);

    let err = store.increment(&name, &none).await.unwrap_err();
    assert!(
        matches!(err, CounterError::Overflow { name: ref n } if *n == name),
        "unexpected error: {err:?}"
    );
}

pub async fn blank_names_rejected(store: &dyn CounterStore) {
    let none = Cancellation::none();

    for name in ["", "   "] {
        assert!(matches!(
            store.init_seed(name, 0, &none).await,
            Err(CounterError::InvalidName)
        ));
        assert!(matches!(
            store.increment(name, &none).await,
            Err(CounterError::InvalidName)
        ));
    }
}

pub async fn cancelled_calls_do_not_mutate(store: &dyn CounterStore) {
    let name = unique_name("cancel");
    let fresh = unique_name("cancel-fresh");
    let none = Cancellation::none();
    let (handle, cancelled) = Cancellation::channel();
    handle.cancel();

    store.init_seed(&name, 3, &none).await.unwrap();
    let err = store.increment(&name, &cancelled).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(store.increment(&name, &none).await.unwrap(), 4);

    let err = store.init_seed(&fresh, 50, &cancelled).await.unwrap_err();
    assert!(err.is_cancelled());
    store.init_seed(&fresh, 7, &none).await.unwrap();
    assert_eq!(store.increment(&fresh, &none).await.unwrap(), 8);
}

pub async fn unseeded_is_not_initialized(store: &dyn CounterStore) {
    let name = unique_name("unseeded");
    let err = store
        .increment(&name, &Cancellation::none())
        .await
        .unwrap_err();

    assert!(err.is_not_initialized(), "unexpected error: {err:?}");
    let message = err.to_string();
    assert!(message.contains("not initialized"));
    assert!(message.contains(&name));
}

/// `tasks` concurrent workers each increment `per_task` times after seeding
/// at zero; the union of results must be exactly `1..=tasks*per_task`.
pub async fn concurrent_increments_are_linearizable(
    store: Arc<dyn CounterStore>,
    tasks: usize,
    per_task: usize,
) {
    let name = unique_name("concurrent");
    store
        .init_seed(&name, 0, &Cancellation::none())
        .await
        .unwrap();

    let mut handles = Vec::with_capacity(tasks);
    for _ in 0..tasks {
        let store = Arc::clone(&store);
        let name = name.clone();
        handles.push(tokio::spawn(async move {
            let none = Cancellation::none();
            let mut values = Vec::with_capacity(per_task);
            for _ in 0..per_task {
                values.push(store.increment(&name, &none).await.unwrap());
            }
            values
        }));
    }

    let mut all = Vec::with_capacity(tasks * per_task);
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    let distinct: BTreeSet<i64> = all.iter().copied().collect();
    let total = i64::try_from(tasks * per_task).unwrap();
    assert_eq!(all.len(), distinct.len(), "duplicate values handed out");
    assert_eq!(distinct, (1..=total).collect::<BTreeSet<_>>());
}
