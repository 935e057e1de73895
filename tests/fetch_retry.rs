mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{all_tokens, loaded_store, seeded_source};
use token_pulse::api::{RetryPolicy, TokenSource};
use token_pulse::config::FetchConfig;
use token_pulse::models::Category;
use token_pulse::services::CategoryLoader;
use token_pulse::store::TokenStore;
use token_pulse::Error;
use tokio_test::{assert_err, assert_ok};

async fn terminal_failures(failure_probability: f64, runs: usize, seed: u64) -> usize {
    let source = seeded_source(failure_probability, seed);
    let policy = RetryPolicy::default();
    let mut failures = 0;
    for _ in 0..runs {
        let result = policy
            .run("fetch all", |_| source.fetch_tokens(Category::All))
            .await;
        if result.is_err() {
            failures += 1;
        }
    }
    failures
}

#[tokio::test(start_paused = true)]
async fn test_retries_make_terminal_failures_rare() {
    // 0.05^3 per run: about one failure in eight thousand
    let failures = terminal_failures(0.05, 100, 7).await;
    assert!(failures <= 1, "{} terminal failures in 100 runs", failures);
}

#[tokio::test(start_paused = true)]
async fn test_terminal_failure_rate_composes_attempts() {
    let failures = terminal_failures(0.5, 1_000, 99).await;
    let rate = failures as f64 / 1_000.0;
    assert!((rate - 0.125).abs() < 0.045, "observed rate {}", rate);
}

#[test_log::test(tokio::test(start_paused = true))]
async fn test_loader_surfaces_exhaustion_and_keeps_data() {
    let store = loaded_store().await;
    let before = store.partition(Category::All).await;
    let loader = CategoryLoader::from_config(
        store.clone(),
        seeded_source(1.0, 1),
        &FetchConfig::default(),
    );
    let started = tokio::time::Instant::now();

    let result = loader.refresh(Category::All).await;

    let err = assert_err!(result);
    assert!(matches!(err, Error::RetriesExhausted { attempts: 3, .. }));
    // three latencies of at least 500ms plus 1s and 2s of backoff
    assert!(started.elapsed() >= Duration::from_millis(4_500));
    assert_eq!(
        store.error().await.as_deref(),
        Some("Failed to fetch token data for category 'all'")
    );
    assert!(!store.is_loading().await);
    assert_eq!(store.partition(Category::All).await, before);
}

#[tokio::test(start_paused = true)]
async fn test_loader_success_overwrites_previous_error() {
    let store = TokenStore::new();
    store.set_error(Some("Failed to fetch token data for category 'all'".into())).await;
    let loader = CategoryLoader::from_config(store.clone(), seeded_source(0.0, 5), &FetchConfig::default());

    assert_eq!(assert_ok!(loader.load(Category::All).await), 5);

    assert!(store.error().await.is_none());
    assert!(!store.is_loading().await);
    assert_eq!(store.partition(Category::All).await, all_tokens());
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_spans_overlapping_loads() {
    let store = TokenStore::new();
    let loader = Arc::new(CategoryLoader::from_config(
        store.clone(),
        seeded_source(0.0, 12),
        &FetchConfig::default(),
    ));

    let a = tokio::spawn({
        let loader = loader.clone();
        async move { loader.refresh(Category::New).await }
    });
    let b = tokio::spawn({
        let loader = loader.clone();
        async move { loader.refresh(Category::Migrated).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.is_loading().await);

    assert_ok!(a.await.unwrap());
    assert_ok!(b.await.unwrap());
    assert!(!store.is_loading().await);
    assert_eq!(store.partition(Category::New).await.len(), 5);
    assert_eq!(store.partition(Category::Migrated).await.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_refresh_still_clears_loading() {
    let store = TokenStore::new();
    let loader = CategoryLoader::from_config(store.clone(), seeded_source(0.0, 8), &FetchConfig::default());

    // latency is at least 500ms, so the caller gives up first
    let abandoned = tokio::time::timeout(Duration::from_millis(100), loader.refresh(Category::New)).await;
    assert!(abandoned.is_err());
    assert!(store.is_loading().await);

    assert_ok!(loader.refresh(Category::New).await);
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(!store.is_loading().await);
    assert_eq!(store.partition(Category::New).await.len(), 5);
    assert!(store.error().await.is_none());
}
