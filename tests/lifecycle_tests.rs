use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use shorturl::config::RetryConfig;
use shorturl::errors::{Result, ShortUrlError};
use shorturl::services::{ClassificationService, CreateLinkProperties, Denylist, LinkService};
use shorturl::storage::{InMemoryLinkStore, Link, LinkStore};
use shorturl::utils::compute_hash;

fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_retries: 3,
        base_delay_ms: 1,
        max_delay_ms: 5,
    }
}

fn build_service(denylist: Denylist) -> (Arc<InMemoryLinkStore>, LinkService, Arc<ClassificationService>) {
    let store = Arc::new(InMemoryLinkStore::new());
    let classifier = Arc::new(ClassificationService::with_retry_config(
        store.clone(),
        Arc::new(denylist),
        fast_retry(),
    ));
    let service = LinkService::new(store.clone(), classifier.clone());
    (store, service, classifier)
}

async fn wait_for_classification(service: &LinkService, hash: &str) {
    for _ in 0..200 {
        if !service.is_processing(hash).await.unwrap() {
            return;
        }
        sleep(Duration::from_millis(5)).await;
    }
    panic!("classification did not finish for {}", hash);
}

#[tokio::test]
async fn test_create_returns_processing_link() {
    let (_, service, _) = build_service(Denylist::empty());

    let link = service
        .create("https://example.com/page", CreateLinkProperties::default())
        .await
        .unwrap();

    assert_eq!(link.hash, compute_hash("https://example.com/page"));
    assert!(link.properties.processing);
    assert!(!link.properties.spam);

    // redirect immediately after create still sees the transient state
    let resolved = service.redirect_to(&link.hash).await.unwrap();
    assert_eq!(resolved.target, "https://example.com/page");
}

#[tokio::test]
async fn test_classification_reaches_terminal_state() {
    let (_, service, classifier) = build_service(Denylist::empty());

    let link = service
        .create("https://example.com/clean", CreateLinkProperties::default())
        .await
        .unwrap();
    wait_for_classification(&service, &link.hash).await;

    assert!(!service.is_processing(&link.hash).await.unwrap());
    assert!(!classifier.is_spam(&link.hash).await);
}

#[tokio::test]
async fn test_denylisted_ip_is_flagged_as_spam() {
    let (_, service, classifier) = build_service(Denylist::from_entries(["203.0.113.9"]));

    let properties = CreateLinkProperties {
        owner_ip: Some("203.0.113.9".to_string()),
        ..Default::default()
    };
    let link = service
        .create("https://example.com/from-bad-ip", properties)
        .await
        .unwrap();
    wait_for_classification(&service, &link.hash).await;

    assert!(classifier.is_spam(&link.hash).await);
    let resolved = service.redirect_to(&link.hash).await.unwrap();
    assert!(resolved.properties.spam);
}

#[tokio::test]
async fn test_denylisted_target_is_flagged_as_spam() {
    let target = "https://spam.example/offer";
    let (_, service, classifier) = build_service(Denylist::from_entries([target]));

    let link = service
        .create(target, CreateLinkProperties::default())
        .await
        .unwrap();
    wait_for_classification(&service, &link.hash).await;

    assert!(classifier.is_spam(&link.hash).await);
}

#[tokio::test]
async fn test_unknown_hash_fails_with_not_found() {
    let (_, service, classifier) = build_service(Denylist::empty());

    assert!(matches!(
        service.redirect_to("missing").await,
        Err(ShortUrlError::NotFound(_))
    ));
    assert!(matches!(
        service.is_processing("missing").await,
        Err(ShortUrlError::NotFound(_))
    ));
    // tolerant queries just answer false
    assert!(!classifier.is_spam("missing").await);
    assert!(!service.has_sponsor("missing").await);
}

#[tokio::test]
async fn test_invalid_target_is_rejected() {
    let (store, service, _) = build_service(Denylist::empty());

    let result = service
        .create("not-a-url", CreateLinkProperties::default())
        .await;
    assert!(matches!(result, Err(ShortUrlError::InvalidTarget(_))));
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_sponsor_is_visible_on_created_link() {
    let (_, service, _) = build_service(Denylist::empty());

    let properties = CreateLinkProperties {
        sponsor: Some("acme".to_string()),
        ..Default::default()
    };
    let link = service
        .create("https://example.com/sponsored", properties)
        .await
        .unwrap();

    assert!(service.has_sponsor(&link.hash).await);
}

#[tokio::test]
async fn test_duplicate_create_does_not_revert_terminal_state() {
    let (_, service, _) = build_service(Denylist::empty());

    let link = service
        .create("https://example.com/twice", CreateLinkProperties::default())
        .await
        .unwrap();
    wait_for_classification(&service, &link.hash).await;

    // same target, same hash: the stored terminal record wins
    let again = service
        .create("https://example.com/twice", CreateLinkProperties::default())
        .await
        .unwrap();
    assert_eq!(again.hash, link.hash);
    assert!(!again.properties.processing);
    assert!(!service.is_processing(&link.hash).await.unwrap());
}

/// Store whose single-field updates fail transiently before succeeding
struct FlakyLinkStore {
    inner: InMemoryLinkStore,
    failures_left: AtomicU32,
}

impl FlakyLinkStore {
    fn new(failures: u32) -> Self {
        Self {
            inner: InMemoryLinkStore::new(),
            failures_left: AtomicU32::new(failures),
        }
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl LinkStore for FlakyLinkStore {
    async fn get(&self, hash: &str) -> Result<Option<Link>> {
        self.inner.get(hash).await
    }

    async fn put(&self, link: Link) -> Result<Link> {
        self.inner.put(link).await
    }

    async fn update_spam(&self, hash: &str, spam: bool) -> Result<()> {
        if self.take_failure() {
            return Err(ShortUrlError::storage("simulated write conflict"));
        }
        self.inner.update_spam(hash, spam).await
    }

    async fn update_processing(&self, hash: &str, processing: bool) -> Result<()> {
        if self.take_failure() {
            return Err(ShortUrlError::storage("simulated write conflict"));
        }
        self.inner.update_processing(hash, processing).await
    }
}

#[tokio::test]
async fn test_classification_retries_transient_store_failures() {
    let store = Arc::new(FlakyLinkStore::new(2));
    let classifier = Arc::new(ClassificationService::with_retry_config(
        store.clone(),
        Arc::new(Denylist::empty()),
        fast_retry(),
    ));
    let service = LinkService::new(store.clone(), classifier);

    let link = service
        .create("https://example.com/flaky", CreateLinkProperties::default())
        .await
        .unwrap();
    wait_for_classification(&service, &link.hash).await;

    assert!(!service.is_processing(&link.hash).await.unwrap());
}

#[tokio::test]
async fn test_exhausted_retries_leave_link_processing() {
    // more failures than the retry budget allows
    let store = Arc::new(FlakyLinkStore::new(10));
    let classifier = Arc::new(ClassificationService::with_retry_config(
        store.clone(),
        Arc::new(Denylist::empty()),
        fast_retry(),
    ));
    let service = LinkService::new(store.clone(), classifier);

    let link = service
        .create("https://example.com/stuck", CreateLinkProperties::default())
        .await
        .unwrap();
    sleep(Duration::from_millis(200)).await;

    // failure is logged, never surfaced; the link stays in its transient
    // state rather than exposing a half-applied verdict
    assert!(service.is_processing(&link.hash).await.unwrap());
}
