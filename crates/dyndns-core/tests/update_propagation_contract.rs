//! Contract Test: Update Propagation
//!
//! This test verifies when an update is forwarded to the provider and
//! whose answer the caller receives.
//!
//! Constraints verified:
//! - Cache reports a change → provider is called and its result is returned
//! - Cache reports no change → provider is NOT called, result is `false`
//! - No cache → every update reaches the provider
//! - Input errors from either tier propagate unchanged and mutate nothing
//!
//! If this test fails, the façade is either making redundant provider
//! calls or silently dropping real changes.

mod common;

use common::*;
use dyndns_core::{Error, HostManager};
use std::time::Duration;

#[tokio::test]
async fn changed_in_cache_propagates_to_provider() {
    let cache = MockHostManager::new("cache").with_host("foo", &["10.0.0.1"]);
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.1"]);
    let mut manager = facade(&provider, Some(&cache));

    let updated = tokio_test::assert_ok!(manager.update_host("foo", "10.0.0.5").await);

    assert!(updated, "Provider wrote the new address");
    assert_eq!(
        provider.updates(),
        vec![("foo".to_string(), "10.0.0.5".to_string())]
    );
    assert_eq!(cache.write_count(), 1);
    assert_eq!(provider.write_count(), 1);
}

#[tokio::test]
async fn provider_result_is_final_when_propagating() {
    // Cache is stale, provider already holds the new address (drift)
    let cache = MockHostManager::new("cache").with_host("foo", &["10.0.0.1"]);
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.5"]);
    let mut manager = facade(&provider, Some(&cache));

    let updated = manager.update_host("foo", "10.0.0.5").await.unwrap();

    assert!(!updated, "Provider's no-op answer is returned, not the cache's");
    assert_eq!(cache.write_count(), 1);
    assert_eq!(provider.update_call_count(), 1);
    assert_eq!(provider.write_count(), 0);
}

#[tokio::test]
async fn unchanged_in_cache_skips_provider() {
    let cache = MockHostManager::new("cache").with_host("foo", &["10.0.0.5"]);
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.1"]);
    let mut manager = facade(&provider, Some(&cache));

    let updated = manager.update_host("foo", "10.0.0.5").await.unwrap();

    assert!(!updated);
    assert_eq!(
        provider.update_call_count(),
        0,
        "Cache no-op must not reach the provider"
    );
    assert_eq!(cache.touch_count(), 1, "Cache records a heartbeat");
}

#[tokio::test]
async fn repeated_update_is_idempotent() {
    let cache = MockHostManager::new("cache").with_host("foo", &["10.0.0.5"]);
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.5"]);
    let mut manager = facade(&provider, Some(&cache));

    assert!(!manager.update_host("foo", "10.0.0.5").await.unwrap());
    let first_touch = cache.host("foo").unwrap().last_touched;
    assert!(!manager.update_host("foo", "10.0.0.5").await.unwrap());

    assert_eq!(cache.write_count(), 0, "No address mutation");
    assert_eq!(cache.touch_count(), 2, "Only heartbeats");
    assert_eq!(provider.update_call_count(), 0);

    let record = cache.host("foo").unwrap();
    assert_eq!(record.ipv4_address, Some("10.0.0.5".parse().unwrap()));
    assert!(record.last_touched >= first_touch);
    assert_eq!(record.last_updated, None);
}

#[tokio::test]
async fn no_cache_always_reaches_provider() {
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.5"]);
    let mut manager = facade(&provider, None);

    // Same address twice: nothing to change, but the provider is still asked
    assert!(!manager.update_host("foo", "10.0.0.5").await.unwrap());
    assert!(!manager.update_host("foo", "10.0.0.5").await.unwrap());
    assert!(manager.update_host("foo", "10.0.0.6").await.unwrap());

    assert_eq!(provider.update_call_count(), 3);
    assert_eq!(provider.write_count(), 1);
}

#[tokio::test]
async fn malformed_ip_fails_without_mutation() {
    let cache = MockHostManager::new("cache").with_host("foo", &["10.0.0.1"]);
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.1"]);
    let mut manager = facade(&provider, Some(&cache));

    let err = tokio_test::assert_err!(manager.update_host("foo", "not-an-ip").await);

    assert!(matches!(err, Error::InvalidIpAddress(ref ip) if ip == "not-an-ip"));
    assert_eq!(cache.write_count() + cache.touch_count(), 0);
    assert_eq!(provider.update_call_count(), 0);

    let record = cache.host("foo").unwrap();
    assert_eq!(record.ipv4_address, Some("10.0.0.1".parse().unwrap()));
    assert_eq!(record.last_touched, None, "Not even a heartbeat");
}

#[tokio::test]
async fn malformed_ip_fails_without_cache() {
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.1"]);
    let mut manager = facade(&provider, None);

    let err = manager.update_host("foo", "not-an-ip").await.unwrap_err();

    assert!(matches!(err, Error::InvalidIpAddress(_)));
    assert_eq!(provider.write_count(), 0);
}

#[tokio::test]
async fn unknown_host_is_invalid() {
    let cache = MockHostManager::new("cache");
    let provider = MockHostManager::new("provider");
    let mut manager = facade(&provider, Some(&cache));

    let err = manager.update_host("ghost", "10.0.0.5").await.unwrap_err();
    assert!(matches!(err, Error::InvalidHost(ref host) if host == "ghost"));
    assert_eq!(provider.update_call_count(), 0, "Cache error stops the flow");

    let mut manager = facade(&provider, None);
    let err = manager.update_host("ghost", "10.0.0.5").await.unwrap_err();
    assert!(matches!(err, Error::InvalidHost(_)));
}

#[tokio::test]
async fn address_family_dispatch_leaves_other_family_untouched() {
    let cache = MockHostManager::new("cache").with_host("foo", &["10.0.0.1", "2001:db8::1"]);
    let provider = MockHostManager::new("provider").with_host("foo", &["10.0.0.1", "2001:db8::1"]);
    let mut manager = facade(&provider, Some(&cache));

    assert!(manager.update_host("foo", "2001:db8::2").await.unwrap());

    for backend in [&cache, &provider] {
        let record = backend.host("foo").unwrap();
        assert_eq!(record.ipv4_address, Some("10.0.0.1".parse().unwrap()));
        assert_eq!(record.ipv6_address, Some("2001:db8::2".parse().unwrap()));
    }

    assert!(manager.update_host("foo", "10.0.0.9").await.unwrap());
    let record = provider.host("foo").unwrap();
    assert_eq!(record.ipv4_address, Some("10.0.0.9".parse().unwrap()));
    assert_eq!(record.ipv6_address, Some("2001:db8::2".parse().unwrap()));
}

#[tokio::test]
async fn execution_time_sums_configured_backends() {
    let cache = MockHostManager::new("cache").with_reported_time(Duration::from_millis(3));
    let provider = MockHostManager::new("provider").with_reported_time(Duration::from_millis(250));

    assert_eq!(
        facade(&provider, Some(&cache)).execution_time(),
        Duration::from_millis(253)
    );
    assert_eq!(
        facade(&provider, None).execution_time(),
        Duration::from_millis(250)
    );
}
