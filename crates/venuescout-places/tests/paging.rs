//! Integration tests for `PagedResultCache` and `VenueFeed`.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use venuescout_core::{
    primary_type_for, CategoryCatalog, GeoPoint, OpenState, SearchIntent, Venue,
};
use venuescout_places::{
    PagedResultCache, PlacesClient, PlacesError, PlacesGateway, RetryPolicy, SchedulerConfig,
    SearchResults, VenueFeed, VenueSource,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct CountingSource {
    calls: AtomicUsize,
    total: usize,
    fail_first: bool,
}

impl CountingSource {
    fn new(total: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            total,
            fail_first: false,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl VenueSource for CountingSource {
    fn search(
        &self,
        _intent: &SearchIntent,
    ) -> impl Future<Output = Result<SearchResults, PlacesError>> + Send {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let total = self.total;
        let fail = self.fail_first && call == 0;
        async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            if fail {
                return Err(PlacesError::Timeout { timeout_ms: 5 });
            }
            Ok(SearchResults {
                venues: (0..total).map(venue).collect(),
                center: Some(GeoPoint { lat: 1.0, lng: 2.0 }),
                failed_categories: vec![],
            })
        }
    }
}

fn venue(i: usize) -> Venue {
    Venue {
        id: format!("v{i}"),
        name: format!("Venue {i}"),
        address: "addr".into(),
        location: GeoPoint { lat: 0.0, lng: 0.0 },
        rating: None,
        types: vec!["gym".into()],
        photo_url: None,
        open_state: OpenState::Unknown,
        price_level: None,
        primary_type: primary_type_for(&["gym".to_string()]),
    }
}

fn intent() -> SearchIntent {
    SearchIntent::new().with_query("gym")
}

#[tokio::test]
async fn repeated_page_request_hits_source_once() {
    let cache = PagedResultCache::new(CountingSource::new(30));
    let intent = intent();
    let fp = intent.fingerprint();

    let a = cache.get_page(&fp, &intent, 0, 20).await.unwrap();
    let b = cache.get_page(&fp, &intent, 0, 20).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(cache.source().calls(), 1);
    assert!(cache.contains(&fp));
}

#[tokio::test]
async fn pages_concatenate_to_full_result_set() {
    let cache = PagedResultCache::new(CountingSource::new(45));
    let intent = intent();
    let fp = intent.fingerprint();

    let mut ids = Vec::new();
    let mut offset = Some(0);
    let mut pages = 0;
    while let Some(o) = offset {
        let page = cache.get_page(&fp, &intent, o, 20).await.unwrap();
        pages += 1;
        assert_eq!(page.has_more, page.next_offset.is_some());
        ids.extend(page.items.into_iter().map(|v| v.id));
        offset = page.next_offset;
    }

    assert_eq!(pages, 3);
    let expected: Vec<String> = (0..45).map(|i| format!("v{i}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn concurrent_misses_share_one_search() {
    let cache = PagedResultCache::new(CountingSource::new(5));
    let intent = intent();
    let fp = intent.fingerprint();

    let (a, b) = tokio::join!(
        cache.get_page(&fp, &intent, 0, 20),
        cache.get_page(&fp, &intent, 0, 20)
    );
    assert_eq!(a.unwrap().items.len(), 5);
    assert_eq!(b.unwrap().items.len(), 5);
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn evict_forces_a_new_search() {
    let cache = PagedResultCache::new(CountingSource::new(3));
    let intent = intent();
    let fp = intent.fingerprint();

    cache.get_page(&fp, &intent, 0, 20).await.unwrap();
    assert!(cache.evict(&fp));
    assert!(!cache.evict(&fp));
    assert!(cache.is_empty());

    cache.get_page(&fp, &intent, 0, 20).await.unwrap();
    assert_eq!(cache.source().calls(), 2);
}

#[tokio::test]
async fn failed_search_is_not_cached() {
    let source = CountingSource {
        fail_first: true,
        ..CountingSource::new(2)
    };
    let cache = PagedResultCache::new(source);
    let intent = intent();
    let fp = intent.fingerprint();

    let err = cache.get_page(&fp, &intent, 0, 20).await.unwrap_err();
    assert!(matches!(err, PlacesError::Timeout { .. }));
    assert!(!cache.contains(&fp));

    let page = cache.get_page(&fp, &intent, 0, 20).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert_eq!(cache.source().calls(), 2);
}

#[tokio::test]
async fn fingerprints_equal_across_category_order_share_entry() {
    let cache = PagedResultCache::new(CountingSource::new(4));
    let a = SearchIntent::new().with_types(["stadium", "gym"]);
    let b = SearchIntent::new().with_types(["gym", "stadium"]);

    cache.get_page(&a.fingerprint(), &a, 0, 20).await.unwrap();
    cache.get_page(&b.fingerprint(), &b, 0, 20).await.unwrap();
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn feed_walks_pages_and_evicts_on_drop() {
    let cache = Arc::new(PagedResultCache::new(CountingSource::new(25)));
    let fp;
    {
        let mut feed = VenueFeed::new(Arc::clone(&cache), intent(), 10, Duration::from_secs(30));
        fp = feed.fingerprint().clone();
        assert!(fp.bucket().is_some());

        let mut seen = 0;
        while let Some(page) = feed.next_page().await.unwrap() {
            seen += page.items.len();
            assert_eq!(page.center, Some(GeoPoint { lat: 1.0, lng: 2.0 }));
        }
        assert_eq!(seen, 25);
        assert!(!feed.has_more());
        assert!(feed.next_page().await.unwrap().is_none());
        assert!(cache.contains(&fp));
    }
    assert!(!cache.contains(&fp));
    assert_eq!(cache.source().calls(), 1);
}

#[tokio::test]
async fn feed_refresh_rewinds_and_refetches() {
    let cache = Arc::new(PagedResultCache::new(CountingSource::new(5)));
    let mut feed = VenueFeed::new(Arc::clone(&cache), intent(), 20, Duration::ZERO);
    assert!(feed.fingerprint().bucket().is_none());

    feed.next_page().await.unwrap();
    assert!(!feed.has_more());

    feed.refresh();
    assert!(feed.has_more());
    let page = feed.next_page().await.unwrap().unwrap();
    assert_eq!(page.items.len(), 5);
    assert_eq!(cache.source().calls(), 2);
}

#[tokio::test]
async fn gateway_backed_cache_searches_upstream_once() {
    let server = MockServer::start().await;

    let places: Vec<serde_json::Value> = (0..25)
        .map(|i| {
            json!({
                "id": format!("p{i}"),
                "displayName": { "text": format!("Place {i}") },
                "location": { "latitude": 10.0, "longitude": 20.0 },
                "types": ["gym"],
            })
        })
        .collect();

    Mock::given(method("POST"))
        .and(path("/v1/places:searchText"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "places": places })))
        .expect(1)
        .mount(&server)
        .await;

    let client = PlacesClient::with_base_urls("test-key", &server.uri(), &server.uri())
        .expect("client construction should not fail")
        .with_scheduler(SchedulerConfig {
            max_concurrency: 4,
            min_interval: Duration::ZERO,
            timeout: Duration::from_secs(5),
        })
        .with_retry_policy(RetryPolicy {
            max_attempts: 1,
            backoff_base: Duration::from_millis(1),
        });
    let gateway = PlacesGateway::new(Arc::new(client), Arc::new(CategoryCatalog::default()));
    let cache = PagedResultCache::new(gateway);

    let intent = SearchIntent::new().with_center(GeoPoint { lat: 10.0, lng: 20.0 });
    let fp = intent.fingerprint();

    let first = cache.get_page(&fp, &intent, 0, 20).await.unwrap();
    let second = cache.get_page(&fp, &intent, 20, 20).await.unwrap();

    assert_eq!(first.items.len(), 20);
    assert!(first.has_more);
    assert_eq!(second.items.len(), 5);
    assert!(!second.has_more);
    assert_eq!(second.total, 25);
}
