//! Fingerprint-keyed result cache serving "load more" pages.
//!
//! The first page request for a fingerprint runs one upstream search and
//! stores the full ordered result set; every later page is a slice of it.
//! Entries live until evicted explicitly or by the owning [`VenueFeed`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::OnceCell;
use venuescout_core::{GeoPoint, SearchFingerprint, SearchIntent, Venue};

use crate::error::PlacesError;
use crate::search::{PlacesGateway, SearchResults};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_FRESHNESS: Duration = Duration::from_secs(30);

/// Anything that can run a full search for an intent.
pub trait VenueSource: Send + Sync {
    fn search(
        &self,
        intent: &SearchIntent,
    ) -> impl Future<Output = Result<SearchResults, PlacesError>> + Send;
}

impl VenueSource for PlacesGateway {
    fn search(
        &self,
        intent: &SearchIntent,
    ) -> impl Future<Output = Result<SearchResults, PlacesError>> + Send {
        PlacesGateway::search(self, intent)
    }
}

/// One slice of a cached result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub items: Vec<Venue>,
    pub has_more: bool,
    pub next_offset: Option<usize>,
    pub center: Option<GeoPoint>,
    pub failed_categories: Vec<String>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedResultSet {
    pub venues: Vec<Venue>,
    pub center: Option<GeoPoint>,
    pub failed_categories: Vec<String>,
}

impl From<SearchResults> for CachedResultSet {
    fn from(results: SearchResults) -> Self {
        Self {
            venues: results.venues,
            center: results.center,
            failed_categories: results.failed_categories,
        }
    }
}

impl CachedResultSet {
    #[must_use]
    pub fn page(&self, offset: usize, page_size: usize) -> Page {
        let page_size = page_size.max(1);
        let len = self.venues.len();
        let end = offset.saturating_add(page_size);
        let has_more = end < len;
        let items = self.venues[offset.min(len)..end.min(len)].to_vec();

        Page {
            items,
            has_more,
            next_offset: has_more.then_some(end),
            center: self.center,
            failed_categories: self.failed_categories.clone(),
            total: len,
        }
    }
}

type Slot = Arc<OnceCell<Arc<CachedResultSet>>>;

/// Result sets keyed by [`SearchFingerprint`].
///
/// Construct once, share behind an `Arc`. Concurrent first requests for the
/// same fingerprint share a single upstream search. Failed searches are not
/// cached.
pub struct PagedResultCache<S> {
    source: S,
    entries: Mutex<HashMap<SearchFingerprint, Slot>>,
}

impl<S: VenueSource> PagedResultCache<S> {
    #[must_use]
    pub fn new(source: S) -> Self {
        Self {
            source,
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns `page_size` venues starting at `offset`.
    ///
    /// # Errors
    ///
    /// Returns the source's error on a cache miss whose search fails.
    pub async fn get_page(
        &self,
        fingerprint: &SearchFingerprint,
        intent: &SearchIntent,
        offset: usize,
        page_size: usize,
    ) -> Result<Page, PlacesError> {
        let slot = self.slot(fingerprint);
        let results = slot
            .get_or_try_init(|| async {
                tracing::debug!(fingerprint = %fingerprint, "result cache miss");
                let results = self.source.search(intent).await?;
                Ok::<_, PlacesError>(Arc::new(CachedResultSet::from(results)))
            })
            .await?;
        Ok(results.page(offset, page_size))
    }

    /// Drops the entry for `fingerprint`. Returns whether one existed.
    pub fn evict(&self, fingerprint: &SearchFingerprint) -> bool {
        let removed = self.lock().remove(fingerprint).is_some();
        if removed {
            tracing::debug!(fingerprint = %fingerprint, "result cache entry evicted");
        }
        removed
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Whether a completed result set is stored for `fingerprint`.
    #[must_use]
    pub fn contains(&self, fingerprint: &SearchFingerprint) -> bool {
        self.lock()
            .get(fingerprint)
            .is_some_and(|slot| slot.initialized())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.initialized()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, fingerprint: &SearchFingerprint) -> Slot {
        Arc::clone(
            self.lock()
                .entry(fingerprint.clone())
                .or_insert_with(|| Arc::new(OnceCell::new())),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SearchFingerprint, Slot>> {
        // The map is only mutated by single non-panicking calls.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A paginated view of one intent, scoped to its owner's lifetime.
///
/// Dropping the feed evicts its cache entry.
pub struct VenueFeed<S: VenueSource> {
    cache: Arc<PagedResultCache<S>>,
    intent: SearchIntent,
    fingerprint: SearchFingerprint,
    page_size: usize,
    next_offset: Option<usize>,
}

impl<S: VenueSource> VenueFeed<S> {
    /// Starts a feed whose cache key rolls over every `freshness` window.
    ///
    /// A zero window disables time bucketing.
    #[must_use]
    pub fn new(
        cache: Arc<PagedResultCache<S>>,
        intent: SearchIntent,
        page_size: usize,
        freshness: Duration,
    ) -> Self {
        let mut fingerprint = intent.fingerprint();
        if let Some(bucket) = freshness_bucket(chrono::Utc::now(), freshness) {
            fingerprint = fingerprint.with_freshness_bucket(bucket);
        }
        Self::with_fingerprint(cache, intent, fingerprint, page_size)
    }

    #[must_use]
    pub fn with_fingerprint(
        cache: Arc<PagedResultCache<S>>,
        intent: SearchIntent,
        fingerprint: SearchFingerprint,
        page_size: usize,
    ) -> Self {
        Self {
            cache,
            intent,
            fingerprint,
            page_size: page_size.max(1),
            next_offset: Some(0),
        }
    }

    #[must_use]
    pub fn fingerprint(&self) -> &SearchFingerprint {
        &self.fingerprint
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_offset.is_some()
    }

    /// Fetches the next page, or `None` once the last page was returned.
    ///
    /// # Errors
    ///
    /// Returns the source's error; the feed position is unchanged.
    pub async fn next_page(&mut self) -> Result<Option<Page>, PlacesError> {
        let Some(offset) = self.next_offset else {
            return Ok(None);
        };
        let page = self
            .cache
            .get_page(&self.fingerprint, &self.intent, offset, self.page_size)
            .await?;
        self.next_offset = page.next_offset;
        Ok(Some(page))
    }

    /// Discards cached results and rewinds to the first page.
    pub fn refresh(&mut self) {
        self.cache.evict(&self.fingerprint);
        self.next_offset = Some(0);
    }
}

impl<S: VenueSource> Drop for VenueFeed<S> {
    fn drop(&mut self) {
        self.cache.evict(&self.fingerprint);
    }
}

fn freshness_bucket(now: chrono::DateTime<chrono::Utc>, window: Duration) -> Option<u64> {
    let window_secs = window.as_secs();
    if window_secs == 0 {
        return None;
    }
    let now_secs = u64::try_from(now.timestamp()).unwrap_or(0);
    Some(now_secs / window_secs)
}
