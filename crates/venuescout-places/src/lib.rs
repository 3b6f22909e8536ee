//! Outbound access to the places search service.
//!
//! Layers, from the network up: [`RequestScheduler`] bounds concurrency and
//! spaces request starts, [`fetch_json_with_retry`] retries transient
//! failures, [`PlacesGateway`] turns intents into searches and merges the
//! results, and [`PagedResultCache`] serves pages from a stored result set.

pub mod autocomplete;
pub mod client;
pub mod error;
mod geocode;
pub mod normalize;
pub mod paging;
pub mod retry;
pub mod scheduler;
pub mod search;
pub mod status;
pub mod types;

pub use autocomplete::AutocompleteSession;
pub use client::PlacesClient;
pub use error::PlacesError;
pub use normalize::{normalize_record, normalize_records, PhotoUrls};
pub use paging::{
    CachedResultSet, Page, PagedResultCache, VenueFeed, VenueSource, DEFAULT_FRESHNESS,
    DEFAULT_PAGE_SIZE,
};
pub use retry::{fetch_json_with_retry, RetryPolicy};
pub use scheduler::{RequestScheduler, SchedulerConfig};
pub use search::{dedupe_by_id, PlacesGateway, SearchResults};
pub use status::UpstreamStatus;
pub use types::Prediction;
