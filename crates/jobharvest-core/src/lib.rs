pub mod assembler;
pub mod classify;
pub mod config;
pub mod discovery;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod resolver;
pub mod retry;
pub mod text;
pub mod throttle;
pub mod traits;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use config::HarvestConfig;
pub use error::AppError;
pub use models::{DetailRef, ListingRef, NormalizedRecord, RawDetail, SearchSegment};
pub use pipeline::{Harvest, HarvestService, RunReport};
pub use traits::{Exporter, FetchResponse, Fetcher, MarkupParser};
