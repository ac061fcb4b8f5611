//! Article count sources.

pub mod eutils;

pub use eutils::EUtilsCounter;

use async_trait::async_trait;
use litscan_common::error::RequestError;

/// Anything that can report how many articles match a search query.
///
/// Takes `&mut self`: implementations own pacing state and are driven one
/// query at a time.
#[async_trait]
pub trait CountSource: Send {
    async fn search_count(&mut self, query: &str) -> Result<u64, RequestError>;
}
