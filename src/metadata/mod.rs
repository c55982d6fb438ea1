//! Metadata lookups used to fill in year, genre and rating for a title.

pub mod omdb;

pub use omdb::OmdbClient;

use crate::catalog::MovieRecord;
use crate::error::Result;

/// Fields a provider can fill in. Any of them may be unknown.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FetchedMetadata {
    /// Canonical title as spelled by the provider.
    pub title: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
}

impl FetchedMetadata {
    /// Overwrite the enrichable fields of `record`. Title and watched flag are kept.
    pub fn apply_to(&self, record: &mut MovieRecord) {
        record.year = self.year;
        record.genre = self.genre.clone();
        record.rating = self.rating;
    }
}

/// One synchronous lookup per call; no retries or caching.
pub trait MetadataSource: Send + Sync {
    fn fetch_by_title(&self, title: &str) -> Result<FetchedMetadata>;
}
