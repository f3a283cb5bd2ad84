//! The loaded country boundary collection.

use std::sync::Arc;

use crate::error::Result;
use crate::types::{CountryFeature, LatLng};

/// Queries shorter than this never match anything.
pub const MIN_QUERY_CHARS: usize = 3;

/// Holds the country features and answers lookups against them.
///
/// The store has a single writer (the boundary loader). Everything else reads
/// shared `Arc` handles, which stay valid after a reload.
#[derive(Debug, Clone, Default)]
pub struct FeatureStore {
    features: Vec<Arc<CountryFeature>>,
    /// Incremented on every successful load.
    revision: u64,
}

impl FeatureStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `features`.
    #[must_use]
    pub fn from_features(features: Vec<CountryFeature>) -> Self {
        let mut store = Self::new();
        store.replace(features);
        store
    }

    /// Apply the outcome of a boundary load.
    ///
    /// A failure is logged and leaves the current contents untouched.
    /// Returns whether the contents changed.
    pub fn apply_load(&mut self, result: Result<Vec<CountryFeature>>) -> bool {
        match result {
            Ok(features) => {
                tracing::info!(count = features.len(), "loaded country boundaries");
                self.replace(features);
                true
            }
            Err(e) => {
                tracing::error!("Failed to load country boundaries: {}", e);
                false
            }
        }
    }

    fn replace(&mut self, features: Vec<CountryFeature>) {
        self.features = features.into_iter().map(Arc::new).collect();
        self.revision += 1;
    }

    #[must_use]
    pub fn features(&self) -> &[Arc<CountryFeature>] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of successful loads so far.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Look up a feature by ISO A2 code.
    #[must_use]
    pub fn get(&self, iso_a2: &str) -> Option<&Arc<CountryFeature>> {
        self.features.iter().find(|f| f.iso_a2 == iso_a2)
    }

    /// Map a feature handed back by the renderer onto the store's own handle.
    ///
    /// Pointer identity is tried first so that features sharing a placeholder
    /// ISO code still resolve to themselves.
    #[must_use]
    pub fn resolve(&self, feature: &Arc<CountryFeature>) -> Option<Arc<CountryFeature>> {
        self.features
            .iter()
            .find(|f| Arc::ptr_eq(f, feature))
            .or_else(|| self.get(&feature.iso_a2))
            .cloned()
    }

    /// The first feature whose outline contains `position`.
    #[must_use]
    pub fn feature_at(&self, position: LatLng) -> Option<&Arc<CountryFeature>> {
        self.features.iter().find(|f| f.contains(position))
    }

    /// Case-insensitive substring search over admin names.
    ///
    /// Results keep collection order. Queries with fewer than
    /// [`MIN_QUERY_CHARS`] characters return nothing.
    #[must_use]
    pub fn find_by_name_substring(&self, query: &str) -> Vec<Arc<CountryFeature>> {
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        self.features
            .iter()
            .filter(|f| f.admin.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testing::{country, three_countries};

    fn names(features: &[Arc<CountryFeature>]) -> Vec<&str> {
        features.iter().map(|f| f.admin.as_str()).collect()
    }

    #[test]
    fn test_find_by_name_substring() {
        let store = FeatureStore::from_features(three_countries());

        assert_eq!(names(&store.find_by_name_substring("Nig")), ["Nigeria"]);
        assert_eq!(names(&store.find_by_name_substring("nIgErIa")), ["Nigeria"]);
        assert_eq!(names(&store.find_by_name_substring("tes")), ["United States"]);
        assert!(store.find_by_name_substring("xyz").is_empty());
    }

    #[test]
    fn test_short_queries_match_nothing() {
        let store = FeatureStore::from_features(three_countries());
        assert!(store.find_by_name_substring("").is_empty());
        assert!(store.find_by_name_substring("N").is_empty());
        assert!(store.find_by_name_substring("Ni").is_empty());
    }

    #[test]
    fn test_results_keep_collection_order() {
        let store = FeatureStore::from_features(vec![
            country("NE", "Niger", None),
            country("NG", "Nigeria", None),
            country("NI", "Nicaragua", None),
        ]);
        assert_eq!(names(&store.find_by_name_substring("nig")), ["Niger", "Nigeria"]);
    }

    #[test]
    fn test_failed_load_keeps_previous_contents() {
        let mut store = FeatureStore::new();
        let changed = store.apply_load(Err(Error::HttpStatus {
            url: "http://localhost/custom-110-metre.geojson".to_string(),
            status: 500,
        }));
        assert!(!changed);
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);

        assert!(store.apply_load(Ok(three_countries())));
        assert_eq!(store.len(), 3);
        assert_eq!(store.revision(), 1);

        store.apply_load(Err(Error::Parse {
            context: "boundary collection",
            message: "eof".to_string(),
        }));
        assert_eq!(store.len(), 3);
        assert_eq!(store.revision(), 1);
    }

    #[test]
    fn test_resolve_prefers_pointer_identity() {
        let store = FeatureStore::from_features(vec![
            country("-99", "France", None),
            country("-99", "Norway", None),
        ]);
        let norway = Arc::clone(&store.features()[1]);
        let resolved = store.resolve(&norway).unwrap();
        assert_eq!(resolved.admin, "Norway");

        let foreign = Arc::new(country("-99", "Somaliland", None));
        assert_eq!(store.resolve(&foreign).unwrap().admin, "France");

        let unknown = Arc::new(country("ZZ", "Nowhere", None));
        assert!(store.resolve(&unknown).is_none());
    }

    #[test]
    fn test_feature_at() {
        let store = FeatureStore::from_features(three_countries());
        assert_eq!(
            store.feature_at(LatLng::new(40.0, -100.0)).unwrap().iso_a2,
            "US"
        );
        assert!(store.feature_at(LatLng::new(-60.0, 0.0)).is_none());
    }
}
