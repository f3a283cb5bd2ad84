//! Country name search.

use std::sync::Arc;

use crate::store::{FeatureStore, MIN_QUERY_CHARS};
use crate::types::CountryFeature;

/// The current query and its matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchIndex {
    query: String,
    results: Vec<Arc<CountryFeature>>,
}

impl SearchIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn results(&self) -> &[Arc<CountryFeature>] {
        &self.results
    }

    /// Replace the query and recompute the results against `store`.
    pub fn on_query_change(&mut self, query: impl Into<String>, store: &FeatureStore) {
        self.query = query.into();
        self.refresh(store);
    }

    /// Recompute the results for the current query.
    pub fn refresh(&mut self, store: &FeatureStore) {
        if self.query.chars().count() >= MIN_QUERY_CHARS {
            self.results = store.find_by_name_substring(&self.query);
        } else {
            self.results.clear();
        }
    }

    /// Empty both the query and the results.
    pub fn clear(&mut self) {
        self.query.clear();
        self.results.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::three_countries;
    use proptest::prelude::*;

    #[test]
    fn test_query_length_boundary() {
        let store = FeatureStore::from_features(three_countries());
        let mut search = SearchIndex::new();

        search.on_query_change("Ni", &store);
        assert_eq!(search.query(), "Ni");
        assert!(search.results().is_empty());

        search.on_query_change("Nig", &store);
        let names: Vec<_> = search.results().iter().map(|f| f.admin.as_str()).collect();
        assert_eq!(names, ["Nigeria"]);
    }

    #[test]
    fn test_shortening_query_clears_results() {
        let store = FeatureStore::from_features(three_countries());
        let mut search = SearchIndex::new();
        search.on_query_change("Lux", &store);
        assert_eq!(search.results().len(), 1);

        search.on_query_change("Lu", &store);
        assert!(search.results().is_empty());
    }

    #[test]
    fn test_refresh_against_new_store() {
        let mut search = SearchIndex::new();
        search.on_query_change("uni", &FeatureStore::new());
        assert!(search.results().is_empty());

        search.refresh(&FeatureStore::from_features(three_countries()));
        assert_eq!(search.results()[0].iso_a2, "US");
    }

    #[test]
    fn test_clear() {
        let store = FeatureStore::from_features(three_countries());
        let mut search = SearchIndex::new();
        search.on_query_change("Nigeria", &store);
        search.clear();
        assert_eq!(search, SearchIndex::new());
    }

    proptest! {
        #[test]
        fn short_queries_never_match(query in "\\PC{0,2}") {
            let store = FeatureStore::from_features(three_countries());
            let mut search = SearchIndex::new();
            search.on_query_change(query, &store);
            prop_assert!(search.results().is_empty());
        }
    }
}
