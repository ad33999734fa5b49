//! QueryPlan — the mapping from collections to the queries issued against them

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Mapping from collection name to 1-2 query strings. Uses a `BTreeMap` so
/// iteration order (and therefore `collections_searched`) is deterministic,
/// which the idempotence and stable-ordering properties (spec §8 P4, P9)
/// depend on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryPlan(pub BTreeMap<String, Vec<String>>);

impl QueryPlan {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, collection: impl Into<String>, queries: Vec<String>) {
        self.0.insert(collection.into(), queries);
    }

    pub fn collections(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.0.iter()
    }

    /// Restrict the plan to the given collection names, dropping all others
    /// (spec §4.8 step 4).
    pub fn restrict_to(&self, allowed: &[String]) -> Self {
        let allowed: std::collections::HashSet<&str> =
            allowed.iter().map(|s| s.as_str()).collect();
        Self(
            self.0
                .iter()
                .filter(|(k, _)| allowed.contains(k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        )
    }
}
