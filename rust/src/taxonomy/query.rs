//! Search text plus per-facet selections

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::catalog::TaxonomyEntry;
use crate::error::TaxonomyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Focus,
    Driver,
    UserJourney,
    Scope,
    Platform,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::Focus,
        Facet::Driver,
        Facet::UserJourney,
        Facet::Scope,
        Facet::Platform,
    ];

    /// Query-string key, same as the serde name
    pub fn key(&self) -> &'static str {
        match self {
            Facet::Focus => "focus",
            Facet::Driver => "driver",
            Facet::UserJourney => "userJourney",
            Facet::Scope => "scope",
            Facet::Platform => "platform",
        }
    }

    pub fn from_key(key: &str) -> Option<Facet> {
        Facet::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Facet::Focus => "Focus",
            Facet::Driver => "Driver",
            Facet::UserJourney => "User Journey",
            Facet::Scope => "Scope",
            Facet::Platform => "Platform",
        }
    }
}

impl std::fmt::Display for Facet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// An empty query matches every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyQuery {
    pub search: String,
    pub filters: BTreeMap<Facet, BTreeSet<String>>,
}

impl TaxonomyQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_filter(mut self, facet: Facet, value: impl Into<String>) -> Self {
        self.toggle(facet, value, true);
        self
    }

    /// Select (`checked`) or deselect a facet value
    pub fn toggle(&mut self, facet: Facet, value: impl Into<String>, checked: bool) {
        let value = value.into();
        if checked {
            self.filters.entry(facet).or_default().insert(value);
        } else if let Some(selected) = self.filters.get_mut(&facet) {
            selected.remove(&value);
            if selected.is_empty() {
                self.filters.remove(&facet);
            }
        }
    }

    /// Drop every facet selection; the search text is kept
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Back to the empty query: no search text, no selections
    pub fn clear_all(&mut self) {
        self.search.clear();
        self.filters.clear();
    }

    pub fn active_filter_count(&self) -> usize {
        self.filters.values().map(BTreeSet::len).sum()
    }

    pub fn selected(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.filters.get(&facet).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, entry: &TaxonomyEntry) -> bool {
        self.matches_search(entry)
            && Facet::ALL.into_iter().all(|facet| match self.selected(facet) {
                None => true,
                Some(selected) => entry
                    .facet_values(facet)
                    .iter()
                    .any(|value| selected.contains(*value)),
            })
    }

    fn matches_search(&self, entry: &TaxonomyEntry) -> bool {
        if self.search.is_empty() {
            return true;
        }
        let needle = self.search.to_lowercase();
        entry
            .searchable_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Build from decoded query-string pairs: `q` for search text, facet keys
    /// repeated once per selected value.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut query = Self::new();
        for (key, value) in pairs {
            let key = key.as_ref();
            if key == "q" {
                query.search = value.into();
                continue;
            }
            let facet =
                Facet::from_key(key).ok_or_else(|| TaxonomyError::UnknownFacet(key.to_string()))?;
            let value: String = value.into();
            if !value.is_empty() {
                query.toggle(facet, value, true);
            }
        }
        Ok(query)
    }
}
