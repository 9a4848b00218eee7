//! Taxonomy entries and the immutable catalog that holds them

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::query::{Facet, TaxonomyQuery};
use super::references::{parse_references, Reference};
use crate::error::TaxonomyError;

const BUILTIN_TAXONOMY: &str = include_str!("../../config/taxonomy.yaml");

/// One published intervention. A richer shape than a contribution row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyEntry {
    #[serde(rename = "type")]
    pub intervention_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub focus: String,
    #[serde(default)]
    pub driver: String,
    #[serde(default)]
    pub user_journey: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub considerations: String,
    #[serde(default)]
    pub tradeoffs: String,
    /// Comma-separated platform names
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub intention: String,
    /// Comma-separated URLs
    #[serde(default)]
    pub references: String,
}

impl TaxonomyEntry {
    pub fn platforms(&self) -> impl Iterator<Item = &str> {
        self.platform
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Trimmed values this entry contributes to a facet; empty when unset
    pub fn facet_values(&self, facet: Facet) -> Vec<&str> {
        fn single(value: &str) -> Vec<&str> {
            let value = value.trim();
            if value.is_empty() {
                Vec::new()
            } else {
                vec![value]
            }
        }

        match facet {
            Facet::Focus => single(&self.focus),
            Facet::Driver => single(&self.driver),
            Facet::UserJourney => single(&self.user_journey),
            Facet::Scope => single(&self.scope),
            Facet::Platform => self.platforms().collect(),
        }
    }

    /// Text fields covered by free-text search
    pub fn searchable_fields(&self) -> [&str; 4] {
        [
            &self.intervention_type,
            &self.description,
            &self.considerations,
            &self.tradeoffs,
        ]
    }

    pub fn reference_list(&self) -> Vec<Reference> {
        parse_references(&self.references)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyCatalog {
    entries: Vec<TaxonomyEntry>,
}

impl TaxonomyCatalog {
    /// The taxonomy compiled into the binary
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::from_yaml_str(BUILTIN_TAXONOMY)
    }

    pub fn load(path: &Path) -> Result<Self, TaxonomyError> {
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_yaml_str(&text)?;
        tracing::info!(path = %path.display(), entries = catalog.len(), "loaded taxonomy");
        Ok(catalog)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, TaxonomyError> {
        let entries: Vec<TaxonomyEntry> = serde_yaml::from_str(text)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<TaxonomyEntry>) -> Result<Self, TaxonomyError> {
        if let Some(index) = entries
            .iter()
            .position(|e| e.intervention_type.trim().is_empty())
        {
            return Err(TaxonomyError::EmptyType { index });
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[TaxonomyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries matching the query, in catalog order
    pub fn filter(&self, query: &TaxonomyQuery) -> Vec<&TaxonomyEntry> {
        self.entries.iter().filter(|e| query.matches(e)).collect()
    }

    /// Sorted distinct values per facet, platform lists split per name
    pub fn facet_options(&self) -> BTreeMap<Facet, Vec<String>> {
        Facet::ALL
            .into_iter()
            .map(|facet| {
                let values: BTreeSet<&str> = self
                    .entries
                    .iter()
                    .flat_map(|e| e.facet_values(facet))
                    .collect();
                (facet, values.into_iter().map(str::to_string).collect())
            })
            .collect()
    }
}
