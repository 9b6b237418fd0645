use crate::schema::{Category, SupportClassification};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// How a category's classification was determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Set on the category itself
    Direct,
    /// Taken from the nearest classified ancestor
    Inherited,
    /// Nothing resolved; treated as other income
    Defaulted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedClassification {
    pub classification: SupportClassification,
    pub source: ResolutionSource,
}

impl ResolvedClassification {
    fn defaulted() -> Self {
        Self {
            classification: SupportClassification::OtherIncome,
            source: ResolutionSource::Defaulted,
        }
    }
}

/// Lookup table from category id to support classification.
#[derive(Debug, Clone, Default)]
pub struct CategoryIndex {
    categories: BTreeMap<String, Category>,
}

impl CategoryIndex {
    pub fn new(categories: &[Category]) -> Self {
        let categories = categories
            .iter()
            .map(|c| (c.id.clone(), c.clone()))
            .collect();
        Self { categories }
    }

    /// Resolves a category id, walking up the parent chain for categories that
    /// carry no classification of their own. Unknown ids, broken chains and
    /// cycles all fall back to other income.
    pub fn resolve(&self, category_id: Option<&str>) -> ResolvedClassification {
        let Some(start) = category_id.and_then(|id| self.categories.get(id)) else {
            return ResolvedClassification::defaulted();
        };

        if let Some(classification) = start.classification {
            return ResolvedClassification {
                classification,
                source: ResolutionSource::Direct,
            };
        }

        let mut visited = BTreeSet::new();
        visited.insert(start.id.as_str());
        let mut parent_id = start.parent_category_id.as_deref();

        while let Some(id) = parent_id {
            if !visited.insert(id) {
                break;
            }
            let Some(parent) = self.categories.get(id) else {
                break;
            };
            if let Some(classification) = parent.classification {
                return ResolvedClassification {
                    classification,
                    source: ResolutionSource::Inherited,
                };
            }
            parent_id = parent.parent_category_id.as_deref();
        }

        ResolvedClassification::defaulted()
    }

    /// Groups every known category under its resolved classification. Every
    /// classification has a group, empty or not.
    pub fn summary(&self) -> CategorySummary {
        let mut groups: BTreeMap<SupportClassification, Vec<CategoryEntry>> =
            SupportClassification::ALL
                .iter()
                .map(|classification| (*classification, Vec::new()))
                .collect();

        for category in self.categories.values() {
            let resolved = self.resolve(Some(&category.id));
            groups
                .entry(resolved.classification)
                .or_default()
                .push(CategoryEntry {
                    id: category.id.clone(),
                    name: category.name.clone(),
                    source: resolved.source,
                });
        }

        for entries in groups.values_mut() {
            entries.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        }

        CategorySummary { groups }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub id: String,
    pub name: String,
    pub source: ResolutionSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub groups: BTreeMap<SupportClassification, Vec<CategoryEntry>>,
}

impl CategorySummary {
    pub fn defaulted(&self) -> Vec<&CategoryEntry> {
        self.groups
            .values()
            .flatten()
            .filter(|e| e.source == ResolutionSource::Defaulted)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
