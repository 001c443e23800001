//! Keyword classifier for tagged entities.
//!
//! A phrase is a unit mention when its kind is an organization, location or
//! geo-political entity and its lowercase text contains one of the unit
//! keywords. Division mentions follow the same rule with the division
//! keywords. The two checks are independent, so a phrase can land in both
//! categories, one, or neither.

mod config;
mod types;

pub use config::ClassifierConfig;
pub use types::{EntityCategories, EntityKind, TaggedEntity};

/// Sorts tagged entities into unit and division mentions.
#[derive(Debug, Clone)]
pub struct Classifier {
    unit_keywords: Vec<String>,
    division_keywords: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

impl Classifier {
    /// Creates a classifier, normalizing keywords to lowercase.
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            unit_keywords: normalize(&config.unit_keywords),
            division_keywords: normalize(&config.division_keywords),
        }
    }

    /// Classifies entities, preserving discovery order and duplicates.
    pub fn classify(&self, entities: &[TaggedEntity]) -> EntityCategories {
        let mut categories = EntityCategories::default();

        for entity in entities {
            if !entity.kind.is_place_or_organization() {
                continue;
            }

            let lowered = entity.text.to_lowercase();
            if contains_any(&lowered, &self.unit_keywords) {
                categories.military_units.push(entity.text.clone());
            }
            if contains_any(&lowered, &self.division_keywords) {
                categories.political_divisions.push(entity.text.clone());
            }
        }

        categories
    }
}

fn normalize(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| haystack.contains(k.as_str()))
}
