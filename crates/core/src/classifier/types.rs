//! Types for the classifier module.

use serde::{Deserialize, Serialize};

/// Broad kind of a recognized named phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Location,
    GeoPolitical,
    Person,
    Misc,
    Other,
}

impl EntityKind {
    /// Maps an NER label (`ORG`, `LOC`, `GPE`, `PER`, ...) to a kind.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "ORG" | "ORGANIZATION" => Self::Organization,
            "LOC" | "LOCATION" => Self::Location,
            "GPE" => Self::GeoPolitical,
            "PER" | "PERSON" => Self::Person,
            "MISC" => Self::Misc,
            _ => Self::Other,
        }
    }

    /// Whether phrases of this kind are considered for classification.
    pub fn is_place_or_organization(&self) -> bool {
        matches!(
            self,
            Self::Organization | Self::Location | Self::GeoPolitical
        )
    }
}

/// A phrase found in the text, tagged with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedEntity {
    pub text: String,
    pub kind: EntityKind,
}

impl TaggedEntity {
    pub fn new(text: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Phrases sorted into the two categories, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCategories {
    /// Organizational or military unit mentions.
    pub military_units: Vec<String>,
    /// Administrative division and location mentions.
    pub political_divisions: Vec<String>,
}
