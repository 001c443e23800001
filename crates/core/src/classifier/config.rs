//! Keyword configuration for the classifier.

use serde::{Deserialize, Serialize};

/// Keyword sets used for containment matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Terms that mark a military or organizational unit.
    #[serde(default = "default_unit_keywords")]
    pub unit_keywords: Vec<String>,

    /// Terms that mark an administrative division.
    #[serde(default = "default_division_keywords")]
    pub division_keywords: Vec<String>,
}

fn default_unit_keywords() -> Vec<String> {
    [
        "batallón",
        "batallon",
        "brigada",
        "escuadrón",
        "escuadron",
        "fuerza de tarea",
        "battalion",
        "brigade",
        "squadron",
        "task force",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_division_keywords() -> Vec<String> {
    [
        "departamento",
        "ciudad",
        "municipio",
        "corregimiento",
        "vereda",
        "department",
        "city",
        "municipality",
        "district",
        "hamlet",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            unit_keywords: default_unit_keywords(),
            division_keywords: default_division_keywords(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_keywords() {
        let config = ClassifierConfig::default();
        assert!(config.unit_keywords.contains(&"battalion".to_string()));
        assert!(config.unit_keywords.contains(&"fuerza de tarea".to_string()));
        assert!(config.division_keywords.contains(&"municipio".to_string()));
        assert!(config.division_keywords.contains(&"hamlet".to_string()));
    }

    #[test]
    fn test_partial_override() {
        let toml = r#"
            unit_keywords = ["regiment"]
        "#;
        let config: ClassifierConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.unit_keywords, vec!["regiment".to_string()]);
        assert!(config.division_keywords.contains(&"city".to_string()));
    }
}
