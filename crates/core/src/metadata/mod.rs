//! Metadata derived from a document's location in the archive.
//!
//! Everything here is string manipulation on the path; no file is opened.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// `DD-MM-YYYY` anywhere in the file name.
static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}-\d{2}-\d{4}").expect("date pattern is valid"));

const DATE_FORMAT: &str = "%d-%m-%Y";

/// Structured metadata for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Final path component.
    pub file_name: String,
    /// Name of the directory holding the file (the publication or archive box).
    pub source_group: String,
    /// Publication date parsed from the file name, if present.
    pub publication_date: Option<NaiveDate>,
}

impl DocumentMetadata {
    /// Derives metadata from a path.
    pub fn from_path(path: &Path) -> Self {
        let file_name = file_name_of(path);
        let source_group = source_group_of(path);
        let publication_date = extract_publication_date(&file_name);

        Self {
            file_name,
            source_group,
            publication_date,
        }
    }
}

/// Returns the final path component, lossily converted.
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Returns the name of the parent directory, or an empty string at the root.
pub fn source_group_of(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Finds the first `DD-MM-YYYY` token in `file_name` that is a real calendar date.
///
/// Tokens such as `31-02-2021` match the pattern but are skipped; a name with
/// no valid token yields `None`. Candidates may overlap, so the search resumes
/// one position after each rejected match.
pub fn extract_publication_date(file_name: &str) -> Option<NaiveDate> {
    let mut start = 0;
    while let Some(m) = DATE_TOKEN.find_at(file_name, start) {
        if let Ok(date) = NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT) {
            return Some(date);
        }
        // Matches begin with an ASCII digit, so the next byte is a char boundary.
        start = m.start() + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_date_in_middle_of_name() {
        assert_eq!(
            extract_publication_date("report_15-03-2021_final.pdf"),
            NaiveDate::from_ymd_opt(2021, 3, 15)
        );
    }

    #[test]
    fn test_no_date_is_none() {
        assert_eq!(extract_publication_date("report_final.pdf"), None);
    }

    #[test]
    fn test_overlapping_token_after_invalid_one() {
        assert_eq!(
            extract_publication_date("32-01-2020-05-2021.pdf"),
            NaiveDate::from_ymd_opt(2021, 5, 20)
        );
    }

    #[test]
    fn test_invalid_calendar_date_is_none() {
        assert_eq!(extract_publication_date("edition_31-02-2021.pdf"), None);
    }

    #[test]
    fn test_skips_invalid_token_and_uses_next() {
        assert_eq!(
            extract_publication_date("scan_99-99-2020_reprint_01-12-1998.pdf"),
            NaiveDate::from_ymd_opt(1998, 12, 1)
        );
    }

    #[test]
    fn test_other_date_layouts_are_ignored() {
        assert_eq!(extract_publication_date("2021-03-15.pdf"), None);
        assert_eq!(extract_publication_date("15.03.2021.pdf"), None);
    }

    #[test]
    fn test_metadata_from_path() {
        let path = PathBuf::from("/archive/El Tiempo/el_tiempo_02-01-1995.pdf");
        let meta = DocumentMetadata::from_path(&path);

        assert_eq!(meta.file_name, "el_tiempo_02-01-1995.pdf");
        assert_eq!(meta.source_group, "El Tiempo");
        assert_eq!(meta.publication_date, NaiveDate::from_ymd_opt(1995, 1, 2));
    }

    #[test]
    fn test_metadata_without_parent() {
        let meta = DocumentMetadata::from_path(Path::new("loose.pdf"));
        assert_eq!(meta.file_name, "loose.pdf");
        assert_eq!(meta.source_group, "");
        assert!(meta.publication_date.is_none());
    }
}
