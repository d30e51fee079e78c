//! Typed catalog records.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata for a single font family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMetadata {
    /// Canonical display name; unique across the catalog.
    pub family: String,
    /// Classification such as `serif` or `sans-serif`.
    #[serde(default)]
    pub category: String,
    /// Supported character subsets.
    #[serde(default)]
    pub subsets: Vec<String>,
    /// Variant tokens as spelled by the catalog.
    #[serde(default)]
    pub variants: Vec<String>,
    /// Variant token to font binary URL.
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    /// Catalog version string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Date of the last upstream change, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    /// Lazily fetched fields; `None` until the second request has been made.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplementary: Option<Supplementary>,
}

/// Per-family fields that need an extra request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplementary {
    /// Designer names.
    pub designers: Vec<String>,
    /// License shorthand code (`ofl`, `apache2`, `ufl`).
    pub license: String,
    /// Variable font axes.
    pub axes: Vec<Axis>,
}

/// A variable font axis range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    /// Four-letter axis tag.
    pub tag: String,
    /// Minimum value.
    pub min: f64,
    /// Maximum value.
    pub max: f64,
}

/// A non-font file shipped with a family download.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestFile {
    /// File name inside the family directory.
    pub filename: String,
    /// Text contents.
    pub contents: String,
}

impl FamilyMetadata {
    /// Parse `last_modified` as a UTC timestamp.
    ///
    /// Accepts plain dates (midnight UTC) and RFC 3339 timestamps.
    pub fn last_modified_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.last_modified.as_deref()?;
        if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
            return Some(stamp.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive: NaiveDateTime| naive.and_utc())
    }
}

impl Axis {
    /// Render as `@tag=min>max`.
    pub fn display(&self) -> String {
        format!("@{}={}>{}", self.tag, self.min, self.max)
    }
}

/// Human readable name for a license shorthand code.
pub fn license_name(code: &str) -> &str {
    match code {
        "ofl" => "SIL Open Font License, 1.1",
        "apache2" => "Apache License, Version 2.0",
        "ufl" => "Ubuntu Font License, 1.0",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_catalog_record() {
        let json = r#"{
            "family": "Roboto",
            "category": "sans-serif",
            "subsets": ["latin"],
            "variants": ["regular", "700"],
            "files": {"regular": "https://x/r.ttf", "700": "https://x/b.ttf"},
            "version": "v30",
            "lastModified": "2022-09-22",
            "kind": "webfonts#webfont",
            "menu": "https://x/menu"
        }"#;
        let metadata: FamilyMetadata = serde_json::from_str(json).expect("parse");
        assert_eq!(metadata.family, "Roboto");
        assert_eq!(metadata.files.len(), 2);
        assert!(metadata.supplementary.is_none());
        let stamp = metadata.last_modified_at().expect("date");
        assert_eq!(stamp.to_rfc3339(), "2022-09-22T00:00:00+00:00");
    }

    #[test]
    fn formats_axis_and_license() {
        let axis = Axis {
            tag: "wght".to_string(),
            min: 100.0,
            max: 900.0,
        };
        assert_eq!(axis.display(), "@wght=100>900");
        assert_eq!(license_name("ofl"), "SIL Open Font License, 1.1");
        assert_eq!(license_name("custom"), "custom");
    }
}
