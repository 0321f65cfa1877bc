//! Artifact and project configuration types shared with the tracker API.

use serde::{Deserialize, Serialize};

/// A tracked work item as returned by `GET /artifacts`.
///
/// The filter core only reads these; all mutation goes through the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub artifact_id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub flagged: bool,
    #[serde(default)]
    pub iteration: Option<String>,
}

/// One entry of a configured enumeration (work-item type or status).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enumeration {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

/// Startup configuration feed (`GET /config`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub work_item_types: Vec<Enumeration>,
    #[serde(default)]
    pub artifact_statuses: Vec<Enumeration>,
}

impl ProjectConfig {
    /// Option ids for the filter backed by `filter_type`, if the feed covers it.
    pub fn options_for(&self, filter_type: &str) -> Option<Vec<String>> {
        let entries = match filter_type {
            "type" => &self.work_item_types,
            "status" => &self.artifact_statuses,
            _ => return None,
        };
        Some(entries.iter().map(|entry| entry.id.clone()).collect())
    }
}
