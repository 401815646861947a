// src/models/source.rs
// Log sources and saved views

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::query::TimeBound;

/// A configured log source, as far as the query controls care
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub kind: String,
    /// Columns shown when nothing else selects them
    #[serde(default, alias = "defaultChosenColumns")]
    pub default_chosen_columns: Vec<String>,
    /// Column used to group the histogram by default
    #[serde(default, alias = "severityColumn")]
    pub severity_column: Option<String>,
    #[serde(default, alias = "timeColumn")]
    pub time_column: Option<String>,
}

impl Source {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            ..Default::default()
        }
    }

    /// Default columns as a comma separated column list
    pub fn default_columns_expr(&self) -> String {
        self.default_chosen_columns.join(", ")
    }
}

/// Stored query/display settings of a saved view.
///
/// Every field is optional: older views predate some of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<TimeBound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<TimeBound>,
    #[serde(default, rename = "timeZone", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph_group_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_graph: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_columns: Option<IndexMap<String, String>>,
}

impl ViewData {
    /// The stored value for a context column, if any
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context_columns
            .as_ref()
            .and_then(|ctx| ctx.get(key))
            .map(String::as_str)
    }
}

/// A named, persisted preset of query settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedView {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub data: ViewData,
}
