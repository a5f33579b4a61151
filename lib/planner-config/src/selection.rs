use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// How many levels of an operation's selection set are compiled. Composite
    /// fields on the last level are treated as leaves.
    ///
    /// Can also be set via the `PLANNER_MAX_DEPTH` environment variable.
    ///
    /// Default: 5.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Joins the name of an embedded object field with the names of its own fields,
    /// `meta.views` for the `views` field of an embedded `meta` object.
    ///
    /// Default: `.`.
    #[serde(default = "default_embedded_separator")]
    pub embedded_separator: String,

    /// Fields of a pagination envelope that hold the paginated items. Every other
    /// envelope field (totals, cursors) is resolved without touching storage.
    ///
    /// Default: `["data", "edges"]`.
    #[serde(default = "default_pagination_item_fields")]
    pub pagination_item_fields: Vec<String>,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            embedded_separator: default_embedded_separator(),
            pagination_item_fields: default_pagination_item_fields(),
        }
    }
}

fn default_max_depth() -> usize {
    5
}

fn default_embedded_separator() -> String {
    ".".to_string()
}

fn default_pagination_item_fields() -> Vec<String> {
    vec!["data".to_string(), "edges".to_string()]
}
