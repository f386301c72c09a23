use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::note::DEFAULT_CATEGORY;

/// Configuration from quill.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookConfig {
    #[serde(default)]
    pub notebook: NotebookInfo,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotebookInfo {
    #[serde(default)]
    pub name: String,
}

/// Server connection. Both `url` and `session` must be set for the
/// notebook to run in authenticated mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub url: Option<String>,
    /// Session cookie, sent verbatim in the `Cookie` header
    #[serde(default)]
    pub session: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        RemoteConfig {
            url: None,
            session: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl RemoteConfig {
    pub fn is_authenticated(&self) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.url) && set(&self.session)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Category preselected in the creation form
    #[serde(default = "default_category")]
    pub default_category: String,
    /// Categories offered by the form (cycled with ←/→)
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            default_category: default_category(),
            categories: default_categories(),
            colors: HashMap::new(),
        }
    }
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_categories() -> Vec<String> {
    ["Miscellaneous", "Personal", "Work", "Ideas", "Shopping"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}
