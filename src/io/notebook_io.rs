use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::NotebookConfig;

/// Name of the notebook directory
pub const NOTEBOOK_DIR: &str = "quill";
/// Name of the config file inside the notebook directory
pub const CONFIG_FILE: &str = "quill.toml";

/// Error type for notebook I/O operations
#[derive(Debug, thiserror::Error)]
pub enum NotebookError {
    #[error("not a quill notebook: no quill/ directory found (run `ql init`)")]
    NotANotebook,
    #[error("quill notebook already exists in {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse quill.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit quill.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
    #[error("could not encode notes: {0}")]
    EncodeError(#[from] serde_json::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Discover the notebook by walking up from the given directory,
/// looking for a `quill/` subdirectory with a config file.
pub fn discover_notebook(start: &Path) -> Result<PathBuf, NotebookError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(NOTEBOOK_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(NotebookError::NotANotebook);
        }
    }
}

/// Read and parse `quill/quill.toml` under `root`.
pub fn read_config(root: &Path) -> Result<NotebookConfig, NotebookError> {
    let dir = root.join(NOTEBOOK_DIR);
    if !dir.is_dir() {
        return Err(NotebookError::NotANotebook);
    }
    let path = dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| NotebookError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

const CONFIG_TEMPLATE: &str = r##"[notebook]
name = "{name}"

# --- Server sync ---
# Set both url and session (or run: ql login --server <url> --session <cookie>)
# to keep notes on the server instead of in notes.json.
[remote]
# url = "http://127.0.0.1:5000"
# session = "session=..."
timeout_secs = 30

# --- UI Customization ---
[ui]
default_category = "Miscellaneous"
categories = ["Miscellaneous", "Personal", "Work", "Ideas", "Shopping"]
#
# [ui.colors]
# background = "#101418"
# text = "#C8D0D8"
# highlight = "#F2A33A"
"##;

/// Render the initial config file.
pub fn render_config(name: &str) -> String {
    CONFIG_TEMPLATE.replace("{name}", &name.replace('"', "'"))
}

/// Create `quill/` under `root`. With `force`, an existing config is
/// rewritten but notes and state are left alone.
pub fn init_notebook(root: &Path, name: &str, force: bool) -> Result<PathBuf, NotebookError> {
    let dir = root.join(NOTEBOOK_DIR);
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() && !force {
        return Err(NotebookError::AlreadyExists(dir));
    }
    fs::create_dir_all(&dir)?;
    fs::write(&config_path, render_config(name)).map_err(|e| NotebookError::WriteError {
        path: config_path.clone(),
        source: e,
    })?;
    tracing::info!(path = %dir.display(), "initialized notebook");
    Ok(dir)
}

/// Infer a notebook name from a directory name: hyphens to spaces, title-case.
pub fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
