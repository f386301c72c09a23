use std::fs;
use std::path::Path;

use crate::io::notebook_io::{CONFIG_FILE, NotebookError};

/// Read quill.toml as a toml_edit document for format-preserving edits.
pub fn read_config_doc(notebook_dir: &Path) -> Result<toml_edit::DocumentMut, NotebookError> {
    let path = notebook_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|e| NotebookError::ReadError {
        path: path.clone(),
        source: e,
    })?;
    Ok(text.parse::<toml_edit::DocumentMut>()?)
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config_doc(
    notebook_dir: &Path,
    doc: &toml_edit::DocumentMut,
) -> Result<(), NotebookError> {
    let path = notebook_dir.join(CONFIG_FILE);
    fs::write(&path, doc.to_string()).map_err(|e| NotebookError::WriteError { path, source: e })
}

fn remote_table(doc: &mut toml_edit::DocumentMut) -> &mut toml_edit::Item {
    if !doc.contains_key("remote") {
        doc["remote"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    &mut doc["remote"]
}

/// Point the notebook at a server with a session cookie
pub fn set_remote(doc: &mut toml_edit::DocumentMut, url: &str, session: &str) {
    let remote = remote_table(doc);
    remote["url"] = toml_edit::value(url.trim_end_matches('/'));
    remote["session"] = toml_edit::value(session);
}

/// Forget the session cookie. The server URL stays for the next login.
pub fn clear_session(doc: &mut toml_edit::DocumentMut) -> bool {
    doc.get_mut("remote")
        .and_then(|item| item.as_table_like_mut())
        .map(|table| table.remove("session").is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::notebook_io::render_config;
    use crate::model::config::NotebookConfig;
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_preserves_text() {
        let tmp = TempDir::new().unwrap();
        let original = render_config("Round Trip");
        fs::write(tmp.path().join(CONFIG_FILE), &original).unwrap();

        let doc = read_config_doc(tmp.path()).unwrap();
        write_config_doc(tmp.path(), &doc).unwrap();

        let written = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(written, original);
    }

    #[test]
    fn test_set_remote_authenticates() {
        let mut doc: toml_edit::DocumentMut = render_config("x").parse().unwrap();
        set_remote(&mut doc, "http://localhost:5000/", "session=abc");
        let text = doc.to_string();
        assert!(text.contains("url = \"http://localhost:5000\""));
        assert!(text.contains("timeout_secs = 30"));
        let cfg: NotebookConfig = toml::from_str(&text).unwrap();
        assert!(cfg.remote.is_authenticated());
    }

    #[test]
    fn test_set_remote_creates_table() {
        let mut doc: toml_edit::DocumentMut = "[notebook]\nname = \"n\"\n".parse().unwrap();
        set_remote(&mut doc, "http://h", "s=1");
        let cfg: NotebookConfig = toml::from_str(&doc.to_string()).unwrap();
        assert_eq!(cfg.remote.url.as_deref(), Some("http://h"));
    }

    #[test]
    fn test_clear_session_keeps_url() {
        let mut doc: toml_edit::DocumentMut = render_config("x").parse().unwrap();
        set_remote(&mut doc, "http://h", "s=1");
        assert!(clear_session(&mut doc));
        let cfg: NotebookConfig = toml::from_str(&doc.to_string()).unwrap();
        assert!(!cfg.remote.is_authenticated());
        assert_eq!(cfg.remote.url.as_deref(), Some("http://h"));
        assert!(!clear_session(&mut doc));
    }
}
