use anyhow::Context;
use jsontree_editor::EditorConfig;
use std::path::Path;
use tracing::debug;

/// Load the editor config for `file`.
///
/// An explicit `--config` path must exist; otherwise `jsontree.config.json`
/// next to the document is used when present.
pub fn load(explicit: Option<&Path>, file: &Path) -> anyhow::Result<EditorConfig> {
    if let Some(path) = explicit {
        return EditorConfig::load(path)
            .with_context(|| format!("Cannot load config {}", path.display()));
    }

    let dir = match file.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    debug!(dir = %dir.display(), "looking for config");
    EditorConfig::load_or_default(dir)
        .with_context(|| format!("Cannot load config from {}", dir.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsontree_editor::DEFAULT_CONFIG_NAME;

    #[test]
    fn test_config_next_to_document() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("data.json");
        std::fs::write(dir.path().join(DEFAULT_CONFIG_NAME), r#"{ "rootName": "doc" }"#).unwrap();

        let config = load(None, &file).unwrap();
        assert_eq!(config.root_name, "doc");
    }

    #[test]
    fn test_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(None, &dir.path().join("data.json")).unwrap();
        assert_eq!(config.root_name, "root");
        assert_eq!(config.undo_levels, 100);
    }

    #[test]
    fn test_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        assert!(load(Some(&missing), &dir.path().join("data.json")).is_err());
    }
}
