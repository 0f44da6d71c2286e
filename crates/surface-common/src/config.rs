//! Lookup of settings inside a layered JSON/YAML configuration document.

use crate::{SurfaceError, SurfaceResult};
use serde_json::Value;
use std::path::Path;

/// A `/`-separated path into a configuration document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPath(Vec<String>);

impl ConfigPath {
    /// Path segments.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    fn resolve<'a>(&self, root: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(root, |node, key| node.as_object()?.get(key.as_str()))
    }
}

impl From<&str> for ConfigPath {
    fn from(path: &str) -> Self {
        Self(
            path.split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

impl From<String> for ConfigPath {
    fn from(path: String) -> Self {
        Self::from(path.as_str())
    }
}

impl<S: AsRef<str>> From<&[S]> for ConfigPath {
    fn from(segments: &[S]) -> Self {
        Self(segments.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

impl<S: AsRef<str>, const N: usize> From<[S; N]> for ConfigPath {
    fn from(segments: [S; N]) -> Self {
        Self(segments.iter().map(|s| s.as_ref().to_string()).collect())
    }
}

/// Look up `path` in `config`, falling back to `fallback` when given.
///
/// When both paths resolve to objects the result is their union with keys
/// from `path` overriding keys from `fallback`. Otherwise the primary value
/// wins if present.
pub fn find_config(
    config: &Value,
    path: impl Into<ConfigPath>,
    fallback: Option<ConfigPath>,
) -> Option<Value> {
    let primary = path.into().resolve(config);
    let secondary = fallback.as_ref().and_then(|p| p.resolve(config));

    match (primary, secondary) {
        (Some(Value::Object(p)), Some(Value::Object(s))) => {
            let mut merged = s.clone();
            for (key, value) in p {
                merged.insert(key.clone(), value.clone());
            }
            Some(Value::Object(merged))
        }
        (Some(p), _) => Some(p.clone()),
        (None, Some(s)) => Some(s.clone()),
        (None, None) => None,
    }
}

/// A configuration document loaded from disk.
#[derive(Debug, Clone, Default)]
pub struct ConfigDocument {
    root: Value,
}

impl ConfigDocument {
    /// Wrap an already-parsed document.
    pub fn new(root: Value) -> Self {
        Self { root }
    }

    /// Load a `.json`, `.yaml` or `.yml` file.
    pub fn from_file(path: impl AsRef<Path>) -> SurfaceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SurfaceError::ConfigFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_str_content(&content)
    }

    /// Parse a YAML or JSON document (YAML is a superset of JSON).
    pub fn from_str_content(content: &str) -> SurfaceResult<Self> {
        let root: Value = serde_yaml::from_str(content)?;
        Ok(Self { root })
    }

    /// The whole document.
    pub fn root(&self) -> &Value {
        &self.root
    }

    /// See [`find_config`].
    pub fn find(&self, path: impl Into<ConfigPath>, fallback: Option<ConfigPath>) -> Option<Value> {
        find_config(&self.root, path, fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn fb(path: &str) -> Option<ConfigPath> {
        Some(ConfigPath::from(path))
    }

    #[test]
    fn test_find_config_on_empty_config() {
        let config = json!({});
        assert_eq!(find_config(&config, "root", None), None);
        assert_eq!(find_config(&config, "root/key", None), None);
        assert_eq!(find_config(&config, ["root", "key"], None), None);
        assert_eq!(find_config(&config, "root/key", fb("fallback")), None);
    }

    #[test]
    fn test_find_config_scalars() {
        let config = json!({
            "root": { "key": "root_key", "sub": { "key": "root_sub_key" } },
            "key": "key"
        });

        assert_eq!(find_config(&config, "key", None), Some(json!("key")));
        assert_eq!(find_config(&config, ["key"], None), Some(json!("key")));
        assert_eq!(find_config(&config, "root/key", None), Some(json!("root_key")));
        assert_eq!(
            find_config(&config, ["root", "sub", "key"], None),
            Some(json!("root_sub_key"))
        );
        assert_eq!(find_config(&config, "root/key2", None), None);
        assert_eq!(find_config(&config, "root2/key", None), None);

        assert_eq!(find_config(&config, "key", fb("root/key")), Some(json!("key")));
        assert_eq!(find_config(&config, "root/key", fb("nokey")), Some(json!("root_key")));
        assert_eq!(find_config(&config, "no/key", fb("root/key")), Some(json!("root_key")));
        assert_eq!(find_config(&config, "no/key", fb("root/nokey")), None);
    }

    #[test]
    fn test_find_config_merges_objects() {
        let config = json!({
            "root": {
                "key": { "value": "val", "other": "other" },
                "sub": { "key": { "value": "val2" } }
            }
        });

        assert_eq!(
            find_config(&config, "root/key", fb("no/key")),
            Some(json!({ "value": "val", "other": "other" }))
        );
        assert_eq!(
            find_config(&config, "root/sub/key", fb("root/key")),
            Some(json!({ "value": "val2", "other": "other" }))
        );
    }

    #[test]
    fn test_document_from_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "config:\n  workerpool:\n    maxWorkers: 4").unwrap();

        let doc = ConfigDocument::from_file(file.path()).unwrap();
        assert_eq!(doc.find("config/workerpool/maxWorkers", None), Some(json!(4)));
    }

    #[test]
    fn test_document_missing_file() {
        let err = ConfigDocument::from_file("/nonexistent/surface.json").unwrap_err();
        assert!(matches!(err, SurfaceError::ConfigFile { .. }));
    }
}
