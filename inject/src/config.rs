//! Container configuration, loadable from YAML.

use crate::error::Result;
use serde::Deserialize;
use std::path::Path;

/// Tunables for a [`Container`](crate::Container).
///
/// Every field has a default, so an empty YAML document is a valid configuration.
///
/// ```
/// use fibre_inject::ContainerConfig;
///
/// let config = ContainerConfig::from_yaml_str("max_depth: 16").unwrap();
/// assert_eq!(config.max_depth, 16);
/// assert!(config.resolve_by_convention);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
  /// Maximum nesting of a single resolution before it fails with `DepthExceeded`.
  pub max_depth: usize,
  /// Whether unregistered component types are constructed "by convention".
  pub resolve_by_convention: bool,
  /// Whether dropping the container disposes the singletons it built.
  pub dispose_on_drop: bool,
}

impl Default for ContainerConfig {
  fn default() -> Self {
    Self {
      max_depth: 64,
      resolve_by_convention: true,
      dispose_on_drop: true,
    }
  }
}

impl ContainerConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(yaml)?)
  }

  pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
    let contents = std::fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }

  pub fn with_max_depth(mut self, max_depth: usize) -> Self {
    self.max_depth = max_depth;
    self
  }

  pub fn with_resolve_by_convention(mut self, enabled: bool) -> Self {
    self.resolve_by_convention = enabled;
    self
  }

  pub fn with_dispose_on_drop(mut self, enabled: bool) -> Self {
    self.dispose_on_drop = enabled;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::Error;
  use pretty_assertions::assert_eq;

  #[test]
  fn empty_document_yields_defaults() {
    let config = ContainerConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, ContainerConfig::default());
  }

  #[test]
  fn all_fields_parse() {
    let yaml = r#"
max_depth: 8
resolve_by_convention: false
dispose_on_drop: false
"#;
    let config = ContainerConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(
      config,
      ContainerConfig {
        max_depth: 8,
        resolve_by_convention: false,
        dispose_on_drop: false,
      }
    );
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let err = ContainerConfig::from_yaml_str("max_dept: 8").unwrap_err();
    assert!(matches!(err, Error::ConfigParse(_)));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = ContainerConfig::from_file("/definitely/not/here.yaml").unwrap_err();
    assert!(matches!(err, Error::ConfigRead(_)));
  }

  #[test]
  fn file_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("container.yaml");
    std::fs::write(&path, "max_depth: 3\n").unwrap();

    let config = ContainerConfig::from_file(&path).unwrap();
    assert_eq!(config, ContainerConfig::default().with_max_depth(3));
  }
}
