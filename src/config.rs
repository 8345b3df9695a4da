//! Analysis settings parsed from `.toml` files.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{policy::CapabilityPolicy, transform::TransformRule};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AnalysisConfig {
    /// How constant names are rendered as strings.
    pub transform: TransformRule,
    /// Whether the type name is kept in the rendered constant names.
    pub keep_type_prefix: bool,
    pub policy: CapabilityPolicy,
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl AnalysisConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let file_contents = std::fs::read_to_string(&path)?;
        let config = toml::from_str(&file_contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{Capability, ReceiverShape};

    #[test]
    fn config_from_toml() {
        let source = r#"
        transform = "snake"
        keep-type-prefix = true

        [[policy.methods]]
        fragment = "Describe"
        receiver = "pointer"
        capability = "stringification"
        "#;

        let config: AnalysisConfig = toml::from_str(source).unwrap();

        assert_eq!(config.transform, TransformRule::Snake);
        assert!(config.keep_type_prefix);
        assert_eq!(config.policy.methods.len(), 1);
        assert_eq!(config.policy.methods[0].receiver, ReceiverShape::Pointer);
        assert_eq!(
            config.policy.methods[0].capability,
            Capability::Stringification
        );

        // the variable rules were not overridden
        assert_eq!(
            config.policy.variables,
            CapabilityPolicy::default().variables
        );
    }

    #[test]
    fn empty_config_is_the_default() {
        let config: AnalysisConfig = toml::from_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn unknown_transform_rules_are_rejected() {
        let result = toml::from_str::<AnalysisConfig>("transform = \"camel\"");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goplater.toml");
        std::fs::write(&path, "transform = \"kebab\"\n").unwrap();

        let config = AnalysisConfig::load(&path).unwrap();
        assert_eq!(config.transform, TransformRule::Kebab);

        let missing = AnalysisConfig::load(dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigLoadError::Io(_))));
    }
}
