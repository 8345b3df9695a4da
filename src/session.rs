//! A single analysis run over one package directory.

use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::{
    Error, Result,
    analysis::{ExclusionSet, find_structure_spec, values_of_type},
    config::AnalysisConfig,
    model::ModelSpec,
    package::LoadedPackage,
    transform::TypeValue,
};

/// The enumerated types of a package, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumAnalysis {
    pub package_name: String,
    pub types: Vec<TypeSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSpec {
    pub type_name: String,
    pub values: Vec<TypeValue>,
    /// Companions that already exist and must not be generated again.
    pub exclusions: ExclusionSet,
}

/// A loaded package together with the settings it is analyzed with.
#[derive(Debug)]
pub struct Session {
    package: LoadedPackage,
    config: AnalysisConfig,
}

impl Session {
    /// Loads the package in `dir`.
    ///
    /// Files generated by an earlier run must be removed before opening a
    /// session, or their declarations are detected as existing companions.
    pub fn open(dir: impl AsRef<Path>, config: AnalysisConfig) -> Result<Self> {
        let package = LoadedPackage::load(dir.as_ref())?;
        Ok(Self::new(package, config))
    }

    /// Loads the package in `dir` with the settings in the TOML file at
    /// `config`.
    pub fn open_with_config(
        dir: impl AsRef<Path>,
        config: impl AsRef<Path>,
    ) -> Result<Self> {
        let config = AnalysisConfig::load(config.as_ref())?;
        Self::open(dir, config)
    }

    pub fn new(package: LoadedPackage, config: AnalysisConfig) -> Self {
        Self { package, config }
    }

    pub fn package(&self) -> &LoadedPackage {
        &self.package
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Collects the values of every type in `types`, in the given order.
    /// The first type without valid values fails the whole analysis.
    pub fn analyze_enums<S: AsRef<str>>(&self, types: &[S]) -> Result<EnumAnalysis> {
        let config = &self.config;
        let types = types
            .iter()
            .map(AsRef::as_ref)
            .map(|type_name| {
                let found = values_of_type(&self.package, type_name, &config.policy)
                    .map_err(|source| Error::Values {
                        type_name: type_name.into(),
                        source,
                    })?;

                let values = config.transform.transform_values(
                    type_name,
                    &found.names,
                    config.keep_type_prefix,
                );

                Ok(TypeSpec {
                    type_name: type_name.to_owned(),
                    values,
                    exclusions: found.exclusions,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "analyzed {} enum types in package {}",
            types.len(),
            self.package.name()
        );

        Ok(EnumAnalysis {
            package_name: self.package.name().to_owned(),
            types,
        })
    }

    /// Describes every struct type in `types`. Types that are not declared
    /// as structs in the package are skipped with a warning.
    pub fn analyze_models<S: AsRef<str>>(&self, types: &[S]) -> Result<Vec<ModelSpec>> {
        let mut models = Vec::new();

        for type_name in types.iter().map(AsRef::as_ref) {
            let Some(spec) = find_structure_spec(&self.package, type_name) else {
                warn!(
                    "no struct named {type_name} in package {}, skipping",
                    self.package.name()
                );
                continue;
            };

            let model = ModelSpec::figure_out(self.package.name(), &spec).map_err(
                |source| Error::Tag {
                    type_name: type_name.into(),
                    source,
                },
            )?;

            models.push(model);
        }

        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{analysis::ExtractError, policy::Capability, transform::TransformRule};

    fn example_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/example")
    }

    fn session(config: AnalysisConfig) -> Session {
        Session::open(example_dir(), config).unwrap()
    }

    #[test]
    fn example_enums() {
        let session = session(AnalysisConfig {
            transform: TransformRule::Snake,
            ..AnalysisConfig::default()
        });
        let analysis = session.analyze_enums(&["ShirtSize", "WeekDay"]).unwrap();

        assert_eq!(analysis.package_name, "example");
        assert_eq!(analysis.types.len(), 2);

        let sizes = &analysis.types[0];
        assert_eq!(sizes.type_name, "ShirtSize");
        assert_eq!(
            sizes.values.iter().map(|value| value.name.as_str()).collect::<Vec<_>>(),
            ["NA", "XS", "Small", "M", "L", "XL"]
        );
        assert_eq!(sizes.values[2].text, "small");
        assert!(sizes.exclusions.contains(Capability::LookupByValue));
        assert!(sizes.exclusions.contains(Capability::Stringification));

        let days = &analysis.types[1];
        assert_eq!(days.values.len(), 7);
        assert_eq!(days.values[0].text, "monday");
        assert!(days.exclusions.contains(Capability::LookupByValue));
        assert!(!days.exclusions.contains(Capability::Stringification));
    }

    #[test]
    fn missing_enum_types_fail_the_analysis() {
        let session = session(AnalysisConfig::default());
        let result = session.analyze_enums(&["WeekDay", "User"]);

        assert!(matches!(
            result,
            Err(Error::Values {
                type_name,
                source: ExtractError::NoValues(_),
            }) if &*type_name == "User"
        ));
    }

    #[test]
    fn example_models() {
        let session = session(AnalysisConfig::default());
        let models = session.analyze_models(&["User", "Account", "WeekDay"]).unwrap();

        assert_eq!(models.len(), 1);
        let user = &models[0];
        assert_eq!(user.package, "example");
        assert_eq!(user.type_string, "user");
        assert_eq!(user.fields.len(), 3);
        assert_eq!(user.fields[2].name, "FullName");
        assert_eq!(user.fields[2].field_type, "string");
        assert_eq!(user.fields[2].tags["db"], "full_name");
    }

    #[test]
    fn config_files_are_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goplater.toml");
        std::fs::write(&path, "transform = \"kebab\"\n").unwrap();

        let session = Session::open_with_config(example_dir(), &path).unwrap();
        assert_eq!(session.config().transform, TransformRule::Kebab);

        let result = Session::open_with_config(example_dir(), dir.path().join("missing.toml"));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn missing_directories_fail_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let result = Session::open(dir.path().join("missing"), AnalysisConfig::default());
        assert!(matches!(result, Err(Error::Load(_))));
    }
}
