//! Conversion of constant names into the text they are rendered as.

use std::str::FromStr;

use heck::{ToKebabCase, ToSnakeCase, ToTitleCase};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a constant name is turned into its string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransformRule {
    /// `TestValue` becomes `test_value`.
    Snake,
    /// `TestValue` becomes `test-value`.
    Kebab,
    /// `TestValue` becomes `test value`.
    Space,
    /// The name is used as written.
    #[default]
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("TransformRule({0}) is invalid")]
pub struct UnknownTransformRule(pub Box<str>);

impl FromStr for TransformRule {
    type Err = UnknownTransformRule;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snake" => Ok(Self::Snake),
            "kebab" => Ok(Self::Kebab),
            "space" => Ok(Self::Space),
            "none" => Ok(Self::None),
            other => Err(UnknownTransformRule(other.into())),
        }
    }
}

impl std::fmt::Display for TransformRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Snake => "snake",
            Self::Kebab => "kebab",
            Self::Space => "space",
            Self::None => "none",
        })
    }
}

/// A constant name and the text it is rendered as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeValue {
    pub name: String,
    pub text: String,
}

impl TransformRule {
    /// Splits `src` into its camel-case words and joins them in lower case.
    pub fn transform(self, src: &str) -> String {
        match self {
            Self::Snake => src.to_snake_case(),
            Self::Kebab => src.to_kebab_case(),
            Self::Space => src.to_title_case().to_lowercase(),
            Self::None => src.to_owned(),
        }
    }

    /// Transforms every constant of `type_name`. Unless `keep_type_prefix`
    /// is set, the first occurrence of the type name is removed from each
    /// constant name before it is transformed.
    pub fn transform_values<S: AsRef<str>>(
        self,
        type_name: &str,
        values: &[S],
        keep_type_prefix: bool,
    ) -> Vec<TypeValue> {
        values
            .iter()
            .map(AsRef::as_ref)
            .map(|name| {
                let text = match keep_type_prefix || type_name.is_empty() {
                    true => self.transform(name),
                    false => self.transform(&name.replacen(type_name, "", 1)),
                };

                TypeValue {
                    name: name.to_owned(),
                    text,
                }
            })
            .collect()
    }
}
