//! Descriptions of struct types, as handed to the model templates.

use serde::Serialize;

use crate::analysis::{StructureSpec, TagMap, TagSyntaxError, parse_tag};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSpec {
    pub package: String,
    pub type_name: String,
    /// The type name with its first letter in lower case, e.g. `userInfo`
    /// for `UserInfo`.
    pub type_string: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub name: String,
    /// Empty unless the field has a plain named type.
    pub field_type: String,
    pub tags: TagMap,
}

impl ModelSpec {
    /// Builds the description of `spec`, a struct declared in the package
    /// called `package`, parsing the tag of every field. Untagged fields get
    /// an empty tag map.
    pub fn figure_out(
        package: &str,
        spec: &StructureSpec,
    ) -> Result<Self, TagSyntaxError> {
        let fields = spec
            .fields
            .iter()
            .map(|name| {
                let tags = match spec.tags.get(name).map(String::as_str) {
                    None | Some("") => TagMap::new(),
                    Some(raw) => parse_tag(raw)?,
                };

                Ok(Field {
                    name: name.clone(),
                    field_type: spec.field_types.get(name).cloned().unwrap_or_default(),
                    tags,
                })
            })
            .collect::<Result<Vec<_>, TagSyntaxError>>()?;

        Ok(Self {
            package: package.to_owned(),
            type_name: spec.name.clone(),
            type_string: lower_first(&spec.name),
            fields,
        })
    }
}

fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
