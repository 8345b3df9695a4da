//! Extraction of the fields of a struct type.

use std::collections::BTreeMap;

use log::trace;
use serde::Serialize;
use tree_sitter::Node;

use crate::{
    cst::{Cst, descendants_of_kind, field_children},
    package::LoadedPackage,
};

/// The fields of a struct type, in declaration order.
///
/// `field_types` holds the declared type of each field when it is a plain
/// type name, and an empty string otherwise. `tags` holds the raw tag of
/// each field, backticks included, or an empty string for untagged fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureSpec {
    pub name: String,
    pub fields: Vec<String>,
    pub field_types: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

/// Finds the top-level struct type called `type_name`.
///
/// Returns `None` if the package declares no type of that name, or if the
/// type is not a struct. Embedded fields are skipped, and for a field
/// declaration naming several fields only the first name is used.
pub fn find_structure_spec(
    package: &LoadedPackage,
    type_name: &str,
) -> Option<StructureSpec> {
    let (cst, ty) = package.files().find_map(|(_, cst)| {
        cst.top_level()
            .into_iter()
            .filter(|decl| decl.kind() == "type_declaration")
            .flat_map(|decl| descendants_of_kind(decl, &["type_spec", "type_alias"]))
            .find(|spec| {
                spec.child_by_field_name("name")
                    .is_some_and(|name| cst.text(name) == type_name)
            })
            .and_then(|spec| spec.child_by_field_name("type"))
            .map(|ty| (cst, ty))
    })?;

    if ty.kind() != "struct_type" {
        trace!("{type_name} is a {}, not a struct", ty.kind());
        return None;
    }

    let mut spec = StructureSpec {
        name: type_name.to_owned(),
        ..StructureSpec::default()
    };

    for field in descendants_of_kind(ty, &["field_declaration"]) {
        let Some(name) = field_children(field, "name").first().copied() else {
            trace!("skipping embedded field {}", cst.text(field));
            continue;
        };

        let name = cst.text(name).to_owned();
        spec.field_types.insert(name.clone(), field_type(cst, field));
        spec.tags.insert(name.clone(), field_tag(cst, field));
        spec.fields.push(name);
    }

    Some(spec)
}

fn field_type(cst: &Cst, field: Node<'_>) -> String {
    match field.child_by_field_name("type") {
        Some(ty) if ty.kind() == "type_identifier" => cst.text(ty).to_owned(),
        _ => String::new(),
    }
}

fn field_tag(cst: &Cst, field: Node<'_>) -> String {
    field
        .child_by_field_name("tag")
        .map(|tag| cst.text(tag).to_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analysis::tag::parse_tag, fake_file};

    fn package(source: &str) -> LoadedPackage {
        LoadedPackage::from_files([fake_file!(source)]).unwrap()
    }

    #[test]
    fn struct_fields_and_tags() {
        let package = package(
            "package p\n\ntype User struct {\n\tName string `db:\"name\"`\n}\n",
        );
        let spec = find_structure_spec(&package, "User").unwrap();

        assert_eq!(spec.name, "User");
        assert_eq!(spec.fields, ["Name"]);
        assert_eq!(spec.field_types["Name"], "string");
        assert!(spec.tags["Name"].contains(r#"db:"name""#));

        let tags = parse_tag(&spec.tags["Name"]).unwrap();
        assert_eq!(tags.get("db").map(String::as_str), Some("name"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn unsupported_fields() {
        let package = package(
            r#"package p

import "time"

type Base struct{}

type Event struct {
	*Base
	ID, Alias int `json:"id"`
	At        time.Time
	Parent    *Event
	Labels    []string `json:"labels,omitempty"`
}
"#,
        );
        let spec = find_structure_spec(&package, "Event").unwrap();

        assert_eq!(spec.fields, ["ID", "At", "Parent", "Labels"]);
        assert_eq!(spec.field_types["ID"], "int");
        assert_eq!(spec.field_types["At"], "");
        assert_eq!(spec.field_types["Parent"], "");
        assert_eq!(spec.tags["ID"], r#"`json:"id"`"#);
        assert_eq!(spec.tags["At"], "");
    }

    #[test]
    fn absent_types_are_skipped() {
        let package = package("package p\n\ntype User struct{}\n");
        assert_eq!(find_structure_spec(&package, "Account"), None);
    }

    #[test]
    fn non_struct_types_are_skipped() {
        let package =
            package("package p\n\ntype X int\n\ntype Y = int\n\ntype Z interface{}\n");

        for name in ["X", "Y", "Z"] {
            assert_eq!(find_structure_spec(&package, name), None, "{name}");
        }
    }

    #[test]
    fn grouped_declarations_are_searched() {
        let package = package(
            "package p\n\ntype (\n\tA int\n\tB struct {\n\t\tC A\n\t}\n)\n",
        );
        let spec = find_structure_spec(&package, "B").unwrap();

        assert_eq!(spec.fields, ["C"]);
        assert_eq!(spec.field_types["C"], "A");
    }
}
