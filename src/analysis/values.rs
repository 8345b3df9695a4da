//! Extraction of the named constant values of an enumerated integer type.

use log::{debug, trace};
use serde::Serialize;
use thiserror::Error;
use tree_sitter::Node;

use crate::{
    constant::ConstValue,
    cst::{Cst, descendants_of_kind, field_children},
    env::{FileId, ObjectKind},
    package::LoadedPackage,
    policy::CapabilityPolicy,
    ty::Ty,
};

use super::companion::{CompanionDetector, ExclusionSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("inspecting code:\n\t{}", join_issues(.0))]
    TypeMismatch(Vec<InspectError>),
    #[error("no values defined for type {0}")]
    NoValues(Box<str>),
}

/// A single problem with a constant bound to the requested type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InspectError {
    #[error("can't handle non-integer constant type {type_name} ({name} has underlying type {underlying})")]
    NonInteger {
        name: Box<str>,
        type_name: Box<str>,
        underlying: Box<str>,
    },
    #[error("no value for constant {0}")]
    NoValue(Box<str>),
}

fn join_issues(issues: &[InspectError]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\t")
}

/// The type annotation of a single `const_spec`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Annotation<'s> {
    Missing,
    /// A plain type name, e.g. `ShirtSize`.
    Identifier(&'s str),
    /// Any other type expression, e.g. `pkg.Kind` or `[2]int`.
    Other,
}

impl<'s> Annotation<'s> {
    fn of(cst: &'s Cst, spec: Node<'_>) -> Self {
        match spec.child_by_field_name("type") {
            None => Annotation::Missing,
            Some(ty) if ty.kind() == "type_identifier" => {
                Annotation::Identifier(cst.text(ty))
            }
            Some(_) => Annotation::Other,
        }
    }
}

/// The type inherited by the specs of a constant block that carry neither a
/// type nor a value.
///
/// Each block starts in [`CarriedType::None`]. A spec with an explicit type
/// carries that type; a spec with a value but no type carries nothing; a
/// spec with neither keeps whatever was carried before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarriedType<'s> {
    #[default]
    None,
    Named(&'s str),
}

impl<'s> CarriedType<'s> {
    #[must_use]
    pub fn step(self, annotation: Annotation<'s>, has_values: bool) -> Self {
        match (annotation, has_values) {
            (Annotation::Identifier(name), _) => CarriedType::Named(name),
            (Annotation::Other, _) => CarriedType::None,
            (Annotation::Missing, true) => CarriedType::None,
            (Annotation::Missing, false) => self,
        }
    }

    pub fn is(self, type_name: &str) -> bool {
        matches!(self, CarriedType::Named(name) if name == type_name)
    }
}

/// The constants of one type, with the companions that already exist for
/// it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeValues {
    /// Constant names in declaration order. Constants sharing a value are
    /// all kept.
    pub names: Vec<String>,
    pub exclusions: ExclusionSet,
}

/// Collects every constant declared with the type `type_name`, and the
/// companion declarations of that type which already exist.
///
/// Every constant of the type must have an integer underlying type; all
/// constants violating this are reported together.
pub fn values_of_type(
    package: &LoadedPackage,
    type_name: &str,
    policy: &CapabilityPolicy,
) -> Result<TypeValues, ExtractError> {
    let detector = CompanionDetector::new(policy, type_name);
    let mut names = Vec::new();
    let mut exclusions = ExclusionSet::new();
    let mut issues = Vec::new();

    for (file, cst) in package.files() {
        for decl in cst.top_level() {
            match decl.kind() {
                "const_declaration" => {
                    let found = constants_of_type(cst, decl, type_name);
                    for name in found {
                        match check_integer(package, file, cst, name, type_name) {
                            Ok(()) => names.push(cst.text(name).to_owned()),
                            Err(issue) => issues.push(issue),
                        }
                    }
                }
                "var_declaration" => {
                    detector.inspect_variables(cst, decl, &mut exclusions)
                }
                "method_declaration" => {
                    detector.inspect_method(cst, decl, &mut exclusions)
                }
                _ => {}
            }
        }
    }

    if !issues.is_empty() {
        return Err(ExtractError::TypeMismatch(issues));
    }

    if names.is_empty() {
        return Err(ExtractError::NoValues(type_name.into()));
    }

    debug!(
        "found {} values for {type_name}, {} companions already present",
        names.len(),
        exclusions.len()
    );

    Ok(TypeValues { names, exclusions })
}

/// Returns the identifiers bound by `decl` whose carried type is
/// `type_name`, skipping the blank identifier.
fn constants_of_type<'t>(
    cst: &'t Cst,
    decl: Node<'t>,
    type_name: &str,
) -> Vec<Node<'t>> {
    let mut carried = CarriedType::None;
    let mut found = Vec::new();

    for spec in descendants_of_kind(decl, &["const_spec"]) {
        let annotation = Annotation::of(cst, spec);
        let has_values = spec.child_by_field_name("value").is_some();
        carried = carried.step(annotation, has_values);

        if !carried.is(type_name) {
            continue;
        }

        found.extend(
            field_children(spec, "name")
                .into_iter()
                .filter(|&name| cst.text(name) != "_"),
        );
    }

    found
}

fn check_integer(
    package: &LoadedPackage,
    file: FileId,
    cst: &Cst,
    name: Node<'_>,
    type_name: &str,
) -> Result<(), InspectError> {
    let text = cst.text(name);
    let Some(ObjectKind::Const { ty, value }) =
        package.def(file, name).map(|object| &object.kind)
    else {
        return Err(InspectError::NoValue(text.into()));
    };

    match package.env().underlying(*ty) {
        Some(Ty::Basic(kind)) if kind.is_integer() => {
            trace!("{text} = {value}");
            Ok(())
        }
        // the underlying type is not known, but the value still is
        Some(Ty::Foreign { .. } | Ty::Unknown)
            if matches!(value, ConstValue::Int(_) | ConstValue::Unknown) =>
        {
            debug!("assuming {text} of type {type_name} is an integer");
            Ok(())
        }
        Some(Ty::Foreign { .. } | Ty::Unknown) => Err(InspectError::NonInteger {
            name: text.into(),
            type_name: type_name.into(),
            underlying: format!(
                "{} holding a {} constant",
                describe(package, package.env().underlying(*ty)),
                value.kind()
            )
            .into(),
        }),
        underlying => Err(InspectError::NonInteger {
            name: text.into(),
            type_name: type_name.into(),
            underlying: describe(package, underlying).into(),
        }),
    }
}

fn describe(package: &LoadedPackage, ty: Option<Ty>) -> String {
    match ty {
        Some(Ty::Basic(kind)) => kind.name().to_owned(),
        Some(Ty::Named(name)) => package.resolve(name).to_owned(),
        Some(Ty::Foreign { package: path, name }) => {
            format!("{}.{}", package.resolve(path), package.resolve(name))
        }
        Some(Ty::Struct) => "struct".to_owned(),
        Some(Ty::Interface) => "interface".to_owned(),
        Some(Ty::Pointer) => "pointer".to_owned(),
        Some(Ty::Composite | Ty::Generic) => "composite".to_owned(),
        Some(Ty::Unknown) | None => "unknown".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fake_file, policy::Capability};

    fn package(source: &str) -> LoadedPackage {
        LoadedPackage::from_files([fake_file!(source)]).unwrap()
    }

    fn values(source: &str, type_name: &str) -> Result<TypeValues, ExtractError> {
        values_of_type(&package(source), type_name, &CapabilityPolicy::default())
    }

    #[test]
    fn carried_type_transitions() {
        let start = CarriedType::None;
        let named = start.step(Annotation::Identifier("Day"), true);
        assert_eq!(named, CarriedType::Named("Day"));

        // neither type nor value: keep carrying
        assert_eq!(named.step(Annotation::Missing, false), named);
        // value but no type: reset
        assert_eq!(named.step(Annotation::Missing, true), CarriedType::None);
        assert_eq!(named.step(Annotation::Other, true), CarriedType::None);
        assert_eq!(
            named.step(Annotation::Identifier("Month"), false),
            CarriedType::Named("Month")
        );
        assert!(named.is("Day"));
        assert!(!start.is("Day"));
    }

    #[test]
    fn iota_block() {
        let found = values(
            "package p\n\ntype MyEnum int\n\nconst (\n\tA MyEnum = iota\n\tB\n\tC\n)\n",
            "MyEnum",
        )
        .unwrap();

        assert_eq!(found.names, ["A", "B", "C"]);
        assert!(found.exclusions.is_empty());
    }

    #[test]
    fn untyped_values_reset_the_carried_type() {
        let found = values(
            r#"package p

type MyEnum int

const (
	A MyEnum = iota
	B
	Limit = 10
	D
)

const E = "not-my-enum"
"#,
            "MyEnum",
        )
        .unwrap();

        assert_eq!(found.names, ["A", "B"]);
    }

    #[test]
    fn blanks_are_skipped_and_aliases_kept() {
        let found = values(
            r#"package p

type Size byte

const (
	_ Size = iota
	Small
	Medium
	Default = Medium
	M Size = 2
)
"#,
            "Size",
        )
        .unwrap();

        assert_eq!(found.names, ["Small", "Medium", "M"]);
    }

    #[test]
    fn values_across_files_keep_file_order() {
        let package = LoadedPackage::from_files([
            fake_file!("package p\n\ntype Day int\n\nconst Monday Day = 1\n"),
            fake_file!(
                "package p\n\nconst Tuesday Day = 2\n\nfunc (d Day) String() string { return \"\" }\n"
            ),
        ])
        .unwrap();

        let found =
            values_of_type(&package, "Day", &CapabilityPolicy::default()).unwrap();
        assert_eq!(found.names, ["Monday", "Tuesday"]);
        assert!(found.exclusions.contains(Capability::Stringification));
    }

    #[test]
    fn non_integer_types_are_reported_together() {
        let result = values(
            r#"package p

type Ratio float64

const (
	Half    Ratio = 0.5
	Quarter Ratio = 0.25
)
"#,
            "Ratio",
        );

        let Err(ExtractError::TypeMismatch(issues)) = result else {
            panic!("expected a type mismatch, got {result:?}");
        };

        assert_eq!(issues.len(), 2);
        assert!(matches!(
            &issues[0],
            InspectError::NonInteger { name, underlying, .. }
                if &**name == "Half" && &**underlying == "float64"
        ));

        let message = ExtractError::TypeMismatch(issues).to_string();
        assert!(message.starts_with("inspecting code:\n\t"));
        assert!(message.contains("Quarter"));
    }

    #[test]
    fn imported_underlying_types_are_accepted() {
        let found = values(
            r#"package p

import "time"

type Timeout time.Duration

const Short Timeout = 1
"#,
            "Timeout",
        )
        .unwrap();

        assert_eq!(found.names, ["Short"]);
    }

    #[test]
    fn imported_underlying_types_still_need_integer_values() {
        let result = values(
            r#"package p

import "math/big"

type Ratio big.Accuracy

const (
	Half Ratio = 0.5
	One  Ratio = 1
)
"#,
            "Ratio",
        );

        let Err(ExtractError::TypeMismatch(issues)) = result else {
            panic!("expected a type mismatch, got {result:?}");
        };
        assert_eq!(issues.len(), 1);
        assert!(matches!(
            &issues[0],
            InspectError::NonInteger { name, underlying, .. }
                if &**name == "Half" && underlying.contains("big.Accuracy")
        ));

        let result = values(
            "package p\n\nimport \"net/http\"\n\ntype Mode http.ConnState\n\nconst Name Mode = \"x\"\n",
            "Mode",
        );
        assert!(matches!(result, Err(ExtractError::TypeMismatch(issues)) if issues.len() == 1));
    }

    #[test]
    fn multi_name_specs_keep_every_name() {
        let found = values(
            "package p\n\ntype E int\n\nconst A, B E = 1, 2\n",
            "E",
        )
        .unwrap();

        assert_eq!(found.names, ["A", "B"]);
    }

    #[test]
    fn types_without_values_are_errors() {
        let result = values("package p\n\ntype Empty int\n", "Empty");
        assert_eq!(result, Err(ExtractError::NoValues("Empty".into())));
        assert_eq!(
            result.unwrap_err().to_string(),
            "no values defined for type Empty"
        );
    }
}
