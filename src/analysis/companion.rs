//! Detection of companion declarations that already exist for a type.
//!
//! Go has no annotation mechanism to mark a method as "the generated
//! `String` method", so detection is heuristic: a declaration provides a
//! capability if its name contains a fragment from the [`CapabilityPolicy`]
//! and, for methods, if its receiver has the shape the policy requires.

use std::collections::BTreeSet;

use log::trace;
use serde::Serialize;
use tree_sitter::Node;

use crate::{
    cst::{Cst, descendants_of_kind, field_children, named_children},
    policy::{Capability, CapabilityPolicy, ReceiverShape},
};

/// The capabilities whose companion declarations already exist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ExclusionSet(BTreeSet<Capability>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + use<'_> {
        self.0.iter().copied()
    }
}

impl Extend<Capability> for ExclusionSet {
    fn extend<T: IntoIterator<Item = Capability>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl FromIterator<Capability> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The receiver of a method declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Receiver<'s> {
    pub type_name: &'s str,
    pub shape: ReceiverShape,
}

/// Returns the receiver of `method`, a `method_declaration` node.
///
/// Only receivers of the form `T` or `*T` (optionally named) are
/// recognized; receivers of generic types, parenthesized receivers and
/// malformed parameter lists yield `None`.
pub fn receiver_of<'t>(cst: &'t Cst, method: Node<'t>) -> Option<Receiver<'t>> {
    let parameters = method.child_by_field_name("receiver")?;
    let [parameter] = named_children(parameters)[..] else {
        return None;
    };

    let ty = parameter.child_by_field_name("type")?;
    match ty.kind() {
        "type_identifier" => Some(Receiver {
            type_name: cst.text(ty),
            shape: ReceiverShape::Value,
        }),
        "pointer_type" => match named_children(ty)[..] {
            [inner] if inner.kind() == "type_identifier" => Some(Receiver {
                type_name: cst.text(inner),
                shape: ReceiverShape::Pointer,
            }),
            _ => None,
        },
        _ => None,
    }
}

/// Inspects declarations for companions of a single type.
#[derive(Debug, Clone, Copy)]
pub struct CompanionDetector<'a> {
    policy: &'a CapabilityPolicy,
    type_name: &'a str,
}

impl<'a> CompanionDetector<'a> {
    pub fn new(policy: &'a CapabilityPolicy, type_name: &'a str) -> Self {
        Self { policy, type_name }
    }

    /// Records the capabilities provided by the variables bound in `decl`,
    /// a `var_declaration` node.
    pub fn inspect_variables(
        &self,
        cst: &Cst,
        decl: Node<'_>,
        exclusions: &mut ExclusionSet,
    ) {
        let names = descendants_of_kind(decl, &["var_spec"])
            .into_iter()
            .flat_map(|spec| field_children(spec, "name"))
            .map(|name| cst.text(name))
            .filter(|&name| name != "_");

        for name in names {
            for capability in self.policy.variable_capabilities(self.type_name, name) {
                trace!("variable {name} provides {capability} for {}", self.type_name);
                exclusions.insert(capability);
            }
        }
    }

    /// Records the capabilities provided by `decl`, a `method_declaration`
    /// node, if it is a method of the inspected type.
    pub fn inspect_method(
        &self,
        cst: &Cst,
        decl: Node<'_>,
        exclusions: &mut ExclusionSet,
    ) {
        let (Some(receiver), Some(name)) =
            (receiver_of(cst, decl), decl.child_by_field_name("name"))
        else {
            return;
        };

        if receiver.type_name != self.type_name {
            return;
        }

        let name = cst.text(name);
        for capability in self.policy.method_capabilities(name, receiver.shape) {
            trace!(
                "method {name} provides {capability} for {}",
                self.type_name
            );
            exclusions.insert(capability);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{cst::create_go_parser, fake_file};

    fn parse(source: &str) -> Cst {
        let mut parser = create_go_parser().unwrap();
        Cst::parse(&mut parser, fake_file!(source)).unwrap()
    }

    fn detect(source: &str, type_name: &str) -> ExclusionSet {
        let cst = parse(source);
        let policy = CapabilityPolicy::default();
        let detector = CompanionDetector::new(&policy, type_name);
        let mut exclusions = ExclusionSet::new();

        for decl in cst.top_level() {
            match decl.kind() {
                "var_declaration" => {
                    detector.inspect_variables(&cst, decl, &mut exclusions)
                }
                "method_declaration" => {
                    detector.inspect_method(&cst, decl, &mut exclusions)
                }
                _ => {}
            }
        }

        exclusions
    }

    #[test]
    fn receivers_are_classified() {
        let cst = parse(
            "package p\n\nfunc (d Day) A() {}\nfunc (*Day) B() {}\nfunc (l List[T]) C() {}\n",
        );
        let receivers = descendants_of_kind(cst.root(), &["method_declaration"])
            .into_iter()
            .map(|method| receiver_of(&cst, method))
            .collect::<Vec<_>>();

        assert_eq!(receivers, [
            Some(Receiver {
                type_name: "Day",
                shape: ReceiverShape::Value,
            }),
            Some(Receiver {
                type_name: "Day",
                shape: ReceiverShape::Pointer,
            }),
            None,
        ]);
    }

    #[test]
    fn value_receiver_string_is_detected() {
        let exclusions = detect(
            "package p\n\ntype Day int\n\nfunc (d Day) String() string { return \"\" }\n",
            "Day",
        );

        assert!(exclusions.contains(Capability::Stringification));
        assert_eq!(exclusions.len(), 1);
    }

    #[test]
    fn pointer_receiver_string_is_not_detected() {
        let exclusions = detect(
            "package p\n\ntype Day int\n\nfunc (d *Day) String() string { return \"\" }\n",
            "Day",
        );

        assert!(exclusions.is_empty());
    }

    #[test]
    fn methods_of_other_types_are_ignored() {
        let exclusions = detect(
            "package p\n\nfunc (m Month) String() string { return \"\" }\n",
            "Day",
        );

        assert!(exclusions.is_empty());
    }

    #[test]
    fn lookup_maps_and_scanners_are_detected() {
        let exclusions = detect(
            r#"package p

var (
	defDayValueToName = map[Day]string{}
	_                 = 1
)

var DayNameToValue = map[string]Day{}

func (d *Day) Scan(src any) error { return nil }
func (d *Day) UnmarshalJSON(data []byte) error { return nil }
"#,
            "Day",
        );

        assert_eq!(exclusions.iter().collect::<Vec<_>>(), [
            Capability::Unmarshal,
            Capability::Scan,
            Capability::LookupByName,
            Capability::LookupByValue,
        ]);
    }
}
