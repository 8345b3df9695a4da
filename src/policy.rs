//! The table of companion declarations the generator knows how to emit.
//!
//! Each rule maps a fragment of a declaration name to the capability that
//! declaration provides. A variable whose name contains both a variable
//! rule's fragment and the type name provides that rule's capability; a
//! method of the type whose name contains a method rule's fragment provides
//! the capability if its receiver has the required shape.

use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Stringification,
    Validation,
    Marshal,
    Unmarshal,
    Value,
    Scan,
    LookupByName,
    LookupByValue,
}

impl Capability {
    /// The conventional name of the declaration providing this capability,
    /// which is also the name of the template that generates it.
    pub const fn template_name(self) -> &'static str {
        match self {
            Capability::Stringification => "String",
            Capability::Validation => "Validate",
            Capability::Marshal => "MarshalJSON",
            Capability::Unmarshal => "UnmarshalJSON",
            Capability::Value => "Value",
            Capability::Scan => "Scan",
            Capability::LookupByName => "NameToValue",
            Capability::LookupByValue => "ValueToName",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.template_name())
    }
}

/// Whether a method is declared on `T` or on `*T`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReceiverShape {
    Value,
    Pointer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableRule {
    pub fragment: Box<str>,
    pub capability: Capability,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodRule {
    pub fragment: Box<str>,
    pub receiver: ReceiverShape,
    pub capability: Capability,
}

/// The immutable rule table consulted by the companion detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilityPolicy {
    pub variables: Vec<VariableRule>,
    pub methods: Vec<MethodRule>,
}

impl Default for CapabilityPolicy {
    fn default() -> Self {
        let variable = |fragment: &str, capability| VariableRule {
            fragment: fragment.into(),
            capability,
        };

        let method = |fragment: &str, receiver, capability| MethodRule {
            fragment: fragment.into(),
            receiver,
            capability,
        };

        Self {
            variables: vec![
                variable("NameToValue", Capability::LookupByName),
                variable("ValueToName", Capability::LookupByValue),
            ],
            methods: vec![
                method("String", ReceiverShape::Value, Capability::Stringification),
                method("Validate", ReceiverShape::Value, Capability::Validation),
                method("MarshalJSON", ReceiverShape::Value, Capability::Marshal),
                method(
                    "UnmarshalJSON",
                    ReceiverShape::Pointer,
                    Capability::Unmarshal,
                ),
                method("Value", ReceiverShape::Value, Capability::Value),
                method("Scan", ReceiverShape::Pointer, Capability::Scan),
            ],
        }
    }
}

impl CapabilityPolicy {
    /// Returns the capabilities provided by a package-level variable called
    /// `name`, as a companion of the type `type_name`.
    pub fn variable_capabilities<'a>(
        &'a self,
        type_name: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = Capability> + 'a {
        self.variables
            .iter()
            .filter(move |rule| {
                name.contains(&*rule.fragment) && name.contains(type_name)
            })
            .map(|rule| rule.capability)
    }

    /// Returns the capabilities provided by a method called `name` whose
    /// receiver has the given shape.
    pub fn method_capabilities<'a>(
        &'a self,
        name: &'a str,
        receiver: ReceiverShape,
    ) -> impl Iterator<Item = Capability> + 'a {
        self.methods
            .iter()
            .filter(move |rule| {
                rule.receiver == receiver && name.contains(&*rule.fragment)
            })
            .map(|rule| rule.capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_matches_by_fragment_and_shape() {
        let policy = CapabilityPolicy::default();

        let found = policy
            .method_capabilities("String", ReceiverShape::Value)
            .collect::<Vec<_>>();
        assert_eq!(found, [Capability::Stringification]);

        let found = policy
            .method_capabilities("String", ReceiverShape::Pointer)
            .collect::<Vec<_>>();
        assert!(found.is_empty());

        // `UnmarshalJSON` contains `MarshalJSON`, but only with a pointer
        // receiver does it match either rule
        let found = policy
            .method_capabilities("UnmarshalJSON", ReceiverShape::Pointer)
            .collect::<Vec<_>>();
        assert_eq!(found, [Capability::Unmarshal]);
    }

    #[test]
    fn variables_must_mention_the_type() {
        let policy = CapabilityPolicy::default();

        let found = policy
            .variable_capabilities("WeekDay", "defWeekDayValueToName")
            .collect::<Vec<_>>();
        assert_eq!(found, [Capability::LookupByValue]);

        assert_eq!(
            policy
                .variable_capabilities("WeekDay", "defShirtSizeValueToName")
                .count(),
            0
        );
    }

    #[test]
    fn capabilities_serialize_in_kebab_case() {
        #[derive(Serialize)]
        struct Wrapper {
            capability: Capability,
        }

        let text = toml::to_string(&Wrapper {
            capability: Capability::LookupByName,
        })
        .unwrap();

        assert_eq!(text.trim(), "capability = \"lookup-by-name\"");
    }
}
