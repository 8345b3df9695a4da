//! The analyses run against a [`LoadedPackage`](crate::package::LoadedPackage).
//!
//! Each analysis is a pure function of the package and a type name:
//!
//! - [`values_of_type`] collects the constants of an enumerated integer
//!   type, together with the companions that already exist for it;
//! - [`find_structure_spec`] collects the fields of a struct type;
//! - [`parse_tag`] decodes the tag of a single struct field.

pub mod companion;
pub mod structure;
pub mod tag;
pub mod values;

pub use companion::{CompanionDetector, ExclusionSet};
pub use structure::{StructureSpec, find_structure_spec};
pub use tag::{TagMap, TagSyntaxError, parse_tag};
pub use values::{ExtractError, InspectError, TypeValues, values_of_type};
