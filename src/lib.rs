//! Static analysis of Go packages for companion-code generation.
//!
//! A package directory is loaded once into a [`LoadedPackage`], which can
//! then be asked for the constants of an enumerated integer type
//! ([`analysis::values_of_type`]) or the fields of a struct type
//! ([`analysis::find_structure_spec`]). A [`Session`] runs both kinds of
//! analysis with the settings of an [`AnalysisConfig`] and produces the
//! serializable descriptions consumed by code templates.

use thiserror::Error;

pub mod analysis;
pub mod check;
pub mod config;
pub mod constant;
pub mod cst;
pub mod env;
pub mod literal;
pub mod model;
pub mod package;
pub mod policy;
pub mod session;
pub mod source_file;
pub mod span;
pub mod symbol;
pub mod transform;
pub mod ty;

pub use analysis::{ExclusionSet, StructureSpec, TagMap};
pub use config::AnalysisConfig;
pub use model::ModelSpec;
pub use package::LoadedPackage;
pub use policy::{Capability, CapabilityPolicy};
pub use session::{EnumAnalysis, Session, TypeSpec};
pub use transform::{TransformRule, TypeValue};

use analysis::{ExtractError, TagSyntaxError};
use config::ConfigLoadError;
use package::loader::LoadError;

/// The public result type of this crate.
pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parsing package: {0}")]
    Load(#[from] LoadError),
    #[error("{0}")]
    Config(#[from] ConfigLoadError),
    #[error("finding values for type {type_name}: {source}")]
    Values {
        type_name: Box<str>,
        #[source]
        source: ExtractError,
    },
    #[error("reading the tags of {type_name}: {source}")]
    Tag {
        type_name: Box<str>,
        #[source]
        source: TagSyntaxError,
    },
}
