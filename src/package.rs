//! Loaded Go packages.

use std::path::Path;

use log::debug;
use tree_sitter::Node;

use crate::{
    check::check,
    cst::{Cst, create_go_parser},
    env::{DefId, Env, FileId, Object},
    source_file::SourceFile,
    symbol::{StringInterner, Symbol},
};

use loader::LoadError;

pub mod loader;

const GO_FILE_EXTENSION: &str = "go";
const TEST_FILE_SUFFIX: &str = "_test.go";

/// A parsed and type-checked Go package.
///
/// A `LoadedPackage` is immutable once constructed, so any number of
/// extractions can be run against it.
#[derive(Debug)]
pub struct LoadedPackage {
    name: Box<str>,
    dir: Option<Box<Path>>,
    files: Vec<Cst>,
    env: Env,
    interner: StringInterner,
}

impl LoadedPackage {
    /// Loads the package in `dir`. See [`loader::collect_go_files`] for
    /// which files are considered part of it.
    pub fn load(dir: impl Into<Box<Path>>) -> Result<Self, LoadError> {
        let dir = dir.into();
        let files = loader::collect_go_files(&dir)?;
        debug!("read {} Go files from {}", files.len(), dir.display());

        match Self::from_files(files) {
            Ok(package) => Ok(Self {
                dir: Some(dir),
                ..package
            }),
            Err(LoadError::NoFiles) => Err(LoadError::NoGoFiles(dir)),
            Err(error) => Err(error),
        }
    }

    /// Builds a package from already-read files, which are processed in the
    /// given order. Files excluded by a `//go:build ignore` constraint are
    /// dropped.
    pub fn from_files(
        files: impl IntoIterator<Item = SourceFile>,
    ) -> Result<Self, LoadError> {
        let mut parser = create_go_parser()?;
        let mut csts = Vec::new();

        for file in files {
            let file_name = file.name().to_string();
            let cst = Cst::parse(&mut parser, file)
                .ok_or_else(|| LoadError::Cancelled(file_name.as_str().into()))?;

            if cst.is_ignored_by_constraint() {
                debug!("skipping {file_name}, which is excluded from every build");
                continue;
            }

            if let Some(position) = cst.first_error() {
                return Err(LoadError::Syntax {
                    file: file_name.into(),
                    position,
                });
            }

            csts.push(cst);
        }

        let mut name: Option<&str> = None;
        for cst in &csts {
            let Some(package) = cst.package_name() else {
                return Err(LoadError::MissingPackageClause(
                    cst.file().name().to_string().into(),
                ));
            };

            match name {
                Some(first) if first != package => {
                    return Err(LoadError::MultiplePackages {
                        first: first.into(),
                        second: package.into(),
                    });
                }
                _ => name = Some(package),
            }
        }

        let name: Box<str> = name.ok_or(LoadError::NoFiles)?.into();
        let mut interner = StringInterner::new();
        let env = check(&csts, &mut interner).map_err(LoadError::Check)?;

        debug!(
            "loaded package {name} with {} objects from {} files",
            env.objects().count(),
            csts.len()
        );

        Ok(Self {
            name,
            dir: None,
            files: csts,
            env,
            interner,
        })
    }

    /// The name in the package clause of every file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The directory this package was loaded from, if any.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The parsed files of this package, in processing order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &Cst)> + use<'_> {
        self.files
            .iter()
            .enumerate()
            .map(|(index, cst)| (FileId::new(index), cst))
    }

    /// Returns the name of `symbol`, which must have been interned while
    /// loading this package.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        self.interner.resolve(symbol).unwrap_or_default()
    }

    /// Returns the symbol for `name` if any identifier in this package is
    /// spelled that way.
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.interner.get(name)
    }

    /// Returns the object defined by the identifier `node` in `file`.
    pub fn def(&self, file: FileId, node: Node<'_>) -> Option<&Object> {
        self.env.def(DefId {
            file,
            start: node.start_byte() as u32,
        })
    }
}
