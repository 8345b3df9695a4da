//! The primary interface for reading a package directory from disk.

use std::{ffi::OsStr, fs, path::Path};

use log::trace;
use thiserror::Error;

use crate::{check::CheckError, source_file::SourceFile, span::Position};

use super::{GO_FILE_EXTENSION, TEST_FILE_SUFFIX};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read the given path: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load the Tree-sitter grammar for Go: {0}")]
    Language(#[from] tree_sitter::LanguageError),
    #[error("No buildable Go source files in {}", .0.display())]
    NoGoFiles(Box<Path>),
    #[error("No source files were given")]
    NoFiles,
    #[error("Parsing {0} was cancelled")]
    Cancelled(Box<str>),
    #[error("{file}:{position}: syntax error")]
    Syntax { file: Box<str>, position: Position },
    #[error("{0}: expected a package clause")]
    MissingPackageClause(Box<str>),
    #[error("Found packages {first} and {second} in the same directory")]
    MultiplePackages { first: Box<str>, second: Box<str> },
    #[error("Type-checking failed:\n\t{}", join_errors(.0))]
    Check(Vec<CheckError>),
}

fn join_errors(errors: &[CheckError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\t")
}

/// Reads every Go source file directly inside `dir`, in lexical order of
/// their paths. Test files, and files whose names begin with `_` or `.`,
/// are skipped; subdirectories are never entered.
pub fn collect_go_files(dir: &Path) -> std::io::Result<Vec<SourceFile>> {
    let mut paths = Vec::new();

    for entry in fs::read_dir(dir)?.filter_map(Result::ok) {
        if !entry.file_type()?.is_file() {
            continue;
        }

        let path = entry.path();
        match is_go_source(&path) {
            true => paths.push(path),
            false => trace!("skipping {}", path.display()),
        }
    }

    paths.sort();
    paths.into_iter().map(SourceFile::new).collect()
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(OsStr::to_str) else {
        return false;
    };

    path.extension().and_then(OsStr::to_str) == Some(GO_FILE_EXTENSION)
        && !name.starts_with(['_', '.'])
        && !name.ends_with(TEST_FILE_SUFFIX)
}
