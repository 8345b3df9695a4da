//! File wrapper types and ingest utilities.

use std::{fs, io, path::Path, sync::Arc};

/// Creates a fake [`SourceFile`] with the given contents.
#[macro_export]
macro_rules! fake_file {
    ($s:expr) => {
        $crate::source_file::SourceFile::fake(
            $crate::source_file::FileName::Fake {
                file: file!(),
                line: line!(),
            },
            String::from($s),
        )
    };
}

/// A Go source file.
///
/// Source files are relatively cheap to clone, since they store their
/// contents as an `Arc<str>`. The most expensive part of the clone impl is
/// therefore usually the copying of the `path` (if it is [`FileName::Real`]).
#[derive(Clone)]
pub struct SourceFile {
    path: FileName,
    contents: Arc<str>,
}

impl SourceFile {
    pub fn new(path: impl Into<Box<Path>>) -> io::Result<Self> {
        let path = path.into();
        let contents = fs::read_to_string(&path)?.into();
        let path = FileName::Real(path);

        Ok(Self { path, contents })
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn name(&self) -> &FileName {
        &self.path
    }

    pub fn path_ref(&self) -> Option<&Path> {
        match &self.path {
            FileName::Real(path) => Some(path),
            FileName::Fake { .. } => None,
        }
    }

    /// Returns the slice of the contents covered by `range`, or the empty
    /// string if `range` does not fall on character boundaries.
    pub fn slice(&self, range: std::ops::Range<usize>) -> &str {
        self.contents.get(range).unwrap_or_default()
    }

    /// Creates a fake file with the given path and contents.
    ///
    /// Prefer using the [`fake_file!`] macro, since it generates a fake
    /// path based on the source location it's used in.
    #[allow(unused)]
    pub fn fake(path: FileName, contents: impl Into<Arc<str>>) -> Self {
        let contents = contents.into();
        Self { path, contents }
    }
}

impl std::fmt::Debug for SourceFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let contents =
            format!("... {{{:.3}KiB}}", (self.contents.len() as f64) / 1024f64);
        f.debug_struct("File")
            .field("path", &self.path)
            .field("contents", &contents)
            .finish()
    }
}

#[derive(Clone)]
pub enum FileName {
    Real(Box<Path>),
    Fake { file: &'static str, line: u32 },
}

impl std::fmt::Debug for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(path) => write!(f, "{:?}", path),
            Self::Fake { file, line } => {
                write!(f, "{{fake file in {} (line {})}}", file, line)
            }
        }
    }
}

impl std::fmt::Display for FileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Real(path) => write!(f, "{}", path.display()),
            Self::Fake { file, line } => write!(f, "<fake:{file}:{line}>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_display_impl() {
        let real = FileName::Real(Path::new("/tmp/foo/bar.go").into());
        let fake = FileName::Fake {
            file: "src/lib.rs",
            line: 12,
        };

        assert_eq!(real.to_string(), "/tmp/foo/bar.go");
        assert_eq!(fake.to_string(), "<fake:src/lib.rs:12>");
    }

    #[test]
    fn fake_files_have_no_path() {
        let file = fake_file!("package p\n");
        assert!(file.path_ref().is_none());
        assert_eq!(file.slice(0..7), "package");
        assert_eq!(file.slice(0..100), "");
    }
}
