//! Resolution of `accumulate` directives.
//!
//! A [`Loader`] turns the name written in an `accumulate` declaration into
//! source text. The parser digests the text and skips units whose digest was
//! already seen in the session, so loaders never deduplicate themselves.

use crate::ParseError;
use indexmap::IndexMap;
use lprolog_ast::Loc;
use std::path::{Path, PathBuf};

/// Extension tried when a unit name has none.
pub const SOURCE_EXTENSION: &str = "lp";

/// A resolved source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Name reported in locations; for files, the resolved path.
    pub name: String,
    pub text: String,
}

pub trait Loader {
    /// Resolves `name`, written at `loc`, to a source unit.
    fn load(&mut self, loc: &Loc, name: &str) -> Result<Source, ParseError>;
}

/// Rejects every `accumulate`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoader;

impl Loader for NoLoader {
    fn load(&mut self, loc: &Loc, name: &str) -> Result<Source, ParseError> {
        Err(ParseError::Load {
            loc: loc.clone(),
            name: name.into(),
            message: "accumulation is disabled".into(),
        })
    }
}

/// Units held in memory, looked up by name or by name plus `.lp`.
#[derive(Debug, Default, Clone)]
pub struct MemoryLoader {
    units: IndexMap<String, String>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a unit, replacing any previous text under `name`.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        self.units.insert(name.into(), text.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.units.get(name).map(String::as_str)
    }
}

impl Loader for MemoryLoader {
    fn load(&mut self, loc: &Loc, name: &str) -> Result<Source, ParseError> {
        let with_ext = format!("{name}.{SOURCE_EXTENSION}");
        for candidate in [name, with_ext.as_str()] {
            if let Some(text) = self.units.get(candidate) {
                return Ok(Source {
                    name: candidate.to_string(),
                    text: text.clone(),
                });
            }
        }
        Err(ParseError::Load {
            loc: loc.clone(),
            name: name.into(),
            message: "no such unit".into(),
        })
    }
}

/// Units read from the file system.
///
/// Relative names are tried against the directory of the accumulating unit,
/// then the working directory, then each search path in order. A name
/// without an extension is tried as is and with `.lp`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    cwd: PathBuf,
    paths: Vec<PathBuf>,
}

impl FsLoader {
    pub fn new(cwd: impl Into<PathBuf>, paths: Vec<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            paths,
        }
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Candidate paths for `name`, in lookup order.
    pub fn candidates(&self, from: Option<&Path>, name: &str) -> Vec<PathBuf> {
        let mut files = vec![PathBuf::from(name)];
        if Path::new(name).extension().is_none() {
            files.push(PathBuf::from(format!("{name}.{SOURCE_EXTENSION}")));
        }
        if Path::new(name).is_absolute() {
            return files;
        }
        let mut dirs: Vec<PathBuf> = Vec::new();
        if let Some(dir) = from.and_then(Path::parent) {
            dirs.push(self.cwd.join(dir));
        }
        dirs.push(self.cwd.clone());
        dirs.extend(self.paths.iter().map(|p| self.cwd.join(p)));
        dirs.iter()
            .flat_map(|d| files.iter().map(move |f| d.join(f)))
            .collect()
    }
}

impl Loader for FsLoader {
    fn load(&mut self, loc: &Loc, name: &str) -> Result<Source, ParseError> {
        let from = Path::new(&*loc.source_name);
        let candidates = self.candidates(Some(from), name);
        let Some(path) = candidates.iter().find(|p| p.is_file()) else {
            log::debug!("accumulate {name}: tried {candidates:?}");
            return Err(ParseError::Load {
                loc: loc.clone(),
                name: name.into(),
                message: "file not found".into(),
            });
        };
        let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
            name: path.display().to_string(),
            source,
        })?;
        Ok(Source {
            name: path.display().to_string(),
            text,
        })
    }
}
