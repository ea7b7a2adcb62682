//! Candidate file paths for an identifier.

use std::path::PathBuf;

use super::inflect::underscore;

/// Conventional source subdirectories, in probe priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subdir {
    Models,
    Controllers,
    Lib,
}

impl Subdir {
    pub const PRIORITY: [Subdir; 3] = [Subdir::Models, Subdir::Controllers, Subdir::Lib];

    pub fn as_str(&self) -> &'static str {
        match self {
            Subdir::Models => "models",
            Subdir::Controllers => "controllers",
            Subdir::Lib => "lib",
        }
    }
}

/// `<subdir>/<seg1>/<seg2>/.../<segN>.<extension>`, each segment in path
/// casing. `None` for an empty segment list.
pub fn candidate_path(segments: &[String], subdir: Subdir, extension: &str) -> Option<PathBuf> {
    let (last, parents) = segments.split_last()?;
    let mut path = PathBuf::from(subdir.as_str());
    for segment in parents {
        path.push(underscore(segment));
    }
    path.push(format!("{}.{}", underscore(last), extension));
    Some(path)
}
