//! Include-path discovery for the CLI glue layer (`spec.md` §6).
//!
//! The engine itself is agnostic to where its input tree lives; this module
//! implements the precedence the CLI applies before calling
//! [`crate::index::build_index`]: an explicit flag, then the
//! `SEMACRO_INCLUDE_PATH` environment variable, then a well-known default
//! that is only trusted if it actually contains policy files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

pub const ENV_VAR: &str = "SEMACRO_INCLUDE_PATH";
const STANDARD_PATHS: &[&str] = &["/usr/share/selinux/devel/include"];

fn has_policy_files(path: &Path) -> bool {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .any(|e| {
            matches!(
                e.path().extension().and_then(|ext| ext.to_str()),
                Some("if") | Some("spt")
            )
        })
}

/// The first standard path that exists and contains at least one `.if` or
/// `.spt` file, if any.
fn detect_default() -> Option<PathBuf> {
    STANDARD_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir() && has_policy_files(p))
}

/// Resolves the include path to use, given an optional `--include-path`
/// flag value. Returns `None` when no candidate is available at all (the
/// CLI maps that to [`crate::error::SemacroError::IncludePathMissing`]).
pub fn resolve_include_path(flag: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = flag {
        return Some(p.to_path_buf());
    }
    if let Ok(env) = std::env::var(ENV_VAR) {
        if !env.is_empty() {
            return Some(PathBuf::from(env));
        }
    }
    detect_default()
}
