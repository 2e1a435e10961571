//! The externally-visible error surface of the engine and its CLI glue.
//!
//! Per the engine's failure semantics, most degenerate input is absorbed
//! internally (an unmatched quoted block is silently dropped, an unresolved
//! call becomes an opaque leaf, a blown recursion budget produces a sentinel
//! leaf). `SemacroError` only covers the handful of cases that are genuinely
//! reportable to a human: a name that isn't in the index, a regex the user
//! typed wrong, and the include-path discovery failures the CLI hits before
//! the engine ever runs.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SemacroError {
    #[error("macro '{name}' not found{}", suggestion.as_ref().map(|s| format!(" (did you mean '{s}'?)")).unwrap_or_default())]
    #[diagnostic(code(semacro::not_found))]
    NotFound {
        name: String,
        suggestion: Option<String>,
    },

    #[error("invalid regex '{pattern}': {source}")]
    #[diagnostic(code(semacro::invalid_regex))]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "cannot find SELinux policy include directory.\n  \
         Options:\n    \
         1. Install selinux-policy-devel (provides the default path)\n    \
         2. export SEMACRO_INCLUDE_PATH=/path/to/policy  (add to ~/.bashrc)\n    \
         3. semacro --include-path /path/to/policy ..."
    )]
    #[diagnostic(code(semacro::include_path_missing))]
    IncludePathMissing,

    #[error("include path '{0}' does not exist")]
    #[diagnostic(code(semacro::include_path_not_dir))]
    IncludePathNotDir(PathBuf),

    #[error("no macros found under '{0}'")]
    #[diagnostic(code(semacro::no_macros_found))]
    NoMacrosFound(PathBuf),

    #[error("no macros matching '{0}'")]
    #[diagnostic(code(semacro::no_matches))]
    NoMatches(String),

    #[error("no macros found for category '{0}'")]
    #[diagnostic(code(semacro::no_category_matches))]
    NoCategoryMatches(String),

    #[error("{0}")]
    #[diagnostic(code(semacro::invalid_arguments))]
    InvalidArguments(String),
}

pub type Result<T> = std::result::Result<T, SemacroError>;
