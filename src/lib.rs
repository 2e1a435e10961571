//! `semacro`: explore and expand SELinux-style policy macros, interfaces,
//! and templates.
//!
//! The engine is a small pipeline: [`scan`] finds quoted macro-processor
//! definitions in raw source text, [`index`] walks a policy tree and
//! indexes them by name, [`calls`] and [`subst`] drive the recursive
//! [`expand`]er, [`inline`] handles parameterless `define` inlining and
//! brace-set flattening, [`canon`] turns an expansion tree into the
//! deduplicated rule list, [`rules`] parses those rule lines back out for
//! matching, and [`search`] implements the `which` reverse lookup. The
//! `cli` module and `main.rs` are glue on top; none of it is required to
//! use the engine as a library.

pub mod calls;
pub mod canon;
pub mod cli;
pub mod definition;
pub mod discovery;
pub mod error;
pub mod expand;
pub mod index;
pub mod inline;
pub mod rules;
pub mod scan;
pub mod search;
pub mod subst;

pub use definition::{MacroDefinition, MacroKind};
pub use error::{Result, SemacroError};
pub use index::Index;

/// Every macro in `index` whose body contains a detected call to `name`
/// (`spec.md` §6's `callers` command), sorted by name.
pub fn find_callers<'a>(index: &'a Index, name: &str) -> Vec<&'a str> {
    let mut callers: Vec<&str> = index
        .iter()
        .filter(|(_, def)| calls::detect_calls(&def.body).iter().any(|c| c.name == name))
        .map(|(caller_name, _)| caller_name)
        .collect();
    callers.sort_unstable();
    callers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn find_callers_lists_macros_that_call_the_target() {
        let files = [
            (
                PathBuf::from("a.if"),
                "interface(`outer',`\ninner($1)\n')\n",
            ),
            (PathBuf::from("b.if"), "interface(`inner',`allow a b:file read;')\n"),
            (PathBuf::from("c.if"), "interface(`unrelated',`allow c d:file read;')\n"),
        ];
        let index = index::build_index_from_sources(&files);
        assert_eq!(find_callers(&index, "inner"), vec!["outer"]);
    }
}
