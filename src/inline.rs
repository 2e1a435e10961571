//! Define inliner and brace flattener (`spec.md` §4.5).
//!
//! Applied to each leaf line after expansion: inlines argument-free
//! `define` bodies referenced by name, then collapses nested permission
//! brace sets and runs of whitespace.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::definition::MacroKind;
use crate::index::Index;

const MAX_INLINE_ITERATIONS: usize = 5;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").unwrap());
static NESTED_BRACES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]*)\{([^{}]*)\}([^{}]*)\}").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").unwrap());

/// Repeats up to `MAX_INLINE_ITERATIONS` times or until no change: finds
/// the first whole-word identifier naming a parameterless `define`, and
/// replaces it with that define's trimmed body. The iteration cap bounds
/// transitive expansion and prevents runaway on pathological data.
///
/// Defines whose body contains a `$` token are parameterised and are not
/// eligible — those must go through the full expander instead.
pub fn inline_defines(line: &str, index: &Index) -> String {
    let mut current = line.to_string();
    for _ in 0..MAX_INLINE_ITERATIONS {
        let Some(replaced) = inline_one_pass(&current, index) else {
            break;
        };
        if replaced == current {
            break;
        }
        current = replaced;
    }
    current
}

fn inline_one_pass(line: &str, index: &Index) -> Option<String> {
    for m in IDENTIFIER.find_iter(line) {
        let name = m.as_str();
        let Some(def) = index.get(name) else {
            continue;
        };
        if def.kind != MacroKind::Define || def.body.contains('$') {
            continue;
        }
        let mut out = String::with_capacity(line.len());
        out.push_str(&line[..m.start()]);
        out.push_str(def.body.trim());
        out.push_str(&line[m.end()..]);
        return Some(out);
    }
    None
}

/// While the line contains a brace set with a nested brace set
/// (`{ X { Y } Z }`), collapses it to `{ X Y Z }`; finally collapses runs
/// of two-or-more whitespace to a single space.
pub fn flatten_braces(line: &str) -> String {
    let mut current = line.to_string();
    loop {
        let Some(caps) = NESTED_BRACES.captures(&current) else {
            break;
        };
        let whole = caps.get(0).unwrap();
        let parts: Vec<&str> = [caps.get(1).unwrap().as_str(), caps.get(2).unwrap().as_str(), caps.get(3).unwrap().as_str()]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        let collapsed = format!("{{ {} }}", parts.join(" "));
        let mut out = String::with_capacity(current.len());
        out.push_str(&current[..whole.start()]);
        out.push_str(&collapsed);
        out.push_str(&current[whole.end()..]);
        current = out;
    }
    WHITESPACE_RUN.replace_all(&current, " ").into_owned()
}

/// Applies inlining then flattening, matching the order `spec.md` §4.6
/// applies them to each leaf line.
pub fn inline_and_flatten(line: &str, index: &Index) -> String {
    let inlined = inline_defines(line, index);
    flatten_braces(&inlined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn index_with(defines: &[(&str, &str)]) -> Index {
        let mut text = String::new();
        for (name, body) in defines {
            text.push_str(&format!("define(`{name}',`{body}')\n"));
        }
        crate::index::build_index_from_sources(&[(PathBuf::from("support/x.spt"), &text)])
    }

    #[test]
    fn scenario_e_inlines_and_flattens() {
        let index = index_with(&[("read_file_perms", "{ getattr open read }")]);
        let out = inline_and_flatten("allow s t:file read_file_perms;", &index);
        assert_eq!(out, "allow s t:file { getattr open read };");
    }

    #[test]
    fn parameterised_defines_are_not_eligible() {
        let index = index_with(&[("parm", "{ $1 }")]);
        let out = inline_defines("allow s t:file parm;", &index);
        assert_eq!(out, "allow s t:file parm;");
    }

    #[test]
    fn transitive_inlining_up_to_cap() {
        let index = index_with(&[("a", "b"), ("b", "c"), ("c", "done")]);
        let out = inline_defines("use a here", &index);
        assert_eq!(out, "use done here");
    }

    #[test]
    fn flatten_collapses_one_level_of_nesting() {
        let out = flatten_braces("allow s t:file { read { write } append };");
        assert_eq!(out, "allow s t:file { read write append };");
    }

    #[test]
    fn flatten_collapses_whitespace_runs() {
        let out = flatten_braces("allow  s   t:file  {  read  };");
        assert_eq!(out, "allow s t:file { read };");
    }

    #[test]
    fn flatten_is_idempotent() {
        let once = flatten_braces("allow s t:file { read { write } };");
        let twice = flatten_braces(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_output_contains_nested_braces_or_double_spaces() {
        let out = flatten_braces("{ a { b { c } d } e }");
        assert!(!out.contains("{ ") || !out.contains("{ {"));
        assert!(!out.contains("  "));
    }
}
