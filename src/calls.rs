//! Call detector (`spec.md` §4.3).
//!
//! Given a macro body, yields the ordered list of nested macro calls,
//! filtering out terminal policy statements, non-expandable directives, and
//! calls that occur inside a comment line.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords that are statements or directives, never macro calls, even
/// though they match the call-like `name(args)` shape.
pub const TERMINAL_KEYWORDS: &[&str] = &[
    "allow",
    "dontaudit",
    "auditallow",
    "neverallow",
    "type_transition",
    "type_change",
    "type_member",
    "role_transition",
    "range_transition",
    "gen_require",
    "optional_policy",
    "tunable_policy",
    "require",
    "type",
    "role",
    "attribute",
    "bool",
    "ifdef",
    "ifndef",
    "refpolicywarn",
];

/// Lines admitted as leaves when they fall between two detected calls
/// (`spec.md` §4.6 "leaf-admission rule").
pub const LEAF_LEADING_KEYWORDS: &[&str] = &[
    "allow",
    "dontaudit",
    "auditallow",
    "neverallow",
    "type_transition",
    "type_change",
    "type_member",
    "role_transition",
];

static CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\w+)\(([^)]*)\)").unwrap());

/// A single detected call: name, positional argument strings, and the byte
/// span of the whole `name(args)` text within the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedCall {
    pub name: String,
    pub args: Vec<String>,
    pub start: usize,
    pub end: usize,
}

fn line_prefix_is_comment(body: &str, match_start: usize) -> bool {
    let line_start = body[..match_start]
        .rfind('\n')
        .map(|i| i + 1)
        .unwrap_or(0);
    let prefix = body[line_start..match_start].trim_start();
    prefix.starts_with('#')
}

fn split_args(raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|s| s.trim().to_string()).collect()
}

/// Detects every nested macro call in `body`, in source order.
///
/// Note the deliberate limitation (`spec.md` §4.3, §9): arguments cannot
/// themselves contain parentheses, since the call regex stops at the first
/// `)`. Recursive argument parsing is not implemented.
pub fn detect_calls(body: &str) -> Vec<DetectedCall> {
    let mut calls = Vec::new();
    for caps in CALL.captures_iter(body) {
        let whole = caps.get(0).unwrap();
        let name = &caps[1];

        if TERMINAL_KEYWORDS.contains(&name) {
            continue;
        }
        if line_prefix_is_comment(body, whole.start()) {
            continue;
        }

        calls.push(DetectedCall {
            name: name.to_string(),
            args: split_args(&caps[2]),
            start: whole.start(),
            end: whole.end(),
        });
    }
    calls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_a_single_nested_call() {
        let body = "allow $1 self:process signal;\nmy_macro($1, $2)\n";
        let calls = detect_calls(body);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "my_macro");
        assert_eq!(calls[0].args, vec!["$1", "$2"]);
    }

    #[test]
    fn terminal_keywords_are_not_calls() {
        let body = "allow($1, $2)\ntype_transition($1, $2)\n";
        let calls = detect_calls(body);
        assert!(calls.is_empty());
    }

    #[test]
    fn calls_inside_comments_are_skipped() {
        let body = "# example: foo(a, b)\nbar(c, d);\n";
        let calls = detect_calls(body);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "bar");
    }

    #[test]
    fn empty_arg_list_yields_empty_args() {
        let body = "no_args()\n";
        let calls = detect_calls(body);
        assert_eq!(calls.len(), 1);
        assert!(calls[0].args.is_empty());
    }

    #[test]
    fn whitespace_only_args_yield_empty_args() {
        let body = "no_args(   )\n";
        let calls = detect_calls(body);
        assert!(calls[0].args.is_empty());
    }

    #[test]
    fn preserves_source_order() {
        let body = "first($1)\nsecond($2)\n";
        let calls = detect_calls(body);
        assert_eq!(calls[0].name, "first");
        assert_eq!(calls[1].name, "second");
        assert!(calls[0].start < calls[1].start);
    }
}
