//! Quoted-block scanner (`spec.md` §4.1).
//!
//! The macro processor quotes strings with a backtick-apostrophe pair that
//! nests: `` `...' ``. A definition has the shape
//! `` <kind>(`<name>',`<body>') `` where `<kind>` is one of `interface`,
//! `template`, `define`. This module finds every such header at the start
//! of a line and scans forward from the body's opening backtick, tracking
//! nesting depth, to find the matching closing apostrophe.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::definition::MacroKind;

/// One definition found in a source file, before it is attached to a
/// source path (the indexer adds `source_file`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedDefinition {
    pub kind: MacroKind,
    pub name: String,
    pub body: String,
    pub line_number: usize,
}

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(interface|template|define)\(\s*`([^']+)'\s*,\s*`").unwrap()
});

/// Finds the index of the closing apostrophe matching the backtick opened
/// just before `start`. `depth` begins at 1 (the opening backtick already
/// consumed). Every further backtick increments depth, every apostrophe
/// decrements it; the scanner returns the position where depth reaches 0.
///
/// As documented in `spec.md` §9, this decrements on *any* apostrophe,
/// including ones inside comments or identifiers — intentional, since real
/// policy macros don't use bare apostrophes outside of quoting.
fn find_block_end(text: &[u8], start: usize) -> Option<usize> {
    let mut depth: i32 = 1;
    let mut i = start;
    while i < text.len() {
        match text[i] {
            b'`' => depth += 1,
            b'\'' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Scans `text` for every top-level macro-processor definition.
///
/// Unmatched quoted blocks are silently dropped, per `spec.md` §4.1 and §7:
/// malformed input is absorbed at parse time, not reported.
pub fn scan(text: &str) -> Vec<ScannedDefinition> {
    let bytes = text.as_bytes();
    let mut results = Vec::new();

    for caps in HEADER.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let kind = MacroKind::from_keyword(&caps[1]).expect("regex only matches known keywords");
        let name = caps[2].to_string();
        let body_start = whole.end();

        let Some(body_end) = find_block_end(bytes, body_start) else {
            continue;
        };

        let mut body = text[body_start..body_end].to_string();
        if body.starts_with('\n') {
            body.remove(0);
        }
        if body.ends_with('\n') {
            body.pop();
        }

        let line_number = text[..whole.start()].matches('\n').count() + 1;

        results.push(ScannedDefinition {
            kind,
            name,
            body,
            line_number,
        });
    }

    results
}
