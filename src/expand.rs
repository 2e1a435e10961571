//! Expander (`spec.md` §4.6): recursive macro expansion into a bounded tree.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::calls::{detect_calls, LEAF_LEADING_KEYWORDS};
use crate::inline::inline_and_flatten;
use crate::index::Index;
use crate::subst::substitute;

/// Default recursion ceiling used by `expand`/`show`/`tree` (`spec.md` §4.6).
/// `which` trial-expansion uses a shallower bound (§4.8).
pub const DEFAULT_MAX_DEPTH: usize = 10;

const MAX_DEPTH_SENTINEL: &str = "... (max depth reached)";
const EMPTY_BODY_SENTINEL: &str = "(empty)";

/// A node in an expansion tree (`spec.md` §3). Internal nodes own an
/// ordered list of children and are labelled with the canonical call
/// string that produced them; leaves hold a single rule/text line.
///
/// Leaves never have children; an unresolved call becomes a leaf whose
/// text is its call string rather than an internal node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionNode {
    Internal {
        label: String,
        children: Vec<ExpansionNode>,
    },
    Leaf {
        text: String,
    },
}

impl ExpansionNode {
    pub fn is_leaf(&self) -> bool {
        matches!(self, ExpansionNode::Leaf { .. })
    }

    /// Walks the tree depth-first, collecting every leaf's text in order.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            ExpansionNode::Leaf { text } => out.push(text),
            ExpansionNode::Internal { children, .. } => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
        }
    }

    /// Maximum depth of the tree, root counted as depth 1. Used to check
    /// invariant 1 of `spec.md` §8 (depth of returned tree <= max_depth + 1).
    pub fn depth(&self) -> usize {
        match self {
            ExpansionNode::Leaf { .. } => 1,
            ExpansionNode::Internal { children, .. } => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }
}

/// Renders `name(arg1, arg2, …)`, the canonical call string used both as
/// an internal node's label and as an unresolved call's leaf text.
pub fn canonical_call(name: &str, args: &[String]) -> String {
    format!("{name}({})", args.join(", "))
}

static GEN_REQUIRE_START: Lazy<Regex> = Lazy::new(|| Regex::new(r"gen_require\(`").unwrap());

/// Strips every `gen_require(`…')` block from `body` (`spec.md` §4.6 step 5,
/// §8 invariant 7). These blocks declare symbols required by the macro
/// processor and never yield policy rules. Matching uses the same
/// depth-counting rule as the top-level scanner; an unmatched block is left
/// in place rather than risk removing unrelated trailing text.
fn strip_gen_require_blocks(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut rest = body;
    loop {
        let Some(m) = GEN_REQUIRE_START.find(rest) else {
            out.push_str(rest);
            break;
        };
        let bytes = rest.as_bytes();
        let quote_start = m.end();
        let Some(quote_end) = find_quote_end(bytes, quote_start) else {
            // Unmatched block: keep everything up to and including this
            // occurrence, then continue scanning after it.
            out.push_str(&rest[..m.end()]);
            rest = &rest[m.end()..];
            continue;
        };
        // Consume the trailing ')' that closes gen_require(...) if present.
        let after_quote = quote_end + 1;
        let end = if rest.as_bytes().get(after_quote) == Some(&b')') {
            after_quote + 1
        } else {
            after_quote
        };
        out.push_str(&rest[..m.start()]);
        rest = &rest[end..];
    }
    out
}

fn find_quote_end(text: &[u8], start: usize) -> Option<usize> {
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

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// All non-blank, non-comment lines become leaves unconditionally — used
/// for a body with no nested calls (`spec.md` §4.6 step 6). Never empty:
/// a body that is entirely blank/comment/stripped still needs a child to
/// satisfy invariant 2 of `spec.md` §8 (every node is a leaf or has ≥1
/// child), so it falls back to a single placeholder leaf.
fn unconditional_leaves(segment: &str, index: &Index) -> Vec<ExpansionNode> {
    let leaves: Vec<ExpansionNode> = segment
        .lines()
        .filter(|l| !is_blank_or_comment(l))
        .map(|l| ExpansionNode::Leaf {
            text: inline_and_flatten(l.trim(), index),
        })
        .collect();
    if leaves.is_empty() {
        vec![ExpansionNode::Leaf {
            text: EMPTY_BODY_SENTINEL.to_string(),
        }]
    } else {
        leaves
    }
}

fn is_admitted_leaf_line(trimmed: &str) -> bool {
    trimmed.ends_with(';')
        || LEAF_LEADING_KEYWORDS
            .iter()
            .any(|kw| trimmed.starts_with(kw))
}

/// Text between two detected calls is filtered by the leaf-admission rule
/// (`spec.md` §4.6) rather than admitted unconditionally.
fn admitted_leaves(segment: &str, index: &Index) -> Vec<ExpansionNode> {
    segment
        .lines()
        .filter(|l| !is_blank_or_comment(l))
        .filter(|l| is_admitted_leaf_line(l.trim()))
        .map(|l| ExpansionNode::Leaf {
            text: inline_and_flatten(l.trim(), index),
        })
        .collect()
}

/// Expands `name` called with `args` into a bounded tree.
///
/// `args = None` means the top-level call supplied no arguments at all
/// (the `show`/`expand` CLI path with no positional args): the raw body is
/// used so `$N` appears verbatim, matching `spec.md` §4.6 step 4. Nested
/// calls discovered during expansion always supply `Some(args)` — even an
/// empty list from a zero-arg call like `foo()` — since the call detector
/// always produces a concrete argument list.
pub fn expand_macro(
    index: &Index,
    name: &str,
    args: Option<&[String]>,
    max_depth: usize,
) -> ExpansionNode {
    expand_inner(index, name, args, 0, max_depth)
}

fn expand_inner(
    index: &Index,
    name: &str,
    args: Option<&[String]>,
    depth: usize,
    max_depth: usize,
) -> ExpansionNode {
    let label = canonical_call(name, args.unwrap_or(&[]));

    if depth >= max_depth {
        return ExpansionNode::Leaf {
            text: MAX_DEPTH_SENTINEL.to_string(),
        };
    }

    let Some(def) = index.get(name) else {
        return ExpansionNode::Leaf { text: label };
    };

    let body = match args {
        Some(a) => substitute(&def.body, a),
        None => def.body.clone(),
    };
    let body = strip_gen_require_blocks(&body);

    let calls = detect_calls(&body);
    if calls.is_empty() {
        return ExpansionNode::Internal {
            label,
            children: unconditional_leaves(&body, index),
        };
    }

    let mut children = Vec::new();
    let mut prev_end = 0usize;
    for call in &calls {
        children.extend(admitted_leaves(&body[prev_end..call.start], index));
        children.push(expand_inner(
            index,
            &call.name,
            Some(&call.args),
            depth + 1,
            max_depth,
        ));
        prev_end = call.end;
    }
    children.extend(admitted_leaves(&body[prev_end..], index));

    ExpansionNode::Internal { label, children }
}
