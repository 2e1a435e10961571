//! Rule canonicaliser (`spec.md` §4.7).
//!
//! Walks an expansion tree depth-first, deduplicates leaves while preserving
//! first-seen order, then merges access-vector rules that share a
//! `<kind> <source> <target:class>` header by unioning their permission
//! sets.

use std::collections::HashSet;

use crate::expand::ExpansionNode;
use crate::rules::{parse_av_rule, ParsedAvRule};

/// Canonicalises an expansion tree into the ordered list of output lines
/// described in `spec.md` §3's "Canonical rule" and §4.7.
pub fn canonicalize(tree: &ExpansionNode) -> Vec<String> {
    let deduped = dedupe_preserving_order(tree.leaves());
    canonicalize_lines(&deduped)
}

fn dedupe_preserving_order(leaves: Vec<&str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for leaf in leaves {
        if seen.insert(leaf.to_string()) {
            out.push(leaf.to_string());
        }
    }
    out
}

/// Groups access-vector lines by header, unioning their permission sets,
/// while leaving non-AV lines untouched. Used both by the full
/// tree-canonicalisation entry point and directly by tests covering
/// `spec.md` §8 Scenario D against a bare leaf list.
pub fn canonicalize_lines(lines: &[String]) -> Vec<String> {
    struct Group {
        position: usize,
        kind: String,
        source: String,
        target_class: String,
        perms: Vec<String>,
        perms_seen: HashSet<String>,
    }

    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    let mut non_av: Vec<(usize, String)> = Vec::new();

    for (position, line) in lines.iter().enumerate() {
        match parse_av_rule(line) {
            Some(ParsedAvRule {
                kind,
                source,
                target_class,
                perms,
            }) => {
                let key = format!("{kind} {source} {target_class}");
                if let Some(&idx) = group_index.get(&key) {
                    let group = &mut groups[idx];
                    for p in perms {
                        if group.perms_seen.insert(p.clone()) {
                            group.perms.push(p);
                        }
                    }
                } else {
                    let mut perms_seen = HashSet::new();
                    let mut unique_perms = Vec::new();
                    for p in perms {
                        if perms_seen.insert(p.clone()) {
                            unique_perms.push(p);
                        }
                    }
                    group_index.insert(key, groups.len());
                    groups.push(Group {
                        position,
                        kind,
                        source,
                        target_class,
                        perms: unique_perms,
                        perms_seen,
                    });
                }
            }
            None => non_av.push((position, line.clone())),
        }
    }

    let mut assembled: Vec<(usize, String)> = non_av;
    for group in groups {
        let rendered = format!(
            "{} {} {} {{ {} }};",
            group.kind,
            group.source,
            group.target_class,
            group.perms.join(" ")
        );
        assembled.push((group.position, rendered));
    }
    assembled.sort_by_key(|(pos, _)| *pos);
    assembled.into_iter().map(|(_, line)| line).collect()
}
