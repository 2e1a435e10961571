//! Search driver (`which`, `spec.md` §4.8).
//!
//! Trial-expands candidate macros with constructed arguments and matches
//! the resulting canonical rules against a requested access or type
//! transition.

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::canon::canonicalize;
use crate::definition::MacroKind;
use crate::expand::{canonical_call, expand_macro};
use crate::index::Index;
use crate::rules::{parse_av_rule, parse_transition_rule};

/// Trial-expansion uses a shallower depth bound than `expand`/`show`
/// (`spec.md` §4.8).
pub const WHICH_MAX_DEPTH: usize = 5;

/// Class guesses tried in transition-mode trials (`spec.md` §4.8).
const CLASS_GUESSES: &[&str] = &["file", "dir", "sock_file", "lnk_file"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub name: String,
    pub signature: String,
    pub source_file: PathBuf,
    pub line_number: usize,
}

static DOLLAR_N: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Highest `N` appearing in any `$N` token in `body` (0 if none) —
/// the macro's presumed arity (`spec.md` §4.8).
fn estimate_arity(body: &str) -> usize {
    DOLLAR_N
        .captures_iter(body)
        .filter_map(|c| c[1].parse::<usize>().ok())
        .max()
        .unwrap_or(0)
}

/// Truncates or right-pads `trial` with empty strings to exactly `arity`
/// elements.
fn fit_to_arity(trial: &[String], arity: usize) -> Vec<String> {
    if trial.len() >= arity {
        trial[..arity].to_vec()
    } else {
        let mut out = trial.to_vec();
        out.resize(arity, String::new());
        out
    }
}

/// A candidate is eligible if it is not a parameterless `define` (those
/// only ever name permission sets, never expand into rules worth
/// trial-matching) and its body or name contains every `needle`.
fn is_candidate<'a>(
    name: &str,
    def: &crate::definition::MacroDefinition,
    needles: impl Iterator<Item = &'a str>,
) -> bool {
    if def.kind == MacroKind::Define && !def.body.contains('$') {
        return false;
    }
    for needle in needles {
        if !def.body.contains(needle) && !name.contains(needle) {
            return false;
        }
    }
    true
}

/// Access-vector search: `which --source S --target T --perms "p1 p2" [--class C]`.
pub fn which_access_vector(
    index: &Index,
    source: &str,
    target: &str,
    perms: &[String],
    class_filter: Option<&str>,
) -> Vec<SearchResult> {
    let mut results = Vec::new();

    let mut names: Vec<&str> = index.iter().map(|(n, _)| n).collect();
    names.sort_unstable();

    for name in names {
        let def = index.get(name).expect("name came from iter()");
        if !is_candidate(name, def, std::iter::once(target)) {
            continue;
        }

        let arity = estimate_arity(&def.body);
        let trial = fit_to_arity(
            &[source.to_string(), target.to_string(), perms.join(" ")],
            arity,
        );

        let tree = expand_macro(index, name, Some(&trial), WHICH_MAX_DEPTH);
        let rules = canonicalize(&tree);
        if rules.is_empty() {
            continue;
        }

        let matched = rules.iter().any(|rule| {
            let Some(parsed) = parse_av_rule(rule) else {
                return false;
            };
            if parsed.source != source {
                return false;
            }
            let Some((rule_target, rule_class)) = parsed.target_class.split_once(':') else {
                return false;
            };
            if rule_target != target {
                return false;
            }
            if let Some(class) = class_filter {
                if rule_class != class {
                    return false;
                }
            }
            let rule_perms: std::collections::HashSet<&str> =
                parsed.perms.iter().map(|s| s.as_str()).collect();
            perms.iter().all(|p| rule_perms.contains(p.as_str()))
        });

        if matched {
            results.push(SearchResult {
                name: name.to_string(),
                signature: canonical_call(name, &trial),
                source_file: def.source_file.clone(),
                line_number: def.line_number,
            });
        }
    }

    results.sort_by(|a, b| a.name.cmp(&b.name));
    results.dedup_by(|a, b| a.name == b.name);
    results
}

/// Builds the ordered list of transition-mode trial argument vectors for a
/// given arity, per `spec.md` §4.8.
fn transition_trials(source: &str, parent: &str, new_type: &str, arity: usize) -> Vec<Vec<String>> {
    let s = source.to_string();
    let p = parent.to_string();
    let t = new_type.to_string();

    let raw: Vec<Vec<String>> = match arity {
        0 | 1 => vec![vec![s]],
        2 => vec![vec![s.clone(), t], vec![s, p]],
        3 => {
            let mut trials: Vec<Vec<String>> = CLASS_GUESSES
                .iter()
                .map(|c| vec![s.clone(), t.clone(), c.to_string()])
                .collect();
            trials.push(vec![s, p, t]);
            trials
        }
        _ => {
            let mut trials: Vec<Vec<String>> = Vec::new();
            for c in CLASS_GUESSES {
                trials.push(vec![s.clone(), t.clone(), c.to_string()]);
            }
            for c in CLASS_GUESSES {
                trials.push(vec![s.clone(), p.clone(), t.clone(), c.to_string()]);
            }
            trials.push(vec![s.clone(), t.clone()]);
            trials.push(vec![s.clone(), p.clone(), t.clone()]);
            trials
        }
    };

    raw.into_iter().map(|t| fit_to_arity(&t, arity)).collect()
}

/// Type-transition search: `which --source S --parent P --new-type T [--class C]`.
pub fn which_transition(
    index: &Index,
    source: &str,
    parent: &str,
    new_type: &str,
    class_filter: Option<&str>,
) -> Vec<SearchResult> {
    let mut results = Vec::new();

    let mut names: Vec<&str> = index.iter().map(|(n, _)| n).collect();
    names.sort_unstable();

    for name in names {
        let def = index.get(name).expect("name came from iter()");
        if !is_candidate(name, def, [parent, new_type].into_iter()) {
            continue;
        }

        let arity = estimate_arity(&def.body);
        let trials = transition_trials(source, parent, new_type, arity);

        let Some((winning_trial, rules)) = trials.into_iter().find_map(|trial| {
            let tree = expand_macro(index, name, Some(&trial), WHICH_MAX_DEPTH);
            let rules = canonicalize(&tree);
            if rules.is_empty() {
                None
            } else {
                Some((trial, rules))
            }
        }) else {
            continue;
        };

        let matched = rules.iter().any(|rule| {
            let Some(parsed) = parse_transition_rule(rule) else {
                return false;
            };
            if parsed.source != source || parsed.parent != parent || parsed.new_type != new_type {
                return false;
            }
            if let Some(class) = class_filter {
                if parsed.class != class {
                    return false;
                }
            }
            true
        });

        if matched {
            results.push(SearchResult {
                name: name.to_string(),
                signature: canonical_call(name, &winning_trial),
                source_file: def.source_file.clone(),
                line_number: def.line_number,
            });
        }
    }

    results.sort_by(|a, b| a.name.cmp(&b.name));
    results.dedup_by(|a, b| a.name == b.name);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn index_with(files: &[(&str, &str)]) -> Index {
        let owned: Vec<(PathBuf, &str)> = files.iter().map(|(p, t)| (PathBuf::from(p), *t)).collect();
        crate::index::build_index_from_sources(&owned)
    }

    #[test]
    fn scenario_f_which_av_finds_matching_macro() {
        let index = index_with(&[(
            "a.if",
            "interface(`grant_read',` allow $1 $2:file { read open getattr }; ')\n",
        )]);
        let results = which_access_vector(
            &index,
            "A",
            "B",
            &["read".to_string()],
            None,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "grant_read");
        assert_eq!(results[0].signature, "grant_read(A, B)");
    }

    #[test]
    fn scenario_f_which_av_rejects_unmatched_permission() {
        let index = index_with(&[(
            "a.if",
            "interface(`grant_read',` allow $1 $2:file { read open getattr }; ')\n",
        )]);
        let results = which_access_vector(
            &index,
            "A",
            "B",
            &["write".to_string()],
            None,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn class_filter_narrows_av_matches() {
        let index = index_with(&[(
            "a.if",
            "interface(`grant_read',` allow $1 $2:dir { read }; ')\n",
        )]);
        let results = which_access_vector(
            &index,
            "A",
            "B",
            &["read".to_string()],
            Some("file"),
        );
        assert!(results.is_empty());
    }

    #[test]
    fn parameterless_defines_are_excluded_from_candidates() {
        let index = index_with(&[("a.spt", "define(`read_file_perms',` { getattr open read }')\n")]);
        let results = which_access_vector(&index, "A", "B", &["read".to_string()], None);
        assert!(results.is_empty());
    }

    #[test]
    fn which_transition_finds_a_file_transition_macro() {
        let index = index_with(&[(
            "a.if",
            "interface(`files_pid_filetrans',` type_transition $1 $2:file $3; ')\n",
        )]);
        let results = which_transition(&index, "httpd_t", "var_run_t", "httpd_var_run_t", None);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "files_pid_filetrans");
    }

    #[test]
    fn results_are_sorted_and_deduplicated_by_name() {
        let index = index_with(&[
            (
                "a.if",
                "interface(`grant_read_a',` allow $1 $2:file { read }; ')\n",
            ),
            (
                "b.if",
                "interface(`grant_read_b',` allow $1 $2:file { read }; ')\n",
            ),
        ]);
        let results = which_access_vector(&index, "A", "B", &["read".to_string()], None);
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
