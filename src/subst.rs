//! Argument substituter (`spec.md` §4.4).
//!
//! Replaces positional `$N` placeholders in a body with caller-supplied
//! argument strings in a single pass — substituted values are never
//! re-scanned for further `$N` tokens.

use once_cell::sync::Lazy;
use regex::Regex;

static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\*|\d+)").unwrap());

/// Substitutes `$N` / `$*` tokens in `body` using `args` (0-indexed list,
/// so `$1` is `args[0]`).
///
/// - `$0` is left verbatim (it names the macro itself, not an argument).
/// - `$K` for `1 <= K <= args.len()` becomes `args[K - 1]`.
/// - `$K` for `K > args.len()` becomes the empty string, matching the
///   macro processor's behaviour for unset positional parameters.
/// - `$*` becomes the caller's arguments joined by `, `.
pub fn substitute(body: &str, args: &[String]) -> String {
    let joined_star = args.join(", ");
    TOKEN
        .replace_all(body, |caps: &regex::Captures| {
            let token = &caps[1];
            if token == "*" {
                return joined_star.clone();
            }
            let n: usize = token.parse().expect("digits only per regex");
            if n == 0 {
                return "$0".to_string();
            }
            args.get(n - 1).cloned().unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scenario_b_basic_substitution() {
        let out = substitute(
            "allow $1 $2:file { $3 };",
            &args(&["A", "B", "read write"]),
        );
        assert_eq!(out, "allow A B:file { read write };");
    }

    #[test]
    fn scenario_b_out_of_range_becomes_empty() {
        let out = substitute("$1 $5", &args(&["x"]));
        assert_eq!(out, "x ");
    }

    #[test]
    fn dollar_zero_is_preserved() {
        let out = substitute("$0 $1", &args(&["x"]));
        assert_eq!(out, "$0 x");
    }

    #[test]
    fn star_joins_with_comma_space() {
        let out = substitute("foo($*)", &args(&["a", "b", "c"]));
        assert_eq!(out, "foo(a, b, c)");
    }

    #[test]
    fn no_args_means_all_positional_tokens_verbatim_except_zero() {
        // With no args supplied, every $K for K>=1 becomes empty, matching
        // unset positional parameter behaviour; callers that want to show
        // $N verbatim skip calling substitute entirely (spec.md §4.6 step 4).
        let out = substitute("$1 $2", &[]);
        assert_eq!(out, " ");
    }

    #[test]
    fn single_pass_does_not_rescan_substituted_values() {
        let out = substitute("$1", &args(&["$2"]));
        assert_eq!(out, "$2");
    }
}
