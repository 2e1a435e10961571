//! Regex-level parsers for access-vector and type-transition rule lines
//! (`spec.md` §4.7, §4.8), used by the canonicaliser and the `which` search
//! driver.

use once_cell::sync::Lazy;
use regex::Regex;

static AV_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(allow|dontaudit|auditallow|neverallow)\s+(\S+)\s+(\S+:\S+)\s+\{([^}]+)\}\s*;$")
        .unwrap()
});

static TRANSITION_RULE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^type_transition\s+(\S+)\s+(\S+):(\S+)\s+(\S+)(?:\s+"([^"]*)")?\s*;$"#).unwrap()
});

/// A parsed access-vector rule (`spec.md` §3's "Canonical rule: Access-vector").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAvRule {
    pub kind: String,
    pub source: String,
    /// The `target:class` pair, kept together as it appears in the rule.
    pub target_class: String,
    pub perms: Vec<String>,
}

/// Parses a line as an access-vector rule matching
/// `^(allow|dontaudit|auditallow|neverallow)\s+(\S+)\s+(\S+:\S+)\s+\{([^}]+)\}\s*;$`.
/// Returns `None` for anything else, including the other kinds of terminal
/// statement (`spec.md` §4.7 step 2).
pub fn parse_av_rule(line: &str) -> Option<ParsedAvRule> {
    let caps = AV_RULE.captures(line)?;
    let perms = caps[4]
        .split_whitespace()
        .map(|s| s.to_string())
        .collect();
    Some(ParsedAvRule {
        kind: caps[1].to_string(),
        source: caps[2].to_string(),
        target_class: caps[3].to_string(),
        perms,
    })
}

/// A parsed `type_transition` rule (`spec.md` §4.8's transition-mode regex).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTransitionRule {
    pub source: String,
    pub parent: String,
    pub class: String,
    pub new_type: String,
    pub filename: Option<String>,
}

/// Parses a line as
/// `^type_transition\s+(\S+)\s+(\S+):(\S+)\s+(\S+)(?:\s+"([^"]*)")?\s*;$`.
pub fn parse_transition_rule(line: &str) -> Option<ParsedTransitionRule> {
    let caps = TRANSITION_RULE.captures(line)?;
    Some(ParsedTransitionRule {
        source: caps[1].to_string(),
        parent: caps[2].to_string(),
        class: caps[3].to_string(),
        new_type: caps[4].to_string(),
        filename: caps.get(5).map(|m| m.as_str().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_basic_av_rule() {
        let rule = parse_av_rule("allow s t:file { read write };").unwrap();
        assert_eq!(rule.kind, "allow");
        assert_eq!(rule.source, "s");
        assert_eq!(rule.target_class, "t:file");
        assert_eq!(rule.perms, vec!["read", "write"]);
    }

    #[test]
    fn rejects_non_av_lines() {
        assert!(parse_av_rule("type_transition a b:dir c;").is_none());
        assert!(parse_av_rule("not a rule at all").is_none());
    }

    #[test]
    fn parses_a_transition_rule_with_filename() {
        let rule =
            parse_transition_rule(r#"type_transition httpd_t var_t:file httpd_log_t "access.log";"#)
                .unwrap();
        assert_eq!(rule.source, "httpd_t");
        assert_eq!(rule.parent, "var_t");
        assert_eq!(rule.class, "file");
        assert_eq!(rule.new_type, "httpd_log_t");
        assert_eq!(rule.filename.as_deref(), Some("access.log"));
    }

    #[test]
    fn parses_a_transition_rule_without_filename() {
        let rule = parse_transition_rule("type_transition a b:dir c;").unwrap();
        assert_eq!(rule.filename, None);
    }
}
