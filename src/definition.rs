//! Core data model: a parsed macro definition and its kind.
//!
//! Mirrors `spec.md` §3's `MacroDefinition`: immutable once parsed, with the
//! raw body text (one leading/trailing newline already trimmed by the
//! scanner) and the source location used for `show` and error messages.

use std::fmt;
use std::path::PathBuf;

/// The three macro-processor constructs this engine understands.
///
/// Interfaces and templates take arguments and expand to policy statements;
/// defines typically name permission sets and are the only kind eligible
/// for inline substitution (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MacroKind {
    Interface,
    Template,
    Define,
}

impl MacroKind {
    /// The keyword as it appears in policy source, e.g. `interface`.
    pub fn keyword(self) -> &'static str {
        match self {
            MacroKind::Interface => "interface",
            MacroKind::Template => "template",
            MacroKind::Define => "define",
        }
    }

    /// Parses a scanned header keyword into a kind. Returns `None` for any
    /// other identifier (the scanner only ever calls this with one of the
    /// three recognised keywords, but keeping this fallible avoids a panic
    /// on malformed input reaching this far).
    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "interface" => Some(MacroKind::Interface),
            "template" => Some(MacroKind::Template),
            "define" => Some(MacroKind::Define),
            _ => None,
        }
    }

    /// The single-letter tag used by the `list`/`find` glue commands.
    pub fn tag(self) -> char {
        self.keyword().chars().next().expect("keyword is non-empty")
    }
}

impl fmt::Display for MacroKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A parsed macro definition, unique within an `Index` by `name`.
///
/// Immutable after parsing. `body` owns its text (the source file it was
/// read from is not kept open or borrowed from).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    pub name: String,
    pub kind: MacroKind,
    pub body: String,
    pub source_file: PathBuf,
    pub line_number: usize,
}

impl MacroDefinition {
    /// Renders the definition the way it appeared in policy source,
    /// for the `show` command's default (non-expanded) view.
    pub fn display_body(&self) -> String {
        format!("{}(`{}',`\n{}\n')", self.kind.keyword(), self.name, self.body)
    }
}
