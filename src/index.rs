//! File-tree indexer (`spec.md` §4.2).
//!
//! Walks an include root recursively, parses every `.if` / `.spt` file with
//! the quoted-block scanner, and builds a name -> `MacroDefinition` map.
//! Built once at process start and treated as read-only thereafter (§5).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::definition::MacroDefinition;
use crate::scan;

/// Mapping from macro name to its definition. Lifetime: built once, then
/// read-only. On duplicate names, the last one parsed wins; directory-walk
/// order determines "last", which is platform-dependent — `spec.md` §9 and
/// `DESIGN.md` both call out that tests must not depend on a specific
/// winner across a real collision.
#[derive(Debug, Clone, Default)]
pub struct Index {
    definitions: HashMap<String, MacroDefinition>,
}

impl Index {
    pub fn get(&self, name: &str) -> Option<&MacroDefinition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MacroDefinition)> {
        self.definitions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// True when the index has no `define` entries or no file under a
    /// `kernel` directory — `spec.md` §7's "incomplete policy tree"
    /// startup-warning condition.
    pub fn looks_incomplete(&self) -> (bool, bool) {
        let has_define = self
            .definitions
            .values()
            .any(|d| d.kind == crate::definition::MacroKind::Define);
        let has_kernel = self.definitions.values().any(|d| {
            d.source_file
                .components()
                .any(|c| c.as_os_str() == "kernel")
        });
        (!has_define, !has_kernel)
    }

    /// The nearest name by substring match, for "did you mean" hints on
    /// not-found errors (`spec.md` §7).
    pub fn suggest(&self, name: &str) -> Option<String> {
        let needle = name.to_ascii_lowercase();
        self.definitions
            .keys()
            .filter(|candidate| candidate.to_ascii_lowercase().contains(&needle))
            .min_by_key(|candidate| candidate.len())
            .cloned()
    }

    fn insert(&mut self, def: MacroDefinition) {
        self.definitions.insert(def.name.clone(), def);
    }
}

fn is_policy_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("if") | Some("spt")
    )
}

/// Walks `root` recursively, parsing every `.if`/`.spt` file found. I/O
/// errors reading an individual file are logged and skipped — that file
/// contributes no definitions, but the build proceeds (`spec.md` §4.9).
pub fn build_index(root: &Path) -> Index {
    let mut index = Index::default();

    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !is_policy_file(path) {
            continue;
        }

        let bytes = match fs::read(path) {
            Ok(b) => b,
            Err(err) => {
                log::warn!("failed to read '{}': {err}", path.display());
                continue;
            }
        };
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        for scanned in scan::scan(&text) {
            index.insert(MacroDefinition {
                name: scanned.name,
                kind: scanned.kind,
                body: scanned.body,
                source_file: rel.clone(),
                line_number: scanned.line_number,
            });
        }
    }

    index
}

/// Builds an index directly from `(relative_path, source_text)` pairs,
/// without touching the filesystem — used by tests.
pub fn build_index_from_sources(files: &[(PathBuf, &str)]) -> Index {
    let mut index = Index::default();
    for (rel, text) in files {
        for scanned in scan::scan(text) {
            index.insert(MacroDefinition {
                name: scanned.name,
                kind: scanned.kind,
                body: scanned.body,
                source_file: rel.clone(),
                line_number: scanned.line_number,
            });
        }
    }
    index
}
