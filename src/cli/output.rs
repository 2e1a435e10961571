//! User-facing output: colour handling and the box-drawing tree renderer
//! (`spec.md` §6's "Tree output").

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, WriteColor};

use crate::definition::MacroDefinition;
use crate::expand::ExpansionNode;
use crate::search::SearchResult;

/// `Auto` defers to `termcolor`'s own tty detection, but we additionally
/// honour `--no-color` and non-tty stdout explicitly, matching the
/// original source's `_use_color` flag.
pub fn color_choice(no_color: bool) -> ColorChoice {
    if no_color || !atty::is(atty::Stream::Stdout) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn colored(out: &mut dyn WriteColor, text: &str, color: Color, bold: bool) {
    let _ = out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(bold));
    let _ = write!(out, "{text}");
    let _ = out.reset();
}

/// Dim/faint text on the default foreground, matching the ANSI `Color.DIM`
/// effect `examples/original_source/semacro.py` uses for secondary text —
/// unlike a literal dark foreground colour, this stays legible regardless
/// of the terminal's background.
fn dimmed(out: &mut dyn WriteColor, text: &str) {
    let _ = out.set_color(ColorSpec::new().set_dimmed(true));
    let _ = write!(out, "{text}");
    let _ = out.reset();
}

/// Renders an expansion tree with `├── `/`└── `/`│   `/`    ` continuation,
/// root node unindented.
pub fn print_tree(out: &mut dyn WriteColor, node: &ExpansionNode) {
    print_node(out, node, String::new(), true, true);
}

fn print_node(
    out: &mut dyn WriteColor,
    node: &ExpansionNode,
    prefix: String,
    is_last: bool,
    is_root: bool,
) {
    let label = match node {
        ExpansionNode::Internal { label, .. } => label.as_str(),
        ExpansionNode::Leaf { text } => text.as_str(),
    };

    if is_root {
        let _ = writeln!(out, "{label}");
    } else {
        let branch = if is_last { "└── " } else { "├── " };
        let _ = write!(out, "{prefix}{branch}");
        if node.is_leaf() {
            colored(out, label, Color::Green, false);
            let _ = writeln!(out);
        } else {
            let _ = writeln!(out, "{label}");
        }
    }

    if let ExpansionNode::Internal { children, .. } = node {
        let child_prefix = if is_root {
            String::new()
        } else if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };
        let last_index = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            print_node(out, child, child_prefix.clone(), i == last_index, false);
        }
    }
}

/// Prints the flat canonical rule list, one per line, no trailing blank.
pub fn print_rules(rules: &[String]) {
    for rule in rules {
        println!("{rule}");
    }
}

/// Prints a definition as it appears in policy source (`show`'s default
/// view).
pub fn print_definition(out: &mut dyn WriteColor, def: &MacroDefinition) {
    colored(out, &def.kind.to_string(), Color::Yellow, true);
    let _ = writeln!(out, "(`{}',`", def.name);
    let _ = writeln!(out, "{}", def.body);
    let _ = writeln!(out, "')");
    let _ = writeln!(
        out,
        "  source {}:{}",
        def.source_file.display(),
        def.line_number
    );
}

/// Prints the `callers` result: every macro name whose body calls the
/// queried macro.
pub fn print_callers(out: &mut dyn WriteColor, callers: &[&str]) {
    for name in callers {
        colored(out, name, Color::Cyan, false);
        let _ = writeln!(out);
    }
}

/// Prints `which` search results.
pub fn print_search_results(out: &mut dyn WriteColor, results: &[SearchResult]) {
    for result in results {
        colored(out, &result.signature, Color::Green, true);
        let _ = writeln!(
            out,
            "  {}:{}",
            result.source_file.display(),
            result.line_number
        );
    }
}

/// Prints the `list` glue command's output, mirroring
/// `examples/original_source/semacro.py::cmd_list`.
pub fn print_list(out: &mut dyn WriteColor, entries: &[(&str, &MacroDefinition)]) {
    let width = entries.len().to_string().len();
    for (i, (name, def)) in entries.iter().enumerate() {
        let _ = write!(out, "  {:>width$}  ", i + 1, width = width);
        colored(out, &format!("[{}]", def.kind.tag()), Color::Yellow, false);
        let _ = write!(out, " ");
        colored(out, name, Color::White, true);
        let _ = writeln!(out, "  {}", def.source_file.display());
    }
    let _ = writeln!(out);
    dimmed(out, &format!("{} macro(s)", entries.len()));
    let _ = writeln!(out);
}
