use std::process::ExitCode;

use clap::Parser;
use termcolor::StandardStream;

use semacro::cli::args::{Command, SemacroArgs};
use semacro::cli::output::{
    color_choice, print_callers, print_definition, print_list, print_rules, print_search_results,
    print_tree,
};
use semacro::error::{Result, SemacroError};
use semacro::expand::{canonical_call, expand_macro, DEFAULT_MAX_DEPTH};
use semacro::index::{build_index, Index};
use semacro::search::{which_access_vector, which_transition};
use semacro::{canon, discovery, find_callers, MacroDefinition};

/// Directory names that make up each `list --category` bucket, after
/// `examples/original_source/semacro.py::_CATEGORY_DIRS`.
fn category_dirs(category: &str) -> &'static [&'static str] {
    match category {
        "kernel" => &["kernel"],
        "system" => &["system"],
        "admin" => &["admin"],
        "apps" => &["apps"],
        "roles" => &["roles"],
        "services" => &["services"],
        "contrib" => &["contrib"],
        "support" => &["support"],
        _ => &[],
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let args = SemacroArgs::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("semacro: {:?}", miette::Report::new(err));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &SemacroArgs) -> Result<()> {
    let include_path = discovery::resolve_include_path(args.include_path.as_deref())
        .ok_or(SemacroError::IncludePathMissing)?;
    if !include_path.is_dir() {
        return Err(SemacroError::IncludePathNotDir(include_path));
    }

    let index = build_index(&include_path);
    if index.is_empty() {
        return Err(SemacroError::NoMacrosFound(include_path));
    }
    warn_if_incomplete(&index);

    let mut stdout = StandardStream::stdout(color_choice(args.no_color));

    match &args.command {
        Command::Show { name, raw: _ } => {
            // `show` never substitutes arguments (there are none to give it),
            // so its output is always the raw, unsubstituted definition;
            // `--raw` is accepted for symmetry with the original source.
            let def = lookup(&index, name)?;
            print_definition(&mut stdout, def);
        }
        Command::Expand { name, args, tree } => {
            lookup(&index, name)?;
            let call_args = if args.is_empty() { None } else { Some(args.as_slice()) };
            let node = expand_macro(&index, name, call_args, DEFAULT_MAX_DEPTH);
            if *tree {
                print_tree(&mut stdout, &node);
            } else {
                print_rules(&canon::canonicalize(&node));
            }
        }
        Command::Callers { name } => {
            lookup(&index, name)?;
            let callers = find_callers(&index, name);
            print_callers(&mut stdout, &callers);
        }
        Command::Which {
            source,
            target,
            perms,
            parent,
            new_type,
            class,
        } => {
            let results = match (target, perms, parent, new_type) {
                (Some(target), Some(perms), None, None) => {
                    let perms: Vec<String> = perms.split_whitespace().map(str::to_string).collect();
                    which_access_vector(&index, source, target, &perms, class.as_deref())
                }
                (None, None, Some(parent), Some(new_type)) => {
                    which_transition(&index, source, parent, new_type, class.as_deref())
                }
                _ => {
                    return Err(SemacroError::InvalidArguments(
                        "which requires either --target and --perms, or --parent and --new-type"
                            .to_string(),
                    ))
                }
            };
            if results.is_empty() {
                return Err(SemacroError::NoMatches(canonical_call(
                    source,
                    &[target.clone(), new_type.clone()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>(),
                )));
            }
            print_search_results(&mut stdout, &results);
        }
        Command::List { category } => {
            let mut entries: Vec<(&str, &MacroDefinition)> = index
                .iter()
                .filter(|(_, def)| match category.as_deref() {
                    None | Some("all") => true,
                    Some(cat) => {
                        let dirs = category_dirs(cat);
                        def.source_file
                            .components()
                            .any(|c| dirs.iter().any(|d| c.as_os_str().to_str() == Some(*d)))
                    }
                })
                .collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            if entries.is_empty() {
                let cat = category.clone().unwrap_or_else(|| "all".to_string());
                return Err(SemacroError::NoCategoryMatches(cat));
            }
            print_list(&mut stdout, &entries);
        }
        Command::Find { pattern } => {
            let re = regex::RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| SemacroError::InvalidRegex {
                    pattern: pattern.clone(),
                    source,
                })?;
            let mut entries: Vec<(&str, &MacroDefinition)> = index
                .iter()
                .filter(|(name, _)| re.is_match(name))
                .collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            if entries.is_empty() {
                return Err(SemacroError::NoMatches(pattern.clone()));
            }
            print_list(&mut stdout, &entries);
        }
    }

    Ok(())
}

fn lookup<'a>(index: &'a Index, name: &str) -> Result<&'a MacroDefinition> {
    index.get(name).ok_or_else(|| SemacroError::NotFound {
        name: name.to_string(),
        suggestion: index.suggest(name),
    })
}

fn warn_if_incomplete(index: &Index) {
    let (missing_define, missing_kernel) = index.looks_incomplete();
    if !missing_define && !missing_kernel {
        return;
    }
    let mut missing = Vec::new();
    if missing_define {
        missing.push("support/*.spt (defines)");
    }
    if missing_kernel {
        missing.push("kernel/*.if (core interfaces)");
    }
    eprintln!(
        "semacro: warning: incomplete policy tree — missing {}.\n  \
         Install the full selinux-policy-devel package or point --include-path\n  \
         to a complete policy source tree.",
        missing.join(", ")
    );
}
