//! Command-line arguments and subcommands (`spec.md` §6's ambient CLI
//! surface), built with `clap`'s derive API.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "semacro",
    version,
    about = "Explore and expand SELinux-style policy macros, interfaces, and templates."
)]
pub struct SemacroArgs {
    /// Disable colored output, regardless of tty detection.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to the SELinux policy include directory. Overrides
    /// `SEMACRO_INCLUDE_PATH` and the built-in default.
    #[arg(long, global = true, value_name = "DIR")]
    pub include_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a macro's definition as it appears in policy source.
    Show {
        name: String,
        /// Show `$N` tokens unsubstituted (the default).
        #[arg(long)]
        raw: bool,
    },
    /// Recursively expand a macro call into its canonical rule list.
    Expand {
        name: String,
        /// Positional arguments to pass to the macro.
        args: Vec<String>,
        /// Render the expansion tree instead of the flat rule list.
        #[arg(long)]
        tree: bool,
    },
    /// List every macro whose body contains a detected call to `name`.
    Callers { name: String },
    /// Search for a macro that would produce a given access or type
    /// transition, trying inferred argument combinations.
    Which {
        #[arg(long)]
        source: String,
        /// Access-vector mode: the target type.
        #[arg(long)]
        target: Option<String>,
        /// Access-vector mode: space-separated permissions.
        #[arg(long)]
        perms: Option<String>,
        /// Transition mode: the parent/directory type.
        #[arg(long)]
        parent: Option<String>,
        /// Transition mode: the new type produced by the transition.
        #[arg(long = "new-type")]
        new_type: Option<String>,
        /// Restrict matches to this object class.
        #[arg(long)]
        class: Option<String>,
    },
    /// List all indexed macro names, optionally filtered by category
    /// directory (kernel, system, admin, apps, roles, services, contrib,
    /// support). Out of scope for the core engine; thin glue only.
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Case-insensitive regex search over macro names. Out of scope for
    /// the core engine; thin glue only.
    Find { pattern: String },
}
