//! CLI argument parsing using clap

use clap::Parser;

/// Generate Kotlin/JS external declarations from TypeScript .d.ts files
#[derive(Parser, Debug)]
#[command(name = "dtskt")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Generate bindings for all Node.js declaration files
    dtskt "node_modules/@types/node/**/*.d.ts" -o src/jsMain/kotlin

    # Use a config file and copy the results into a second source tree
    dtskt "types/*.d.ts" --config dtskt.toml --mirror ../bindings/src

    # Format every generated file with ktfmt
    dtskt "types/*.d.ts" --formatter ktfmt --formatter-arg=--kotlinlang-style

    # Print the generated files instead of writing them
    dtskt types/async_hooks.d.ts --dry-run

    # Show the declaration model the generator sees
    dtskt types/async_hooks.d.ts --dump-ast
"#)]
pub struct Args {
    /// Files to process (supports glob patterns like "types/**/*.d.ts")
    #[arg()]
    pub files: Vec<String>,

    /// Root directory generated files are written under
    #[arg(short = 'o', long = "out")]
    pub out: Option<String>,

    /// Root package of every generated file (default: org.node)
    #[arg(short = 'p', long = "package")]
    pub package: Option<String>,

    /// Copy every written file under this directory as well
    #[arg(long = "mirror")]
    pub mirror: Option<String>,

    /// External formatter run on every written file
    #[arg(long = "formatter")]
    pub formatter: Option<String>,

    /// Argument passed to the formatter before the file path (repeatable)
    #[arg(long = "formatter-arg", allow_hyphen_values = true)]
    pub formatter_args: Vec<String>,

    /// TOML configuration file
    #[arg(long = "config")]
    pub config: Option<String>,

    /// When a number becomes Int: positional (default), contains
    #[arg(long = "id-heuristic")]
    pub id_heuristic: Option<String>,

    /// Number of parallel parse workers
    #[arg(short = 'c', long = "concurrency")]
    pub concurrency: Option<usize>,

    /// Print the parsed declaration model as JSON and exit
    #[arg(long = "dump-ast")]
    pub dump_ast: bool,

    /// Print generated files to stdout instead of writing them
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Show verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
