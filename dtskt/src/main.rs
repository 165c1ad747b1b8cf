//! dtskt - Kotlin/JS externals from TypeScript declaration files
//!
//! This is the main CLI entry point that orchestrates parsing, generation
//! and publishing.

mod cli;
mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use dtskt_core::{
    expand_globs, filter_typescript_files, parse_files_parallel, publish, CommandFormatter,
    Config, FormatterConfig, Formatter, FsWriter, IdHeuristic, OutputUnit, Project,
    PublishOptions, SourceFile,
};
use dtskt_core::output::target_path;

use cli::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_tracing(args.verbose);

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the config file (if any) and apply command-line overrides
fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };

    if let Some(out) = &args.out {
        config.out_dir = PathBuf::from(out);
    }
    if let Some(package) = &args.package {
        config.mapping.root_package = package.clone();
    }
    if let Some(mirror) = &args.mirror {
        config.mirror_dir = Some(PathBuf::from(mirror));
    }
    if let Some(program) = &args.formatter {
        config.formatter = Some(FormatterConfig {
            program: program.clone(),
            args: args.formatter_args.clone(),
        });
    } else if !args.formatter_args.is_empty() {
        if let Some(formatter) = config.formatter.as_mut() {
            formatter.args = args.formatter_args.clone();
        }
    }
    if let Some(name) = &args.id_heuristic {
        config.mapping.id_heuristic = IdHeuristic::from_str(name).ok_or_else(|| {
            anyhow!("invalid id heuristic '{}'. Valid values: positional, contains", name)
        })?;
    }

    Ok(config)
}

/// Parse every input, skipping files that fail with a warning
fn parse_inputs(files: &[String], concurrency: usize) -> Vec<SourceFile> {
    let results = parse_files_parallel(files, Some(concurrency));
    files
        .iter()
        .zip(results)
        .filter_map(|(path, result)| match result {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(file = %path, error = %e, "skipping file");
                None
            }
        })
        .collect()
}

fn print_units(out_dir: &Path, units: &[OutputUnit]) {
    for unit in units {
        println!("// {}", target_path(out_dir, unit).display());
        print!("{}", unit.text);
        println!();
    }
}

/// Returns whether every generated file was written
fn run(args: Args) -> Result<bool> {
    let config = load_config(&args)?;

    let files = filter_typescript_files(expand_globs(&args.files));
    if files.is_empty() {
        eprintln!("Usage: dtskt <files...> [OPTIONS]");
        eprintln!("\nUse --help for more information.");
        bail!("no input files");
    }

    let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
    tracing::info!(files = files.len(), concurrency, "parsing");
    let sources = parse_inputs(&files, concurrency);

    if args.dump_ast {
        for source in &sources {
            let json = source
                .to_json()
                .with_context(|| format!("serializing {}", source.path))?;
            println!("{}", json);
        }
        return Ok(true);
    }

    let mut project = Project::new(config.mapping.clone());
    let units = project.transform(&sources);
    tracing::info!(scopes = project.index().len(), units = units.len(), "generated");

    if args.dry_run {
        print_units(&config.out_dir, &units);
        return Ok(true);
    }

    let formatter = config.formatter.as_ref().map(CommandFormatter::from);
    let options = PublishOptions {
        out_dir: &config.out_dir,
        mirror_dir: config.mirror_dir.as_deref(),
        formatter: formatter.as_ref().map(|f| f as &dyn Formatter),
    };
    let summary = publish(&units, &FsWriter, &options);
    tracing::info!(
        written = summary.written,
        formatted = summary.formatted,
        mirrored = summary.mirrored,
        failed = summary.failures.len(),
        "published"
    );

    for failure in &summary.failures {
        eprintln!("error: {}", failure);
    }
    Ok(summary.is_success())
}
