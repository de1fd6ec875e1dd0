//! govariant CLI
//!
//! Parses the command line, sets up logging and drives the
//! [`GenerationPipeline`] over every input file.

use std::{
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Parser};
use serde::Serialize;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    errors::{print_error, SourceContext, VariantError},
    format::GofmtCommand,
    model::{GenerateOptions, VariantSpec},
    pipeline::GenerationPipeline,
    render::{RenderContext, DEFAULT_COMMAND},
};

// ============================================================================
// CLI ARGUMENTS - Command-line argument definitions
// ============================================================================

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "govariant",
    version,
    about = "Generates Go sum types from annotated interface declarations."
)]
pub struct GovariantArgs {
    /// Do not emit the compile-time conformance assertions.
    #[arg(long)]
    pub nocheck: bool,

    /// Do not emit `Unpack` accessors.
    #[arg(long)]
    pub nounpack: bool,

    /// Do not emit the visitor struct and `Visit` methods.
    #[arg(long)]
    pub novisitor: bool,

    /// Format output with this gofmt binary instead of the built-in formatter.
    #[arg(long, value_name = "PATH")]
    pub gofmt: Option<PathBuf>,

    /// Print the extracted variants as JSON instead of writing files.
    #[arg(long)]
    pub dump_model: bool,

    /// Descend into sub-directories when PATH is a directory.
    #[arg(short, long)]
    pub recursive: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// A Go source file, or a directory of them.
    #[arg(required = true)]
    pub path: PathBuf,
}

impl GovariantArgs {
    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            conformance_check: !self.nocheck,
            accessor: !self.nounpack,
            visitor: !self.novisitor,
        }
    }
}

/// Variants of one input file, as printed by `--dump-model`.
#[derive(Debug, Serialize)]
struct FileModel {
    file: String,
    variants: Vec<VariantSpec>,
}

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// The main entry point for the CLI.
pub fn run() {
    let args = GovariantArgs::parse();
    init_logging(args.verbose);

    if !execute(&args, header_command()) {
        process::exit(1);
    }
}

/// Runs the pipeline for parsed arguments. Every input file is processed
/// and every error is printed; returns whether all files succeeded.
pub fn execute(args: &GovariantArgs, command: String) -> bool {
    let mut render = RenderContext::new(command);
    if let Some(program) = &args.gofmt {
        render = render.with_formatter(GofmtCommand::new(program.display().to_string()));
    }
    let pipeline = GenerationPipeline::new(args.options(), render);

    let files = match GenerationPipeline::discover_go_files(&args.path, args.recursive) {
        Ok(files) => files,
        Err(e) => {
            print_error(e);
            return false;
        }
    };
    if files.is_empty() {
        warn!(path = %args.path.display(), "no Go files found");
    }

    if args.dump_model {
        return dump_models(&pipeline, &files);
    }

    let mut ok = true;
    for file in &files {
        debug!(file = %file.display(), "processing");
        if let Err(e) = pipeline.process_file(file) {
            print_error(e);
            ok = false;
        }
    }
    ok
}

fn dump_models(pipeline: &GenerationPipeline, files: &[PathBuf]) -> bool {
    let mut ok = true;
    let mut models = Vec::new();
    for file in files {
        match extract_file(pipeline, file) {
            Ok(model) => models.push(model),
            Err(e) => {
                print_error(e);
                ok = false;
            }
        }
    }

    match serde_json::to_string_pretty(&models) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            print_error(VariantError::render(e.to_string()));
            ok = false;
        }
    }
    ok
}

fn extract_file(pipeline: &GenerationPipeline, path: &Path) -> Result<FileModel, VariantError> {
    let source = SourceContext::read(path)?;
    Ok(FileModel {
        file: source.name.clone(),
        variants: pipeline.extract(&source)?,
    })
}

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// The command line recorded in generated headers, with the program name
/// normalized.
fn header_command() -> String {
    std::iter::once(DEFAULT_COMMAND.to_string())
        .chain(std::env::args().skip(1))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Logs go to stderr. `RUST_LOG` takes precedence over `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_disable_generation_parts() {
        let args = GovariantArgs::parse_from(["govariant", "--nocheck", "--novisitor", "x.go"]);
        let options = args.options();
        assert!(!options.conformance_check);
        assert!(options.accessor);
        assert!(!options.visitor);
    }

    #[test]
    fn counts_verbosity() {
        let args = GovariantArgs::parse_from(["govariant", "-vv", "-r", "--dump-model", "dir"]);
        assert_eq!(args.verbose, 2);
        assert!(args.recursive);
        assert!(args.dump_model);
        assert_eq!(args.path, PathBuf::from("dir"));
    }
}
