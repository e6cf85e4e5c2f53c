use crate::generator::json_ast::{AstFormat, JsonAstGenerator};
use crate::generator::{FailurePolicy, Pipeline};
use crate::parser::{AstParser, ParsedFile};
use crate::scanner::FileScanner;
use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Generates wrappers, marshaling helpers, dispatchers and stores from annotations in doc comments
#[derive(Parser, Debug)]
#[command(name = "annotation-codegen")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Directory holding the annotated sources of one package
    #[arg(value_name = "INPUT_DIR")]
    pub input_dir: PathBuf,

    /// Only read files whose name matches this regex
    #[arg(short = 'i', long = "include", value_name = "REGEX")]
    pub include: Option<String>,

    /// Dump the parsed model (to stdout unless --ast-output is given)
    #[arg(long = "ast")]
    pub dump_ast: bool,

    /// File name for the model dump, written as gen_<FILE> inside INPUT_DIR
    #[arg(long = "ast-output", value_name = "FILE")]
    pub ast_output: Option<PathBuf>,

    /// Format of the model dump
    #[arg(long = "ast-format", value_enum, default_value = "json")]
    pub ast_format: AstFormat,

    /// Keep running the remaining generators after one fails
    #[arg(short = 'k', long = "keep-going")]
    pub keep_going: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

impl CliArgs {
    pub fn failure_policy(&self) -> FailurePolicy {
        if self.keep_going {
            FailurePolicy::ContinueOnError
        } else {
            FailurePolicy::AbortOnFirstError
        }
    }

    pub fn wants_ast(&self) -> bool {
        self.dump_ast || self.ast_output.is_some()
    }
}

/// Parse command line arguments
pub fn parse_args() -> Result<CliArgs> {
    let args = CliArgs::parse();
    parse_args_from_parsed(args)
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.input_dir.exists() {
        anyhow::bail!("Input directory does not exist: {}", args.input_dir.display());
    }

    if !args.input_dir.is_dir() {
        anyhow::bail!("Input path is not a directory: {}", args.input_dir.display());
    }

    if let Some(output) = &args.ast_output {
        if output.file_name().is_none() || output.components().count() != 1 {
            anyhow::bail!("AST output must be a plain file name: {}", output.display());
        }
    }

    info!("Input directory: {}", args.input_dir.display());
    if let Some(include) = &args.include {
        info!("Include pattern: {}", include);
    }
    info!("Failure policy: {:?}", args.failure_policy());
    if args.wants_ast() {
        match &args.ast_output {
            Some(output) => info!("AST dump: {} ({:?})", output.display(), args.ast_format),
            None => info!("AST dump: stdout ({:?})", args.ast_format),
        }
    }

    Ok(args)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Scanning {}...", args.input_dir.display());
    let mut scanner = FileScanner::new(args.input_dir.clone())?;
    if let Some(include) = &args.include {
        scanner = scanner.with_include(include)?;
    }
    let scan_result = scanner.scan()?;
    info!("Found {} Rust files", scan_result.rust_files.len());

    if scan_result.rust_files.is_empty() {
        warn!("No Rust files found in {}", args.input_dir.display());
        return Ok(());
    }

    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    let sources = AstParser::extract(&parsed_files);

    let mut pipeline = Pipeline::standard().with_policy(args.failure_policy());
    if args.wants_ast() {
        pipeline = pipeline.with_generator(JsonAstGenerator::new(args.ast_output.clone(), args.ast_format));
    }

    let report = pipeline
        .run(&args.input_dir, &sources)
        .with_context(|| format!("Generation failed for {}", args.input_dir.display()))?;

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Files scanned: {}", scan_result.rust_files.len());
    info!("  - Files parsed: {}", parsed_files.len());
    info!(
        "  - Entities: {} structs, {} enums, {} traits",
        sources.structs.len(),
        sources.enums.len(),
        sources.interfaces.len()
    );
    info!("  - Artifacts: {}", report.artifact_count());

    Ok(())
}
