//! annotation-codegen - command-line front end for the generator pipeline.
//!
//! Reads the Rust sources of one package directory, resolves the annotations in
//! their doc comments and writes `gen_*` artifacts next to them.
//!
//! # Usage
//!
//! ```bash
//! annotation-codegen [OPTIONS] <INPUT_DIR>
//! ```
//!
//! # Examples
//!
//! Generate everything for one package:
//! ```bash
//! annotation-codegen ./src/orders
//! ```
//!
//! Also dump the parsed model as YAML to `gen_ast.yaml`:
//! ```bash
//! annotation-codegen ./src/orders --ast-output ast.yaml --ast-format yaml
//! ```
//!
//! Run every generator even if one fails, with verbose logging:
//! ```bash
//! annotation-codegen ./src/orders --keep-going -v
//! ```

use annotation_codegen::cli;
use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once up front so the verbose flag can configure the logger
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("annotation-codegen starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Code generation completed successfully");

    Ok(())
}
