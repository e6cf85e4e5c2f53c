//! annotation-codegen - source generation driven by annotations in doc comments.
//!
//! Hand-written Rust declarations carry single-line directives in their doc comments:
//!
//! ```text
//! /// @Event( aggregate = "Order", isRootEvent = "true" )
//! pub struct OrderCreated { ... }
//! ```
//!
//! A fixed, ordered set of generator plugins reads those directives and writes
//! supporting code (event wrappers, JSON marshaling, HTTP handlers, event dispatchers,
//! repositories) next to the sources, every file named `gen_*`.
//!
//! # Architecture
//!
//! 1. [`scanner`] - lists the `.rs` files of one package directory, skipping generated ones
//! 2. [`parser`] - parses them with `syn` into the [`model`]
//! 3. [`annotation`] - grammar, descriptor registry and semantic facts
//! 4. [`generator`] - the plugins, their run lifecycle and the [`generator::Pipeline`]
//! 5. [`serializer`] - model dumps and change-aware file writing
//!
//! # Example Usage
//!
//! ```no_run
//! use annotation_codegen::{
//!     generator::Pipeline,
//!     parser::AstParser,
//!     scanner::FileScanner,
//! };
//! use std::path::PathBuf;
//!
//! let input_dir = PathBuf::from("./src/orders");
//! let scan_result = FileScanner::new(input_dir.clone()).unwrap().scan().unwrap();
//!
//! let parse_results = AstParser::parse_files(&scan_result.rust_files);
//! let parsed_files: Vec<_> = parse_results.into_iter().filter_map(Result::ok).collect();
//! let sources = AstParser::extract(&parsed_files);
//!
//! let report = Pipeline::standard().run(&input_dir, &sources).unwrap();
//! println!("{} artifacts", report.artifact_count());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod error;
pub mod generator;
pub mod model;
pub mod parser;
pub mod scanner;
pub mod serializer;
