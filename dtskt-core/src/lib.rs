//! dtskt-core: TypeScript declarations to Kotlin/JS externals
//!
//! This library provides:
//! - TreeSitter-based parsing of `.d.ts` files into a declaration model
//! - A symbol index of every module and namespace in a run
//! - Type mapping from TypeScript types to Kotlin/JS types
//! - Emitters for `external` functions, classes and interfaces
//! - Publishing of generated files (write, format, mirror)

pub mod ast;
pub mod config;
pub mod emit;
pub mod header;
pub mod mapper;
pub mod output;
pub mod parallel;
pub mod parser;
pub mod project;
pub mod scope;

pub use ast::{SourceFile, TypeRef};
pub use config::{Config, ConfigError, FormatterConfig, IdHeuristic, MappingConfig};
pub use mapper::{MappedType, TypeContext, TypeMapper};
pub use output::{
    publish, ArtifactWriter, CommandFormatter, Formatter, FsWriter, OutputError, OutputUnit,
    PublishOptions, PublishSummary,
};
pub use parallel::{expand_globs, filter_typescript_files, parse_files_parallel};
pub use parser::{parse_file, parse_string, ParseError};
pub use project::Project;
