//! Schema analysis layer
//!
//! Everything the LSP layer needs to answer queries about Protocol Buffers
//! schemas: lexing and parsing single files, building a cross-file schema
//! model, and resolving symbols against it.
//!
//! # Modules
//!
//! - [`lexer`]: logos-based tokenizer with line/column tracking
//! - [`parser`]: single-file parse tree (declarations, imports, type references)
//! - [`model`]: immutable cross-file schema model
//! - [`project`]: workspace roots and per-query build configuration
//! - [`builder`]: [`builder::SchemaBuilder`] trait and the file-system builder
//! - [`analysis`]: definition, references, hover, and completion queries
//! - [`location`]: internal position and span types
//! - [`error`]: parse and build error types

pub mod analysis;
pub mod builder;
pub mod error;
pub mod lexer;
pub mod location;
pub mod model;
pub mod parser;
pub mod project;
