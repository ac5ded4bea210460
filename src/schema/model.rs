//! Immutable cross-file schema model
//!
//! Built once per query and discarded afterwards; nothing here is cached
//! between requests.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::schema::error::ParseError;
use crate::schema::location::SourceSpan;
use crate::schema::parser::{self, DeclarationKind, ParseTree};

/// One parsed file inside the model
#[derive(Debug)]
pub struct SchemaFile {
    pub source: String,
    pub tree: ParseTree,
}

/// A resolved type with its fully qualified name and definition site
#[derive(Debug, Clone)]
pub struct TypeEntry {
    pub kind: DeclarationKind,
    pub full_name: String,
    pub package: Option<String>,
    pub span: SourceSpan,
}

#[derive(Debug, Default)]
pub struct SchemaModel {
    pub files: IndexMap<PathBuf, SchemaFile>,
    pub types: IndexMap<String, TypeEntry>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `source` and register the file and its declarations.
    pub fn insert_file(&mut self, path: PathBuf, source: String) -> Result<(), ParseError> {
        let tree = parser::parse(&source)?;

        for declaration in &tree.declarations {
            let full_name = qualified_name(tree.package.as_deref(), &declaration.name);
            self.types.insert(
                full_name.clone(),
                TypeEntry {
                    kind: declaration.kind,
                    full_name,
                    package: tree.package.clone(),
                    span: SourceSpan {
                        file: path.clone(),
                        start: declaration.name_span.start,
                        end: declaration.name_span.end,
                    },
                },
            );
        }

        self.files.insert(path, SchemaFile { source, tree });
        Ok(())
    }

    pub fn file(&self, path: &Path) -> Option<&SchemaFile> {
        self.files.get(path)
    }
}

pub fn qualified_name(package: Option<&str>, name: &str) -> String {
    match package {
        Some(package) => format!("{package}.{name}"),
        None => name.to_string(),
    }
}
