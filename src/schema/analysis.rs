//! Symbol queries over a built schema model
//!
//! All lookups work on internal coordinates; the LSP layer translates to
//! and from editor positions.

use std::path::Path;

use crate::schema::location::{ColRow, SourceSpan};
use crate::schema::model::{SchemaModel, TypeEntry, qualified_name};
use crate::schema::parser::{DeclarationKind, ParseTree};

/// Resolve the type under the cursor: either a declaration name or a type
/// reference in the queried file.
pub fn resolve_at<'a>(
    model: &'a SchemaModel,
    file: &Path,
    position: ColRow,
) -> Option<&'a TypeEntry> {
    let schema_file = model.file(file)?;

    if let Some(declaration) = schema_file.tree.declaration_at(position) {
        let full_name = qualified_name(schema_file.tree.package.as_deref(), &declaration.name);
        return model.types.get(&full_name);
    }

    let reference = schema_file.tree.type_reference_at(position)?;
    resolve_name(model, &schema_file.tree, &reference.name)
}

/// Name resolution: absolute references (leading dot) match exactly;
/// otherwise the reference is tried against each enclosing package scope
/// from innermost to outermost, then bare, then as a suffix of any known
/// type (covering nested types referenced by their short name).
fn resolve_name<'a>(
    model: &'a SchemaModel,
    tree: &ParseTree,
    name: &str,
) -> Option<&'a TypeEntry> {
    if let Some(absolute) = name.strip_prefix('.') {
        return model.types.get(absolute);
    }

    if let Some(package) = &tree.package {
        let mut segments: Vec<&str> = package.split('.').collect();
        while !segments.is_empty() {
            let candidate = format!("{}.{}", segments.join("."), name);
            if let Some(entry) = model.types.get(&candidate) {
                return Some(entry);
            }
            segments.pop();
        }
    }

    if let Some(entry) = model.types.get(name) {
        return Some(entry);
    }

    let suffix = format!(".{name}");
    model
        .types
        .values()
        .find(|entry| entry.full_name.ends_with(&suffix))
}

pub fn goto_definition(model: &SchemaModel, file: &Path, position: ColRow) -> Option<SourceSpan> {
    resolve_at(model, file, position).map(|entry| entry.span.clone())
}

/// All spans referring to the type under the cursor, across every file in
/// the model. Declaration sites are included when `include_declaration`
/// is set.
pub fn find_all_references(
    model: &SchemaModel,
    file: &Path,
    position: ColRow,
    include_declaration: bool,
) -> Vec<SourceSpan> {
    let Some(target) = resolve_at(model, file, position) else {
        return Vec::new();
    };
    let target_name = target.full_name.clone();

    let mut spans = Vec::new();
    for (path, schema_file) in &model.files {
        if include_declaration {
            for declaration in &schema_file.tree.declarations {
                let full_name =
                    qualified_name(schema_file.tree.package.as_deref(), &declaration.name);
                if full_name == target_name {
                    spans.push(SourceSpan {
                        file: path.clone(),
                        start: declaration.name_span.start,
                        end: declaration.name_span.end,
                    });
                }
            }
        }
        for reference in &schema_file.tree.type_references {
            if let Some(entry) = resolve_name(model, &schema_file.tree, &reference.name) {
                if entry.full_name == target_name {
                    spans.push(SourceSpan {
                        file: path.clone(),
                        start: reference.span.start,
                        end: reference.span.end,
                    });
                }
            }
        }
    }
    spans
}

/// Markdown type information for the hover card.
pub fn type_information(model: &SchemaModel, file: &Path, position: ColRow) -> Option<String> {
    let entry = resolve_at(model, file, position)?;
    Some(format!(
        "```proto\n{} {}\n```",
        entry.kind.as_str(),
        entry.full_name
    ))
}

/// A type offered for completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionCandidate {
    /// Short name, as typed at a reference site
    pub name: String,
    pub full_name: String,
    pub kind: DeclarationKind,
    pub package: Option<String>,
}

/// Every type known to the model, in declaration order. Candidates are
/// only offered when the cursor sits inside a declaration body; nothing
/// else in the grammar takes a type name.
pub fn completion_candidates(
    model: &SchemaModel,
    file: &Path,
    position: ColRow,
) -> Vec<CompletionCandidate> {
    let in_body = model
        .file(file)
        .is_some_and(|schema_file| schema_file.tree.in_declaration_body(position));
    if !in_body {
        return Vec::new();
    }

    model
        .types
        .values()
        .map(|entry| CompletionCandidate {
            name: entry
                .full_name
                .rsplit('.')
                .next()
                .unwrap_or(&entry.full_name)
                .to_string(),
            full_name: entry.full_name.clone(),
            kind: entry.kind,
            package: entry.package.clone(),
        })
        .collect()
}
