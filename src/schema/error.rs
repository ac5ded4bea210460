use std::path::PathBuf;

use thiserror::Error;

use crate::schema::location::ColRow;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected character at {position}")]
    UnexpectedCharacter { position: ColRow },

    #[error("unbalanced closing brace at {position}")]
    UnbalancedBrace { position: ColRow },

    #[error("unexpected end of file: {open} unclosed brace(s)")]
    UnexpectedEof { open: usize },
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("import not found: {0}")]
    ImportNotFound(String),

    #[error("unsupported document uri: {0}")]
    InvalidUri(String),
}
