//! Semantic token classification and wire encoding
//!
//! Tokens are classified straight off the parse tree of a single document,
//! then encoded as the LSP delta sequence: each token is described relative
//! to the previous one, and multi-line tokens (block comments) are split
//! into per-line segments first because the wire format cannot express a
//! token spanning lines.

use tower_lsp::lsp_types::{
    SemanticToken, SemanticTokenModifier, SemanticTokenType, SemanticTokensLegend,
};

use crate::schema::lexer::{TokenKind, is_keyword, is_scalar_type};
use crate::schema::location::ColRow;
use crate::schema::parser::ParseTree;

/// Index order must match [`legend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword = 0,
    Type = 1,
    String = 2,
    Number = 3,
    Comment = 4,
    Namespace = 5,
}

pub fn legend() -> SemanticTokensLegend {
    SemanticTokensLegend {
        token_types: vec![
            SemanticTokenType::KEYWORD,
            SemanticTokenType::TYPE,
            SemanticTokenType::STRING,
            SemanticTokenType::NUMBER,
            SemanticTokenType::COMMENT,
            SemanticTokenType::NAMESPACE,
        ],
        token_modifiers: vec![SemanticTokenModifier::DECLARATION],
    }
}

const DECLARATION_BIT: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedToken {
    pub class: TokenClass,
    pub declaration: bool,
    pub start: ColRow,
    pub text: String,
}

/// Classify every highlightable token of a parsed document, in source
/// order. Unclassified tokens (field names, punctuation) are skipped.
pub fn classify(tree: &ParseTree) -> Vec<ClassifiedToken> {
    let mut classified = Vec::new();

    for token in &tree.tokens {
        let (class, declaration) = match token.kind {
            TokenKind::LineComment | TokenKind::BlockComment => (TokenClass::Comment, false),
            TokenKind::StringLit => (TokenClass::String, false),
            TokenKind::NumberLit => (TokenClass::Number, false),
            TokenKind::Ident => {
                if tree
                    .declarations
                    .iter()
                    .any(|declaration| declaration.name_span == token.span)
                {
                    (TokenClass::Type, true)
                } else if tree
                    .type_references
                    .iter()
                    .any(|reference| reference.span == token.span)
                {
                    (TokenClass::Type, false)
                } else if is_keyword(&token.text) {
                    (TokenClass::Keyword, false)
                } else if is_scalar_type(&token.text) {
                    (TokenClass::Type, false)
                } else if tree.package.as_deref() == Some(token.text.as_str()) {
                    (TokenClass::Namespace, false)
                } else {
                    continue;
                }
            }
            _ => continue,
        };
        classified.push(ClassifiedToken {
            class,
            declaration,
            start: token.span.start,
            text: token.text.clone(),
        });
    }

    classified
}

/// Encode classified tokens as the protocol's relative sequence. The flat
/// numeric array the client receives is the serialized form of this vec.
pub fn to_delta_tokens(tokens: &[ClassifiedToken]) -> Vec<SemanticToken> {
    let mut data = Vec::new();
    let mut prev_row = 0u32;
    let mut prev_col = 0u32;

    for token in tokens {
        for (row, col, length) in split_lines(token) {
            if length == 0 {
                continue;
            }
            let delta_line = row - prev_row;
            let delta_start = if delta_line == 0 { col - prev_col } else { col };
            data.push(SemanticToken {
                delta_line,
                delta_start,
                length,
                token_type: token.class as u32,
                token_modifiers_bitset: if token.declaration { DECLARATION_BIT } else { 0 },
            });
            prev_row = row;
            prev_col = col;
        }
    }

    data
}

/// Break a token into `(row, start_col, utf16_length)` segments, one per
/// line of its text.
fn split_lines(token: &ClassifiedToken) -> Vec<(u32, u32, u32)> {
    let mut segments = Vec::new();
    let mut row = token.start.row;
    let mut col = token.start.col;

    for line in token.text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let length = line.encode_utf16().count() as u32;
        segments.push((row, col, length));
        row += 1;
        col = 0;
    }

    segments
}
