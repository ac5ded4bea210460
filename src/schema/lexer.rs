//! Tokenizer for the Protocol Buffers schema language
//!
//! Produces a flat token stream with line/column positions. Columns count
//! UTF-16 code units so positions can cross the LSP boundary without a
//! numeric transform.

use logos::Logos;

use crate::schema::error::ParseError;
use crate::schema::location::{ColRow, Span};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum TokenKind {
    #[regex(r"//[^\n]*")]
    LineComment,

    // Equivalent reformulation of /*(?:[^*]|\*+[^*/])*\*+/ — logos
    // miscompiles that alternation form and the rule never matches.
    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
    BlockComment,

    #[regex(r#""(?:[^"\\\n]|\\.)*""#)]
    #[regex(r"'(?:[^'\\\n]|\\.)*'")]
    StringLit,

    #[regex(r"-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?")]
    NumberLit,

    // Dotted paths lex as a single token; a leading dot marks an
    // absolute type reference.
    #[regex(r"\.?[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*")]
    Ident,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("<")]
    LAngle,
    #[token(">")]
    RAngle,
    #[token("=")]
    Equals,
    #[token(";")]
    Semicolon,
    #[token(",")]
    Comma,
}

impl TokenKind {
    pub fn is_comment(self) -> bool {
        matches!(self, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

const KEYWORDS: &[&str] = &[
    "syntax", "edition", "import", "weak", "public", "package", "option", "message", "enum",
    "service", "rpc", "returns", "stream", "repeated", "optional", "required", "oneof", "map",
    "reserved", "extensions", "extend", "to", "max", "group", "true", "false",
];

const SCALAR_TYPES: &[&str] = &[
    "double", "float", "int32", "int64", "uint32", "uint64", "sint32", "sint64", "fixed32",
    "fixed64", "sfixed32", "sfixed64", "bool", "string", "bytes",
];

pub fn is_keyword(text: &str) -> bool {
    KEYWORDS.contains(&text)
}

pub fn is_scalar_type(text: &str) -> bool {
    SCALAR_TYPES.contains(&text)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

/// Maps byte offsets to line/column positions
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (idx, ch) in text.char_indices() {
            if ch == '\n' {
                line_starts.push(idx + 1);
            }
        }
        Self { line_starts }
    }

    pub fn position(&self, text: &str, offset: usize) -> ColRow {
        let row = self.line_starts.partition_point(|&start| start <= offset) - 1;
        let line_start = self.line_starts[row];
        let col = text[line_start..offset].encode_utf16().count();
        ColRow::new(row as u32, col as u32)
    }
}

/// Tokenize `source`, failing on the first character no rule matches.
pub fn lex(source: &str) -> Result<Vec<Token>, ParseError> {
    let index = LineIndex::new(source);
    let mut tokens = Vec::new();

    for (result, range) in TokenKind::lexer(source).spanned() {
        let kind = result.map_err(|_| ParseError::UnexpectedCharacter {
            position: index.position(source, range.start),
        })?;
        tokens.push(Token {
            kind,
            text: source[range.clone()].to_string(),
            span: Span::new(
                index.position(source, range.start),
                index.position(source, range.end),
            ),
        });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_simple_message() {
        let source = r#"message Foo { string name = 1; }"#;

        assert_eq!(
            kinds(source),
            vec![
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::LBrace,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Equals,
                TokenKind::NumberLit,
                TokenKind::Semicolon,
                TokenKind::RBrace,
            ]
        );
    }

    #[test]
    fn lexes_dotted_and_absolute_identifiers_as_single_tokens() {
        let tokens = lex("foo.bar.Baz .google.protobuf.Any").unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "foo.bar.Baz");
        assert_eq!(tokens[1].text, ".google.protobuf.Any");
    }

    #[test]
    fn lexes_comments_and_strings() {
        let source = "// line\n/* block\ncomment */ import \"a.proto\";";
        let tokens = lex(source).unwrap();

        assert_eq!(tokens[0].kind, TokenKind::LineComment);
        assert_eq!(tokens[1].kind, TokenKind::BlockComment);
        assert_eq!(tokens[2].kind, TokenKind::Ident);
        assert_eq!(tokens[3].kind, TokenKind::StringLit);
        assert_eq!(tokens[3].text, "\"a.proto\"");
    }

    #[test]
    fn rejects_unexpected_characters() {
        let err = lex("message Foo %").unwrap_err();

        match err {
            ParseError::UnexpectedCharacter { position } => {
                assert_eq!(position, ColRow::new(0, 12));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn tracks_positions_across_lines() {
        let tokens = lex("message Foo {\n  int32 id = 1;\n}").unwrap();
        let id = tokens.iter().find(|t| t.text == "id").unwrap();

        assert_eq!(id.span.start, ColRow::new(1, 8));
        assert_eq!(id.span.end, ColRow::new(1, 10));
    }

    #[test]
    fn columns_count_utf16_code_units() {
        // U+1F600 is two UTF-16 code units inside the comment
        let tokens = lex("// 😀\nmessage").unwrap();
        let message = tokens.iter().find(|t| t.text == "message").unwrap();

        assert_eq!(message.span.start, ColRow::new(1, 0));
        let comment = &tokens[0];
        assert_eq!(comment.span.end, ColRow::new(0, 5));
    }

    #[test]
    fn keyword_and_scalar_tables() {
        assert!(is_keyword("message"));
        assert!(is_keyword("rpc"));
        assert!(!is_keyword("Foo"));
        assert!(is_scalar_type("int32"));
        assert!(is_scalar_type("bytes"));
        assert!(!is_scalar_type("Foo"));
    }
}
