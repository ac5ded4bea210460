//! Single-file parse tree
//!
//! A deliberately shallow parse: one pass over the token stream collecting
//! the package name, imports, type declarations (with nesting tracked
//! through the brace structure), and the spans of type references. This is
//! everything the query layer needs; no full AST is built.

use crate::schema::error::ParseError;
use crate::schema::lexer::{self, Token, TokenKind, is_keyword, is_scalar_type};
use crate::schema::location::{ColRow, Span};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Message,
    Enum,
    Service,
}

impl DeclarationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclarationKind::Message => "message",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Service => "service",
        }
    }
}

/// A message/enum/service declaration. `name` is the dot-joined nested
/// name within the file, without the package prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: String,
    pub name_span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    pub span: Span,
}

/// An identifier used in type position (field type, rpc request/response
/// type, map value type).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Default)]
pub struct ParseTree {
    pub tokens: Vec<Token>,
    pub package: Option<String>,
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
    pub type_references: Vec<TypeReference>,
}

impl ParseTree {
    pub fn type_reference_at(&self, position: ColRow) -> Option<&TypeReference> {
        self.type_references
            .iter()
            .find(|reference| reference.span.contains(position))
    }

    pub fn declaration_at(&self, position: ColRow) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|declaration| declaration.name_span.contains(position))
    }

    /// Whether `position` falls inside the braces of a top-level
    /// declaration, the only place a type reference can appear.
    pub fn in_declaration_body(&self, position: ColRow) -> bool {
        let mut depth = 0usize;
        let mut open = ColRow::new(0, 0);
        for token in &self.tokens {
            match token.kind {
                TokenKind::LBrace => {
                    if depth == 0 {
                        open = token.span.end;
                    }
                    depth += 1;
                }
                TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 && open <= position && position < token.span.start {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }
}

pub fn parse(source: &str) -> Result<ParseTree, ParseError> {
    let tokens = lexer::lex(source)?;
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| !token.kind.is_comment())
        .map(|(idx, _)| idx)
        .collect();

    let mut package: Option<String> = None;
    let mut imports = Vec::new();
    let mut declarations = Vec::new();
    // Brace stack; named entries come from message/enum/service scopes.
    let mut scope: Vec<Option<String>> = Vec::new();
    let mut pending_scope: Option<String> = None;

    let mut i = 0;
    while i < significant.len() {
        let token = &tokens[significant[i]];
        match token.kind {
            TokenKind::Ident => match token.text.as_str() {
                "package" if scope.is_empty() && package.is_none() => {
                    if let Some(&next) = significant.get(i + 1) {
                        if tokens[next].kind == TokenKind::Ident {
                            package = Some(tokens[next].text.clone());
                            i += 1;
                        }
                    }
                }
                "import" => {
                    let mut j = i + 1;
                    while let Some(&next) = significant.get(j) {
                        match tokens[next].kind {
                            TokenKind::Ident
                                if matches!(tokens[next].text.as_str(), "weak" | "public") =>
                            {
                                j += 1;
                            }
                            TokenKind::StringLit => {
                                let path = tokens[next]
                                    .text
                                    .trim_matches(|c| c == '"' || c == '\'')
                                    .to_string();
                                imports.push(Import {
                                    path,
                                    span: tokens[next].span,
                                });
                                break;
                            }
                            _ => break,
                        }
                    }
                }
                "message" | "enum" | "service" => {
                    let kind = match token.text.as_str() {
                        "message" => DeclarationKind::Message,
                        "enum" => DeclarationKind::Enum,
                        _ => DeclarationKind::Service,
                    };
                    if let Some(&next) = significant.get(i + 1) {
                        let name_token = &tokens[next];
                        if name_token.kind == TokenKind::Ident
                            && !name_token.text.contains('.')
                            && !is_keyword(&name_token.text)
                        {
                            let name = scope
                                .iter()
                                .flatten()
                                .cloned()
                                .chain([name_token.text.clone()])
                                .collect::<Vec<_>>()
                                .join(".");
                            declarations.push(Declaration {
                                kind,
                                name,
                                name_span: name_token.span,
                            });
                            pending_scope = Some(name_token.text.clone());
                            i += 1;
                        }
                    }
                }
                _ => {}
            },
            TokenKind::LBrace => scope.push(pending_scope.take()),
            TokenKind::RBrace => {
                if scope.pop().is_none() {
                    return Err(ParseError::UnbalancedBrace {
                        position: token.span.start,
                    });
                }
            }
            _ => {}
        }
        i += 1;
    }

    if !scope.is_empty() {
        return Err(ParseError::UnexpectedEof { open: scope.len() });
    }

    let type_references = collect_type_references(&tokens, &significant);

    Ok(ParseTree {
        tokens,
        package,
        imports,
        declarations,
        type_references,
    })
}

fn collect_type_references(tokens: &[Token], significant: &[usize]) -> Vec<TypeReference> {
    let mut references = Vec::new();
    let mut depth = 0usize;

    for (pos, &idx) in significant.iter().enumerate() {
        let token = &tokens[idx];
        match token.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => depth = depth.saturating_sub(1),
            TokenKind::Ident => {
                // Type references only occur inside a declaration body.
                if depth == 0 {
                    continue;
                }
                let text = token.text.as_str();
                if is_keyword(text) || is_scalar_type(text) {
                    continue;
                }
                let prev = pos.checked_sub(1).map(|p| &tokens[significant[p]]);
                let next = significant.get(pos + 1).map(|&n| &tokens[n]);
                if matches!(
                    prev.map(|t| t.text.as_str()),
                    Some("message" | "enum" | "service" | "rpc" | "oneof")
                ) {
                    continue;
                }
                let is_reference = match (prev, next) {
                    // rpc request/response type: `rpc M (Req) returns (Res)`
                    (Some(p), _) if p.kind == TokenKind::LParen => true,
                    (Some(p), _) if p.text == "stream" => true,
                    // field type followed by the field name
                    (_, Some(n)) if n.kind == TokenKind::Ident => true,
                    // map value type: `map<string, Value>`
                    (_, Some(n)) if n.kind == TokenKind::RAngle => true,
                    _ => false,
                };
                if is_reference {
                    references.push(TypeReference {
                        name: token.text.clone(),
                        span: token.span,
                    });
                }
            }
            _ => {}
        }
    }

    references
}
