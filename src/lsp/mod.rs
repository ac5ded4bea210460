// LSP protocol layer
// - server.rs: stdio server loop
// - backend.rs: LanguageServer trait implementation
// - documents.rs: synchronized document store
// - position.rs: editor <-> internal coordinate mapping
// - semantic_tokens.rs: token classification and delta encoding

pub mod backend;
pub mod documents;
pub mod position;
pub mod semantic_tokens;
pub mod server;
