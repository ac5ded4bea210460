mod lsp;

pub use lsp::*;
