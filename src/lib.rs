//! Surface-syntax parser for the Silt language
//!
//! Turns UTF-8 source text into an AST ready for type checking.
//! Uses a staged architecture:
//! 1. Logos-based lexer for tokenization
//! 2. Layout processor making `where`/`let` blocks explicit
//! 3. Recursive-descent declaration parser producing flat expression runs
//! 4. Fixity pass resolving runs with per-scope precedence climbing

pub mod ast;
pub mod build;
pub mod cst;
pub mod diagnostics;
pub mod fixity;
pub mod interner;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod pretty;

// Re-export main types
pub use ast::SourceFile;
pub use diagnostics::{Diagnostic, DiagnosticKind};
pub use lexer::{lex, Token};
pub use options::ParseOptions;
pub use parser::{parse, parse_bytes, parse_expr, parse_with_options, Parsed};
