use crate::ast::decl::Decl;
use crate::ast::span::Span;

/// A parsed compilation unit: the declarations of the file's top-level block
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub span: Span,
    pub decls: Vec<Decl>,
}
