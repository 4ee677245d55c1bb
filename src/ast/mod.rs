pub mod span;
pub mod expr;
pub mod decl;
pub mod source_file;

pub use span::{Span, Spanned, SourcePos};
pub use expr::{ArrowDomain, Binding, Expr, FieldAssign, Name, QualifiedName, TypedParam};
pub use decl::{Associativity, Constructor, Decl, Field, ImportKind};
pub use source_file::SourceFile;
