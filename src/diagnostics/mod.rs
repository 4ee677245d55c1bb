pub mod error;

pub use error::{sort_by_position, Diagnostic, DiagnosticKind};
