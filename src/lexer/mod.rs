pub mod token;
pub mod logos_lexer;
pub mod layout;

pub use token::{Token, Ident, SpannedToken};
pub use logos_lexer::{lex as lex_raw, lex_recovering};
pub use layout::{process_layout, LayoutContext, LayoutKind};

use crate::diagnostics::Diagnostic;
use crate::options::ParseOptions;

/// Main lexer entry point: lex and process layout, failing on the first error
pub fn lex(source: &str) -> Result<Vec<SpannedToken>, Diagnostic> {
    // Step 1: Raw lexing with Logos
    let raw_tokens = lex_raw(source)?;

    // Step 2: Layout processing
    let (tokens, mut errors) = process_layout(raw_tokens);
    if !errors.is_empty() {
        return Err(errors.remove(0));
    }
    Ok(tokens)
}

/// Lex and resolve layout, keeping every diagnostic from both stages.
pub fn tokenize(source: &str, options: &ParseOptions) -> (Vec<SpannedToken>, Vec<Diagnostic>) {
    let (raw_tokens, mut errors) = lex_recovering(source, options.tab_width);
    let (tokens, layout_errors) = process_layout(raw_tokens);
    errors.extend(layout_errors);
    (tokens, errors)
}
