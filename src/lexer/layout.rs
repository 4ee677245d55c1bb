use crate::ast::span::Span;
use crate::diagnostics::Diagnostic;
use crate::lexer::token::{SpannedToken, Token};

/// What introduced an implicit block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// The file body, or the body of `module ... where`
    Module,
    /// `where` after a data declaration or function clause
    Where,
    /// `where` after a record header
    Record,
    /// `let`, closed by `in`
    Let,
}

/// An open implicit block and the column its items start at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutContext {
    pub kind: LayoutKind,
    pub column: u32,
}

/// Stack entry: either an implicit layout block or an explicit delimiter
#[derive(Debug, Clone, Copy, PartialEq)]
enum StackEntry {
    Layout(LayoutContext),
    /// `(` or a `{` that does not start a block
    Explicit,
    /// `{` directly after a layout keyword; its `}` becomes a block-close
    ExplicitBlock(LayoutKind, Span),
}

/// Column of the innermost implicit block, or 0 inside brackets.
fn enclosing_column(stack: &[StackEntry]) -> u32 {
    match stack.last() {
        Some(StackEntry::Layout(ctx)) => ctx.column,
        _ => 0,
    }
}

/// Index of the innermost `let` block not hidden behind a bracket.
fn innermost_let(stack: &[StackEntry]) -> Option<usize> {
    for (idx, entry) in stack.iter().enumerate().rev() {
        match entry {
            StackEntry::Layout(ctx) if ctx.kind == LayoutKind::Let => return Some(idx),
            StackEntry::Layout(_) => continue,
            StackEntry::ExplicitBlock(LayoutKind::Let, _) => return Some(idx),
            StackEntry::Explicit | StackEntry::ExplicitBlock(..) => return None,
        }
    }
    None
}

fn innermost_explicit(stack: &[StackEntry]) -> Option<usize> {
    stack
        .iter()
        .rposition(|e| matches!(e, StackEntry::Explicit | StackEntry::ExplicitBlock(..)))
}

/// Map a layout keyword to the block it opens, given the head of the current item
fn layout_kind_for(token: &Token, item_head: Option<&Token>) -> LayoutKind {
    match (token, item_head) {
        (Token::Let, _) => LayoutKind::Let,
        (_, Some(Token::Record)) => LayoutKind::Record,
        (_, Some(Token::Module)) => LayoutKind::Module,
        _ => LayoutKind::Where,
    }
}

struct Resolver {
    out: Vec<SpannedToken>,
    errors: Vec<Diagnostic>,
    stack: Vec<StackEntry>,
    /// Leading token of the current item of each open block
    heads: Vec<Option<Token>>,
    expect_head: bool,
}

impl Resolver {
    fn emit_virtual(&mut self, token: Token, at: &SpannedToken) {
        self.out
            .push(SpannedToken::virtual_at(token, at.span.start, at.line, at.column));
    }

    fn open_block(&mut self, entry: StackEntry, at: &SpannedToken) {
        self.emit_virtual(Token::LayoutStart, at);
        self.stack.push(entry);
        self.heads.push(None);
        self.expect_head = true;
    }

    fn close_top(&mut self, at: &SpannedToken) {
        self.emit_virtual(Token::LayoutEnd, at);
        self.stack.pop();
        self.heads.pop();
    }

    fn separate(&mut self, at: &SpannedToken) {
        self.emit_virtual(Token::LayoutSep, at);
        self.expect_head = true;
    }

    /// Compare a line-initial token's column with the open blocks.
    fn check_column(&mut self, tok: &SpannedToken) {
        let mut closed_column = None;
        loop {
            let Some(StackEntry::Layout(ctx)) = self.stack.last().copied() else {
                break;
            };
            if tok.column == ctx.column {
                self.separate(tok);
                return;
            }
            if tok.column > ctx.column {
                if let Some(inner) = closed_column {
                    self.errors.push(Diagnostic::layout(
                        tok.span,
                        format!(
                            "inconsistent indentation: column {} lies between the enclosing block columns {} and {}",
                            tok.column, ctx.column, inner
                        ),
                    ));
                    // Recover as a sibling in the enclosing block
                    self.separate(tok);
                }
                return;
            }
            if self.stack.len() == 1 {
                // The file body is never closed by dedent
                self.errors.push(Diagnostic::layout(
                    tok.span,
                    format!(
                        "line is indented to column {}, left of the file's first declaration at column {}",
                        tok.column, ctx.column
                    ),
                ));
                self.separate(tok);
                return;
            }
            log::trace!("layout: close {:?} block at column {}", ctx.kind, tok.column);
            self.close_top(tok);
            closed_column = Some(ctx.column);
        }
    }
}

/// Process layout: make implicit block structure explicit with virtual tokens.
///
/// Algorithm:
/// - The file body and every `where`/`let` open a block whose reference
///   column is the column of the next token; a virtual block-open is emitted.
/// - A line starting at the reference column gets an item separator.
/// - A line starting left of it closes the block (repeatedly); landing
///   strictly between two block columns is a layout error.
/// - A line starting right of it continues the current item.
/// - `in` closes the innermost `let` block.
/// - Inside brackets indentation is ignored; a closing bracket closes every
///   block opened inside it.
/// - A `{` right after a layout keyword makes an explicit block instead.
///
/// Comments are dropped. The output ends with `Token::Eof`.
pub fn process_layout(raw_tokens: Vec<SpannedToken>) -> (Vec<SpannedToken>, Vec<Diagnostic>) {
    let mut r = Resolver {
        out: Vec::with_capacity(raw_tokens.len() + 16),
        errors: Vec::new(),
        stack: Vec::new(),
        heads: Vec::new(),
        expect_head: false,
    };
    // The file body is an implicit module block
    let mut pending: Option<LayoutKind> = Some(LayoutKind::Module);
    let mut eof: Option<SpannedToken> = None;

    for tok in raw_tokens {
        if tok.token.is_trivia() {
            continue;
        }
        if tok.token == Token::Eof {
            eof = Some(tok);
            break;
        }

        let mut just_opened = false;

        // Step 1: Handle pending layout start
        if let Some(kind) = pending.take() {
            if tok.token == Token::LBrace {
                r.open_block(StackEntry::ExplicitBlock(kind, tok.span), &tok);
                if let Some(start) = r.out.last_mut() {
                    start.span = tok.span;
                }
                continue;
            }
            if tok.column > enclosing_column(&r.stack) || r.stack.is_empty() {
                log::trace!("layout: open {:?} block at column {}", kind, tok.column);
                r.open_block(
                    StackEntry::Layout(LayoutContext {
                        kind,
                        column: tok.column,
                    }),
                    &tok,
                );
                just_opened = true;
            } else {
                // Nothing indented under the keyword: the block is empty
                r.emit_virtual(Token::LayoutStart, &tok);
                r.emit_virtual(Token::LayoutEnd, &tok);
            }
        }

        // Step 2: 'in' closes the innermost let block
        if tok.token == Token::In {
            if let Some(idx) = innermost_let(&r.stack) {
                while r.stack.len() > idx {
                    r.close_top(&tok);
                }
            }
        }
        // Step 3: Closing delimiters close every block opened inside the bracket
        else if matches!(tok.token, Token::RParen | Token::RBrace) {
            if let Some(idx) = innermost_explicit(&r.stack) {
                while r.stack.len() > idx + 1 {
                    r.close_top(&tok);
                }
                match r.stack[idx] {
                    StackEntry::ExplicitBlock(..) if tok.token == Token::RBrace => {
                        r.out.push(SpannedToken::new(
                            Token::LayoutEnd,
                            tok.span,
                            tok.line,
                            tok.column,
                            false,
                        ));
                        r.stack.pop();
                        r.heads.pop();
                        continue;
                    }
                    StackEntry::ExplicitBlock(..) => {}
                    _ => {
                        r.stack.pop();
                    }
                }
            }
        }
        // Step 4: Column-based layout checks (skip if just opened a new block)
        else if tok.line_start && !just_opened {
            r.check_column(&tok);
        }

        let is_open_delim = matches!(tok.token, Token::LParen | Token::LBrace);
        let in_block = matches!(
            r.stack.last(),
            Some(StackEntry::Layout(_)) | Some(StackEntry::ExplicitBlock(..))
        );
        let next_pending = if tok.token.is_layout_keyword() {
            let head = r.heads.last().and_then(|h| h.as_ref());
            Some(layout_kind_for(&tok.token, head))
        } else {
            None
        };

        // Step 5: Record the leading token of a new item
        if r.expect_head {
            if let Some(head) = r.heads.last_mut() {
                *head = Some(tok.token.clone());
            }
            r.expect_head = false;
        }
        let is_semicolon = tok.token == Token::Semicolon;

        // Step 6: Push token to result
        r.out.push(tok);

        if is_semicolon && in_block {
            r.expect_head = true;
        }

        // Step 7: Track opening delimiters
        if is_open_delim {
            r.stack.push(StackEntry::Explicit);
        }

        // Step 8: Set pending layout for layout keywords
        if next_pending.is_some() {
            pending = next_pending;
        }
    }

    let eof = eof.unwrap_or_else(|| {
        let end = r.out.last().map_or(0, |t| t.span.end);
        SpannedToken::new(Token::Eof, Span::point(end), 1, 1, false)
    });

    // EOF: a layout keyword with nothing after it opens an empty block
    if pending.take().is_some() {
        r.emit_virtual(Token::LayoutStart, &eof);
        r.emit_virtual(Token::LayoutEnd, &eof);
    }

    // Close all remaining blocks
    while let Some(entry) = r.stack.last().copied() {
        match entry {
            StackEntry::Layout(_) => r.close_top(&eof),
            StackEntry::ExplicitBlock(_, open) => {
                r.errors
                    .push(Diagnostic::layout(open, "block opened with `{` is never closed"));
                r.close_top(&eof);
            }
            StackEntry::Explicit => {
                r.stack.pop();
            }
        }
    }

    r.out.push(eof);
    (r.out, r.errors)
}
