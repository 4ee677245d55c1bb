/// Tab stops every eight columns unless configured otherwise
pub const DEFAULT_TAB_WIDTH: u32 = 8;

/// Highest precedence a fixity declaration may use
pub const DEFAULT_MAX_PRECEDENCE: u8 = 9;

/// Deepest nesting of expressions and blocks before the parser gives up
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Knobs for a single parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Width of a tab stop when computing layout columns
    pub tab_width: u32,
    /// Fixity declarations must use a precedence in `0..=max_precedence`
    pub max_precedence: u8,
    /// Brackets, arrows, binders, blocks and right-nested operator chains
    /// deeper than this are a syntax error
    pub max_nesting: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            max_precedence: DEFAULT_MAX_PRECEDENCE,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}
