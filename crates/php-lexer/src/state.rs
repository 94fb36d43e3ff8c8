//! Lexer mode stack for string interpolation tracking.

use php_token::{Quote, Token, TokenKind, TokenPayload};

/// Lexing mode, tracked as a stack with `Normal` at the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexerMode {
    /// Plain PHP code
    Normal,
    /// Inside a double-quoted string
    InDoubleQuote,
    /// Inside a heredoc body
    InHeredoc,
    /// Inside a backtick (shell) string
    InBacktick,
    /// Inside `$var`-style interpolation within a string
    InInterpolation,
    /// Inside `${...}` complex interpolation
    InComplexInterpolation,
}

impl LexerMode {
    /// True for the three string-body modes.
    pub fn is_string(&self) -> bool {
        matches!(self, LexerMode::InDoubleQuote | LexerMode::InHeredoc | LexerMode::InBacktick)
    }

    /// True for either interpolation mode.
    pub fn is_interpolation(&self) -> bool {
        matches!(self, LexerMode::InInterpolation | LexerMode::InComplexInterpolation)
    }
}

/// Which string form opened the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    /// `"..."`
    Double,
    /// `<<<LABEL ... LABEL`
    Heredoc,
    /// `` `...` ``
    Backtick,
}

/// Per-string bookkeeping pushed alongside a string mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringContext {
    /// String form of this context
    pub kind: StringKind,
    /// Brace nesting inside `${...}` interpolation
    pub nest_level: usize,
    /// How many interpolations are open inside this string
    pub interpolation_depth: usize,
}

impl StringContext {
    fn new(kind: StringKind) -> Self {
        StringContext { kind, nest_level: 0, interpolation_depth: 0 }
    }
}

/// Stack of lexing modes with parallel string contexts.
///
/// The base `Normal` mode can never be popped; [`reset`](LexerState::reset)
/// drops everything above it. [`transition_by_token`] feeds emitted tokens
/// back in so the state follows string openings, interpolations, and brace
/// balancing; [`expected_tokens`] reports which kinds are valid in the
/// current mode, for error messages and recovery.
///
/// [`transition_by_token`]: LexerState::transition_by_token
/// [`expected_tokens`]: LexerState::expected_tokens
#[derive(Debug, Clone)]
pub struct LexerState {
    modes: Vec<LexerMode>,
    contexts: Vec<StringContext>,
}

impl LexerState {
    /// A fresh state in `Normal` mode.
    pub fn new() -> Self {
        LexerState { modes: vec![LexerMode::Normal], contexts: Vec::new() }
    }

    /// The active mode.
    pub fn current_mode(&self) -> LexerMode {
        *self.modes.last().unwrap_or(&LexerMode::Normal)
    }

    /// The active string context, if any.
    pub fn current_context(&self) -> Option<&StringContext> {
        self.contexts.last()
    }

    /// Stack depth including the base mode.
    pub fn depth(&self) -> usize {
        self.modes.len()
    }

    /// Push a mode; string modes also open a context.
    pub fn push_state(&mut self, mode: LexerMode) {
        match mode {
            LexerMode::InDoubleQuote => self.contexts.push(StringContext::new(StringKind::Double)),
            LexerMode::InHeredoc => self.contexts.push(StringContext::new(StringKind::Heredoc)),
            LexerMode::InBacktick => self.contexts.push(StringContext::new(StringKind::Backtick)),
            _ => {}
        }
        self.modes.push(mode);
    }

    /// Pop the top mode; refuses to pop the base `Normal`.
    ///
    /// Returns the popped mode, or `None` when only the base remains.
    pub fn pop_state(&mut self) -> Option<LexerMode> {
        if self.modes.len() <= 1 {
            return None;
        }
        let mode = self.modes.pop();
        if matches!(
            mode,
            Some(LexerMode::InDoubleQuote | LexerMode::InHeredoc | LexerMode::InBacktick)
        ) {
            self.contexts.pop();
        }
        mode
    }

    /// Drop everything above the base `Normal` mode.
    pub fn reset(&mut self) {
        self.modes.truncate(1);
        self.contexts.clear();
    }

    /// Update the state from an emitted token.
    ///
    /// String openers push string modes, `Variable` inside a string opens a
    /// simple interpolation, `Dollar` opens a complex one, braces balance
    /// inside `${...}`, and a non-continuation token after a variable closes
    /// the simple interpolation again.
    pub fn transition_by_token(&mut self, token: &Token) {
        match token.kind {
            TokenKind::StringStart => {
                let quote = match &token.payload {
                    TokenPayload::Str { quote, .. } => *quote,
                    _ => Quote::Double,
                };
                match quote {
                    Quote::Backtick => self.push_state(LexerMode::InBacktick),
                    _ => self.push_state(LexerMode::InDoubleQuote),
                }
            }
            TokenKind::StartHeredoc => self.push_state(LexerMode::InHeredoc),
            TokenKind::StringEnd | TokenKind::EndHeredoc => {
                // Unwind any interpolation left open, then the string itself
                while self.current_mode().is_interpolation() {
                    self.pop_state();
                }
                if self.current_mode().is_string() {
                    self.pop_state();
                }
            }
            TokenKind::Variable if self.current_mode().is_string() => {
                if let Some(ctx) = self.contexts.last_mut() {
                    ctx.interpolation_depth += 1;
                }
                self.push_state(LexerMode::InInterpolation);
            }
            TokenKind::Dollar if self.current_mode().is_string() => {
                if let Some(ctx) = self.contexts.last_mut() {
                    ctx.interpolation_depth += 1;
                }
                self.push_state(LexerMode::InComplexInterpolation);
            }
            TokenKind::LeftBrace if self.current_mode() == LexerMode::InComplexInterpolation => {
                if let Some(ctx) = self.contexts.last_mut() {
                    ctx.nest_level += 1;
                }
            }
            TokenKind::RightBrace if self.current_mode() == LexerMode::InComplexInterpolation => {
                let closed = {
                    let Some(ctx) = self.contexts.last_mut() else { return };
                    ctx.nest_level = ctx.nest_level.saturating_sub(1);
                    ctx.nest_level == 0
                };
                if closed {
                    self.pop_state();
                    if let Some(ctx) = self.contexts.last_mut() {
                        ctx.interpolation_depth = ctx.interpolation_depth.saturating_sub(1);
                    }
                }
            }
            // `$obj->prop` and `$arr[0]` continue a simple interpolation
            TokenKind::Arrow | TokenKind::LeftBracket | TokenKind::Identifier
            | TokenKind::Number | TokenKind::RightBracket
                if self.current_mode() == LexerMode::InInterpolation => {}
            _ if self.current_mode() == LexerMode::InInterpolation => {
                self.pop_state();
                if let Some(ctx) = self.contexts.last_mut() {
                    ctx.interpolation_depth = ctx.interpolation_depth.saturating_sub(1);
                }
            }
            _ => {}
        }
    }

    /// Token kinds that are valid in the current mode.
    ///
    /// `Normal` mode accepts the open grammar, so the slice is empty there;
    /// restricted modes return the continuation set used to phrase
    /// "expected ..." diagnostics.
    pub fn expected_tokens(&self) -> &'static [TokenKind] {
        match self.current_mode() {
            LexerMode::Normal => &[],
            LexerMode::InDoubleQuote | LexerMode::InBacktick => &[
                TokenKind::StringMiddle,
                TokenKind::StringEnd,
                TokenKind::Variable,
                TokenKind::Dollar,
            ],
            LexerMode::InHeredoc => &[
                TokenKind::EncapsedAndWhitespace,
                TokenKind::EndHeredoc,
                TokenKind::Variable,
                TokenKind::Dollar,
            ],
            LexerMode::InInterpolation => &[
                TokenKind::Arrow,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::StringMiddle,
                TokenKind::StringEnd,
            ],
            LexerMode::InComplexInterpolation => &[
                TokenKind::Variable,
                TokenKind::Identifier,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::LeftBracket,
                TokenKind::RightBracket,
                TokenKind::Arrow,
            ],
        }
    }
}

impl Default for LexerState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use php_position_tracking::{SourceLocation, SourcePosition};
    use std::sync::Arc;

    fn tok(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, text, SourceLocation::empty(SourcePosition::start()))
    }

    fn string_start() -> Token {
        tok(TokenKind::StringStart, "\"").with_payload(TokenPayload::Str {
            value: Arc::from(""),
            quote: Quote::Double,
        })
    }

    #[test]
    fn test_base_mode_is_sticky() {
        let mut state = LexerState::new();
        assert_eq!(state.current_mode(), LexerMode::Normal);
        assert_eq!(state.pop_state(), None);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn test_string_open_close() {
        let mut state = LexerState::new();
        state.transition_by_token(&string_start());
        assert_eq!(state.current_mode(), LexerMode::InDoubleQuote);
        assert!(state.current_context().is_some());

        state.transition_by_token(&tok(TokenKind::StringEnd, "\""));
        assert_eq!(state.current_mode(), LexerMode::Normal);
        assert!(state.current_context().is_none());
    }

    #[test]
    fn test_simple_interpolation_closes_on_noncontinuation() {
        let mut state = LexerState::new();
        state.transition_by_token(&string_start());
        state.transition_by_token(&tok(TokenKind::Variable, "$x"));
        assert_eq!(state.current_mode(), LexerMode::InInterpolation);

        // `->prop` keeps the interpolation open
        state.transition_by_token(&tok(TokenKind::Arrow, "->"));
        state.transition_by_token(&tok(TokenKind::Identifier, "prop"));
        assert_eq!(state.current_mode(), LexerMode::InInterpolation);

        // literal text ends it
        state.transition_by_token(&tok(TokenKind::EncapsedAndWhitespace, " tail"));
        assert_eq!(state.current_mode(), LexerMode::InDoubleQuote);
    }

    #[test]
    fn test_complex_interpolation_brace_balancing() {
        let mut state = LexerState::new();
        state.transition_by_token(&string_start());
        state.transition_by_token(&tok(TokenKind::Dollar, "$"));
        assert_eq!(state.current_mode(), LexerMode::InComplexInterpolation);

        state.transition_by_token(&tok(TokenKind::LeftBrace, "{"));
        state.transition_by_token(&tok(TokenKind::LeftBrace, "{"));
        state.transition_by_token(&tok(TokenKind::RightBrace, "}"));
        assert_eq!(state.current_mode(), LexerMode::InComplexInterpolation);
        state.transition_by_token(&tok(TokenKind::RightBrace, "}"));
        assert_eq!(state.current_mode(), LexerMode::InDoubleQuote);
    }

    #[test]
    fn test_heredoc_mode() {
        let mut state = LexerState::new();
        state.transition_by_token(&tok(TokenKind::StartHeredoc, "<<<EOT"));
        assert_eq!(state.current_mode(), LexerMode::InHeredoc);
        assert_eq!(state.current_context().map(|c| c.kind), Some(StringKind::Heredoc));
        state.transition_by_token(&tok(TokenKind::EndHeredoc, "EOT"));
        assert_eq!(state.current_mode(), LexerMode::Normal);
    }

    #[test]
    fn test_end_unwinds_open_interpolation() {
        let mut state = LexerState::new();
        state.transition_by_token(&string_start());
        state.transition_by_token(&tok(TokenKind::Variable, "$x"));
        state.transition_by_token(&tok(TokenKind::StringEnd, "\""));
        assert_eq!(state.current_mode(), LexerMode::Normal);
        assert_eq!(state.depth(), 1);
    }

    #[test]
    fn test_expected_tokens_by_mode() {
        let mut state = LexerState::new();
        assert!(state.expected_tokens().is_empty());
        state.push_state(LexerMode::InHeredoc);
        assert!(state.expected_tokens().contains(&TokenKind::EndHeredoc));
    }

    #[test]
    fn test_reset() {
        let mut state = LexerState::new();
        state.push_state(LexerMode::InDoubleQuote);
        state.push_state(LexerMode::InInterpolation);
        state.reset();
        assert_eq!(state.depth(), 1);
        assert_eq!(state.current_mode(), LexerMode::Normal);
    }
}
