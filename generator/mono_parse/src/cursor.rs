//! Token cursor for navigating the token stream.
//!
//! Provides lookahead, consumption, and position snapshots. Snapshots
//! are how speculative recognition works: try to parse a construct,
//! roll back to the saved position when the shape does not hold, and
//! let the text fall through as a literal span.

use mono_ir::{Span, Token, TokenKind, TokenList};

/// Cursor over the token stream, with access to the source text so
/// callers can inspect identifier spellings.
pub struct Cursor<'a> {
    source: &'a str,
    tokens: &'a TokenList,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a TokenList, source: &'a str) -> Self {
        debug_assert!(
            matches!(tokens.as_slice().last().map(|t| t.kind), Some(TokenKind::Eof)),
            "token stream must end with Eof"
        );
        Cursor {
            source,
            tokens,
            pos: 0,
        }
    }

    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Current position, for snapshots.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Restore a snapshot taken with [`Cursor::position`].
    pub fn set_position(&mut self, pos: usize) {
        debug_assert!(pos <= self.tokens.len(), "cursor position out of bounds");
        self.pos = pos;
    }

    /// Current token. The stream always ends with `Eof`, so the cursor
    /// never runs past the end.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Source text under the current token.
    #[inline]
    pub fn current_text(&self) -> &'a str {
        &self.source[self.current().span.to_range()]
    }

    /// Source text under an arbitrary span.
    #[inline]
    pub fn text(&self, span: Span) -> &'a str {
        &self.source[span.to_range()]
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Look ahead `n` tokens without consuming (0 = current).
    pub fn peek(&self, n: usize) -> &Token {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.peek(n).kind
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Token {
        let token = *self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }
}
