//! Tokenizer for template source text.
//!
//! Produces a `TokenList` for the signature parser. Only the subset of
//! the host syntax that anchors template-sensitive constructs is named;
//! everything else degrades to opaque tokens. Trivia (whitespace, line
//! and non-doc block comments) is skipped entirely — it lives in the
//! inter-token gaps the resolver copies verbatim.

use logos::Logos;
use mono_ir::{Span, Token, TokenKind, TokenList};

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum RawToken {
    /// Doc comments are tokens: their words are substitution targets.
    #[regex(r"/\*\*([^*]|\*+[^*/])*\*+/", priority = 12)]
    Javadoc,

    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", priority = 8)]
    BlockComment,

    /// A `/*` that never closes. Matches only when the comment regexes
    /// cannot complete.
    #[token("/*", priority = 3)]
    UnterminatedComment,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    Str,

    #[token("\"", priority = 2)]
    UnterminatedString,

    #[regex(r"'([^'\\\n]|\\.)+'")]
    CharLit,

    #[token("'", priority = 2)]
    UnterminatedChar,

    #[token("class")]
    Class,
    #[token("interface")]
    Interface,
    #[token("extends")]
    Extends,
    #[token("implements")]
    Implements,
    #[token("import")]
    Import,
    #[token("new")]
    New,
    #[token("this")]
    This,
    #[token("super")]
    Super,

    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semi,
    #[token("?")]
    Question,
    #[token("&")]
    Amp,
    #[token("@")]
    At,

    #[regex(r"[0-9][0-9a-zA-Z_]*(\.[0-9a-zA-Z_]+)?")]
    Number,

    #[regex(r"[A-Za-z_$][A-Za-z0-9_$]*")]
    Ident,

    /// Operator runs with no structural meaning to the parser.
    #[regex(r"[+\-*/%=!|^~:]+")]
    Op,
}

/// Lex template source into a `TokenList`.
///
/// Never fails: unrecognized bytes become `Error` tokens and lexically
/// broken comments/literals become `Unterminated*` tokens, which the
/// parser turns into a fatal `ParseError`.
pub fn lex(source: &str) -> TokenList {
    let mut result = TokenList::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(token_result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        match token_result {
            Ok(raw) => match raw {
                RawToken::LineComment | RawToken::BlockComment => {}
                other => result.push(Token::new(convert_token(other), span)),
            },
            Err(()) => {
                result.push(Token::new(TokenKind::Error, span));
            }
        }
    }

    let eof_pos = u32::try_from(source.len())
        .unwrap_or_else(|_| panic!("template exceeds {} bytes", u32::MAX));
    result.push(Token::new(TokenKind::Eof, Span::point(eof_pos)));

    result
}

fn convert_token(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::Javadoc => TokenKind::Javadoc,
        RawToken::Str => TokenKind::Str,
        RawToken::CharLit => TokenKind::CharLit,
        RawToken::UnterminatedComment => TokenKind::UnterminatedComment,
        RawToken::UnterminatedString | RawToken::UnterminatedChar => {
            TokenKind::UnterminatedLiteral
        }

        RawToken::Class => TokenKind::Class,
        RawToken::Interface => TokenKind::Interface,
        RawToken::Extends => TokenKind::Extends,
        RawToken::Implements => TokenKind::Implements,
        RawToken::Import => TokenKind::Import,
        RawToken::New => TokenKind::New,
        RawToken::This => TokenKind::This,
        RawToken::Super => TokenKind::Super,

        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Question => TokenKind::Question,
        RawToken::Amp => TokenKind::Amp,
        RawToken::At => TokenKind::At,

        RawToken::Number => TokenKind::Number,
        RawToken::Ident => TokenKind::Ident,
        RawToken::Op => TokenKind::Op,

        // Trivia is filtered before conversion.
        RawToken::LineComment | RawToken::BlockComment => TokenKind::Error,
    }
}
