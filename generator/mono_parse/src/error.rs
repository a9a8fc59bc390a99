//! Parse errors.
//!
//! Anything the parser does not confidently recognize passes through as
//! literal text; these errors cover only genuinely malformed input,
//! where emitting output would be worse than stopping.

use mono_diagnostic::{Diagnostic, ErrorCode};
use mono_ir::Span;
use thiserror::Error;

/// Fatal template syntax error. Aborts the template's generation
/// entirely; no output is emitted for any assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated comment starting at {span}")]
    UnterminatedComment { span: Span },

    #[error("unterminated string or character literal at {span}")]
    UnterminatedLiteral { span: Span },

    #[error("unbalanced `{{` opened at {span}")]
    UnbalancedBrace { span: Span },

    #[error("`}}` at {span} has no matching open brace")]
    StrayCloseBrace { span: Span },

    #[error("unterminated type parameter or argument list opened at {span}")]
    UnterminatedTypeList { span: Span },

    #[error("malformed intrinsic call site at {span}: {reason}")]
    MalformedIntrinsic { span: Span, reason: &'static str },

    #[error("unterminated intrinsic argument list opened at {span}")]
    UnterminatedIntrinsicArgs { span: Span },
}

impl ParseError {
    /// The span where the problem starts.
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnterminatedComment { span }
            | ParseError::UnterminatedLiteral { span }
            | ParseError::UnbalancedBrace { span }
            | ParseError::StrayCloseBrace { span }
            | ParseError::UnterminatedTypeList { span }
            | ParseError::MalformedIntrinsic { span, .. }
            | ParseError::UnterminatedIntrinsicArgs { span } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ParseError::UnterminatedComment { .. } => ErrorCode::E0001,
            ParseError::UnterminatedLiteral { .. } => ErrorCode::E0002,
            ParseError::UnbalancedBrace { .. } | ParseError::StrayCloseBrace { .. } => {
                ErrorCode::E1001
            }
            ParseError::UnterminatedTypeList { .. } => ErrorCode::E1002,
            ParseError::MalformedIntrinsic { .. } => ErrorCode::E1003,
            ParseError::UnterminatedIntrinsicArgs { .. } => ErrorCode::E1004,
        }
    }

    /// Structured diagnostic carrying the template identity and span.
    pub fn to_diagnostic(&self, template: &str) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_template(template)
            .with_label(self.span(), "here")
    }
}
