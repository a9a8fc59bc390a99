//! Resolver error taxonomy.
//!
//! `ResolutionError` and `TemplateError` are fatal for one
//! (template, assignment) unit and never abort sibling units;
//! `ConfigurationError` (re-exported from the core crate) aborts the
//! whole template batch and is pre-checked by the driver.

use mono_diagnostic::{Diagnostic, ErrorCode};
use mono_ir::{ConfigurationError, Slot, Span};
use thiserror::Error;

/// A construct references a slot the assignment does not declare, or a
/// shadow conflict cannot be disambiguated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("reference to {slot} at {span}, which this template does not declare")]
    UndeclaredSlot { slot: Slot, span: Span },

    #[error("slot use at {span} is partially shadowed and cannot be disambiguated")]
    ShadowConflict { span: Span },
}

impl ResolutionError {
    pub fn span(&self) -> Span {
        match self {
            ResolutionError::UndeclaredSlot { span, .. }
            | ResolutionError::ShadowConflict { span } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ResolutionError::UndeclaredSlot { .. } => ErrorCode::E2001,
            ResolutionError::ShadowConflict { .. } => ErrorCode::E2002,
        }
    }
}

/// An intrinsic call site is inconsistent with the template: wrong
/// argument count or a target slot the template does not declare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("intrinsic `{name}` expects {expected} argument(s), found {found} at {span}")]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        span: Span,
    },

    #[error("intrinsic targets {target} at {span}, which this template does not declare")]
    TargetUnavailable { target: &'static str, span: Span },
}

impl TemplateError {
    pub fn span(&self) -> Span {
        match self {
            TemplateError::ArgumentCount { span, .. }
            | TemplateError::TargetUnavailable { span, .. } => *span,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TemplateError::ArgumentCount { .. } => ErrorCode::E3001,
            TemplateError::TargetUnavailable { .. } => ErrorCode::E3002,
        }
    }
}

/// Any failure while resolving one (template, assignment) unit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ResolveError {
    /// Whether this failure must abort the whole template batch rather
    /// than just this unit.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, ResolveError::Configuration(_))
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            ResolveError::Resolution(e) => Some(e.span()),
            ResolveError::Template(e) => Some(e.span()),
            ResolveError::Configuration(ConfigurationError::UnknownIntrinsic {
                span, ..
            }) => Some(*span),
            ResolveError::Configuration(_) => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            ResolveError::Resolution(e) => e.code(),
            ResolveError::Template(e) => e.code(),
            ResolveError::Configuration(ConfigurationError::UnknownIntrinsic { .. }) => {
                ErrorCode::E4002
            }
            ResolveError::Configuration(_) => ErrorCode::E4001,
        }
    }

    /// Structured diagnostic carrying template identity and span.
    pub fn to_diagnostic(&self, template: &str) -> Diagnostic {
        let mut diag = Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_template(template);
        if let Some(span) = self.span() {
            diag = diag.with_label(span, "here");
        }
        diag
    }
}
