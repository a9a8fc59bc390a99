//! The intrinsic dispatch seam.
//!
//! Intrinsics are a fixed vocabulary of call markers expanded by
//! pluggable handlers. Dispatch is purely name-keyed; registering a new
//! intrinsic is a handler impl plus a registry insert — the parser and
//! resolver never learn individual names.

use rustc_hash::FxHashMap;

use mono_ir::{Assignment, IntrinsicTarget, Span};

use crate::error::TemplateError;

/// Everything a handler sees about one call site.
pub struct IntrinsicCtx<'a> {
    /// The active assignment for this generation unit.
    pub assignment: &'a Assignment,
    /// The slot-type token the call targets (`KType`, `VType[]`, ...).
    pub target: IntrinsicTarget,
    /// The intrinsic name, for error messages.
    pub name: &'a str,
    /// The call site's span in the template.
    pub call_span: Span,
    /// The matched call-site text, for error messages.
    pub call_text: &'a str,
    /// Argument expressions, already substitution-resolved.
    pub args: &'a [String],
}

impl IntrinsicCtx<'_> {
    /// Fail unless the call has exactly `expected` arguments.
    pub fn expect_argument_count(&self, expected: usize) -> Result<(), TemplateError> {
        if self.args.len() == expected {
            Ok(())
        } else {
            Err(TemplateError::ArgumentCount {
                name: self.name.to_string(),
                expected,
                found: self.args.len(),
                span: self.call_span,
            })
        }
    }
}

/// One intrinsic expansion.
///
/// Handlers are pure: they validate the call site, then append the
/// computed text to the output buffer. They never see or mutate the
/// template model.
pub trait Intrinsic: Send + Sync {
    /// The name this handler is registered under.
    fn name(&self) -> &'static str;

    /// Append the expansion of one call site to `out`.
    fn expand(&self, ctx: &IntrinsicCtx<'_>, out: &mut String) -> Result<(), TemplateError>;
}

/// Name-keyed handler registry.
#[derive(Default)]
pub struct IntrinsicRegistry {
    handlers: FxHashMap<&'static str, Box<dyn Intrinsic>>,
}

impl IntrinsicRegistry {
    /// An empty registry; templates using any intrinsic will fail the
    /// driver's pre-check.
    pub fn empty() -> Self {
        IntrinsicRegistry::default()
    }

    /// Register a handler under its own name, replacing any previous
    /// binding for that name.
    pub fn register(&mut self, handler: Box<dyn Intrinsic>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Intrinsic> {
        self.handlers.get(name).map(AsRef::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
