//! Core data model for the monogen template generator.
//!
//! Everything the pipeline shares lives here: byte-offset spans, the
//! scalar kind catalog, per-generation slot assignments, the token
//! stream, and the parse-once template model.

mod assignment;
mod kind;
mod model;
mod span;
mod token;

pub use assignment::{Arity, Assignment, ConfigurationError, Slot};
pub use kind::{Catalog, CatalogError, Kind};
pub use model::{
    Construct, ConstructKind, IntrinsicTarget, NewArgs, Scope, ScopeId, SlotSet, StemPattern,
    StemSegment, TemplateModel, TypeArg, TypeParam, TypeParamBound,
};
pub use span::{Span, SpanError};
pub use token::{Token, TokenKind, TokenList};
