//! Resolver tests.
//!
//! The `specialize` module is the behavioral contract: one case per
//! observable substitution rule, checked for every interesting
//! assignment. Comparison ignores whitespace runs, matching how the
//! generated sources are later reformatted anyway.

mod specialize;

use mono_ir::{Assignment, TemplateModel};

use crate::{resolve, IntrinsicRegistry, ResolveError};

/// Collapse whitespace runs so expectations read naturally.
pub(crate) fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn parse(source: &str) -> TemplateModel {
    match mono_parse::parse_template(source, "test.java") {
        Ok(model) => model,
        Err(e) => panic!("parse failed: {e}"),
    }
}

pub(crate) fn try_resolve(
    source: &str,
    assignment: &Assignment,
) -> Result<String, ResolveError> {
    resolve(&parse(source), assignment, &IntrinsicRegistry::empty())
}

/// Resolve and compare, ignoring whitespace runs.
pub(crate) fn check(source: &str, assignment: &Assignment, expected: &str) {
    match try_resolve(source, assignment) {
        Ok(output) => {
            pretty_assertions::assert_eq!(
                normalize_ws(&output),
                normalize_ws(expected),
                "input: {source}"
            );
        }
        Err(e) => panic!("resolution failed for {source}: {e}"),
    }
}
