//! Property-based tests for the signature parser.
//!
//! These use proptest to generate synthetic templates and verify:
//! 1. Robustness: the parser never panics, whatever the input
//! 2. Argument splitting: top-level splitting recovers the exact
//!    argument expressions for arbitrarily nested argument text
//! 3. Model reuse: parsing is deterministic

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use mono_ir::ConstructKind;
use mono_parse::parse_template;
use proptest::prelude::*;

/// Generate a plausible identifier, sometimes with slot markers.
fn ident_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::string::string_regex("[a-z][a-zA-Z0-9]{0,8}").expect("valid regex"),
        prop::string::string_regex("KType[A-Z][a-zA-Z]{0,6}").expect("valid regex"),
        prop::string::string_regex("KTypeVType[A-Z][a-zA-Z]{0,6}").expect("valid regex"),
        Just("KType".to_string()),
        Just("VType".to_string()),
    ]
}

/// Generate one argument expression with balanced nesting.
fn argument_strategy() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        ident_strategy(),
        prop::string::string_regex("[0-9]{1,4}").expect("valid regex"),
        Just("\"a, b\"".to_string()),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            (ident_strategy(), prop::collection::vec(inner.clone(), 0..3)).prop_map(
                |(name, args)| format!("{name}({})", args.join(", "))
            ),
            (inner.clone(), inner).prop_map(|(a, b)| format!("{a}[{b}]")),
        ]
    })
}

proptest! {
    #[test]
    fn parser_never_panics(source in "[ -~\\n]{0,200}") {
        // Any outcome is fine; reaching it without panicking is the point.
        let _ = parse_template(&source, "fuzz.java");
    }

    #[test]
    fn parse_is_deterministic(
        name in prop::string::string_regex("KType[A-Z][a-zA-Z]{0,6}").expect("valid regex"),
        field in ident_strategy(),
    ) {
        let source = format!("class {name}<KType> {{ KType {field}; }}");
        let first = parse_template(&source, "t").expect("template parses");
        let second = parse_template(&source, "t").expect("template parses");
        prop_assert_eq!(first.constructs(), second.constructs());
    }

    #[test]
    fn argument_splitting_recovers_expressions(
        args in prop::collection::vec(argument_strategy(), 0..4)
    ) {
        let source = format!(
            "class KTypeFoo<KType> {{ void f() {{ Intrinsics.<KType>probe({}); }} }}",
            args.join(", ")
        );
        let model = parse_template(&source, "t").expect("template parses");
        let call = model
            .constructs()
            .iter()
            .find_map(|c| match &c.kind {
                ConstructKind::IntrinsicCall { args, .. } => Some(args),
                _ => None,
            })
            .expect("call site recognized");
        let recovered: Vec<String> =
            call.iter().map(|span| model.slice(*span).to_string()).collect();
        prop_assert_eq!(recovered, args);
    }
}
