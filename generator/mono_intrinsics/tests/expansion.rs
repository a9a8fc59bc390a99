//! End-to-end intrinsic expansion through the full pipeline:
//! parse, substitute, dispatch.

use mono_intrinsics::default_registry;
use mono_ir::{Assignment, Kind};
use mono_parse::parse_template;
use mono_resolve::{resolve, ResolveError, TemplateError};
use pretty_assertions::assert_eq;

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn expand(source: &str, assignment: &Assignment) -> Result<String, ResolveError> {
    let model = match parse_template(source, "test.java") {
        Ok(model) => model,
        Err(e) => panic!("parse failed: {e}"),
    };
    resolve(&model, assignment, &default_registry())
}

fn check(source: &str, assignment: &Assignment, expected: &str) {
    match expand(source, assignment) {
        Ok(output) => assert_eq!(normalize_ws(&output), normalize_ws(expected)),
        Err(e) => panic!("expansion failed for {source}: {e}"),
    }
}

#[test]
fn test_cast_generic_vs_concrete() {
    let source = "class KTypeFoo<KType> { KType f(Object e) { return Intrinsics.<KType>cast(e); } }";
    check(
        source,
        &Assignment::single(Kind::Generic),
        "class ObjectFoo<KType> { KType f(Object e) { return (KType) e; } }",
    );
    check(
        source,
        &Assignment::single(Kind::Float),
        "class FloatFoo { float f(Object e) { return e; } }",
    );
}

#[test]
fn test_cast_array_target() {
    let source =
        "class KTypeFoo<KType> { KType[] f(Object[] b) { return Intrinsics.<KType[]>cast(b); } }";
    check(
        source,
        &Assignment::single(Kind::Generic),
        "class ObjectFoo<KType> { KType[] f(Object[] b) { return (KType[]) b; } }",
    );
    check(
        source,
        &Assignment::single(Kind::Int),
        "class IntFoo { int[] f(Object[] b) { return b; } }",
    );
}

#[test]
fn test_equals_per_kind() {
    let source =
        "class KTypeFoo<KType> { boolean eq(KType a, KType b) { return Intrinsics.<KType>equals(a, b); } }";
    check(
        source,
        &Assignment::single(Kind::Generic),
        "class ObjectFoo<KType> { boolean eq(KType a, KType b) { return java.util.Objects.equals(a, b); } }",
    );
    check(
        source,
        &Assignment::single(Kind::Double),
        "class DoubleFoo { boolean eq(double a, double b) { return (Double.doubleToLongBits(a) == Double.doubleToLongBits(b)); } }",
    );
    check(
        source,
        &Assignment::single(Kind::Int),
        "class IntFoo { boolean eq(int a, int b) { return ((a) == (b)); } }",
    );
}

#[test]
fn test_new_array_and_empty() {
    let source = "class KTypeFoo<KType> { \
                  KType[] buffer = Intrinsics.<KType>newArray(16); \
                  KType missing = Intrinsics.<KType>empty(); }";
    check(
        source,
        &Assignment::single(Kind::Long),
        "class LongFoo { long[] buffer = new long[16]; long missing = 0L; }",
    );
    check(
        source,
        &Assignment::single(Kind::Generic),
        "class ObjectFoo<KType> { KType[] buffer = ((KType[]) new Object[16]); KType missing = null; }",
    );
}

#[test]
fn test_arguments_are_resolved_before_dispatch() {
    let source =
        "class KTypeFoo<KType> { Object f() { return Intrinsics.<KType>cast(new KTypeBar<KType>()); } }";
    check(
        source,
        &Assignment::single(Kind::Int),
        "class IntFoo { Object f() { return new IntBar(); } }",
    );
    check(
        source,
        &Assignment::single(Kind::Generic),
        "class ObjectFoo<KType> { Object f() { return (KType) new ObjectBar<KType>(); } }",
    );
}

#[test]
fn test_nested_intrinsic_arguments() {
    let source =
        "class KTypeFoo<KType> { boolean f(Object e, KType x) { return Intrinsics.<KType>equals(Intrinsics.<KType>cast(e), x); } }";
    check(
        source,
        &Assignment::single(Kind::Generic),
        "class ObjectFoo<KType> { boolean f(Object e, KType x) { return java.util.Objects.equals((KType) e, x); } }",
    );
    check(
        source,
        &Assignment::single(Kind::Int),
        "class IntFoo { boolean f(Object e, int x) { return ((e) == (x)); } }",
    );
}

#[test]
fn test_value_slot_target() {
    let source = "class KTypeVTypeMap<KType, VType> { VType f(Object v) { return Intrinsics.<VType>cast(v); } }";
    check(
        source,
        &Assignment::pair(Kind::Int, Kind::Generic),
        "class IntObjectMap<VType> { VType f(Object v) { return (VType) v; } }",
    );
}

#[test]
fn test_argument_count_mismatch_is_template_error() {
    let err = expand(
        "class KTypeFoo<KType> { void f(Object a, Object b) { Intrinsics.<KType>cast(a, b); } }",
        &Assignment::single(Kind::Int),
    );
    assert!(matches!(
        err,
        Err(ResolveError::Template(TemplateError::ArgumentCount {
            expected: 1,
            found: 2,
            ..
        }))
    ));
}

#[test]
fn test_undeclared_target_is_template_error() {
    let err = expand(
        "class KTypeFoo<KType> { void f(Object v) { Intrinsics.<VType>cast(v); } }",
        &Assignment::single(Kind::Int),
    );
    assert!(matches!(
        err,
        Err(ResolveError::Template(TemplateError::TargetUnavailable { .. }))
    ));
}
