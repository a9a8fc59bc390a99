//! The substitution contract, one case per rule.

use mono_ir::{Assignment, Kind};

use super::check;

fn single(k: Kind) -> Assignment {
    Assignment::single(k)
}

fn pair(k: Kind, v: Kind) -> Assignment {
    Assignment::pair(k, v)
}

#[test]
fn test_class_k() {
    let source = "public class KTypeClass<KType> {}";
    check(source, &single(Kind::Int), "public class IntClass {}");
    check(source, &single(Kind::Generic), "public class ObjectClass<KType> {}");
}

#[test]
fn test_class_kv() {
    let source = "public class KTypeVTypeClass<KType, VType> {}";
    check(source, &pair(Kind::Int, Kind::Long), "public class IntLongClass {}");
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "public class IntObjectClass<VType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "public class ObjectLongClass<KType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "public class ObjectObjectClass<KType, VType> {}",
    );
}

#[test]
fn test_class_vk_signature_reversed() {
    let source = "public class KTypeVTypeClass<VType, KType> {}";
    check(source, &pair(Kind::Int, Kind::Long), "public class LongIntClass {}");
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "public class ObjectIntClass<VType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "public class LongObjectClass<KType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "public class ObjectObjectClass<VType, KType> {}",
    );
}

#[test]
fn test_class_multiple_mixed_bound() {
    let source = "public class KTypeFoo<T, KType, F> {}";
    check(source, &single(Kind::Int), "public class IntFoo<T, F> {}");
    check(
        source,
        &single(Kind::Generic),
        "public class ObjectFoo<T, KType, F> {}",
    );
}

#[test]
fn test_class_extends_non_template() {
    let source = "public class KTypeVTypeClass<KType, VType> extends SuperClass {}";
    check(
        source,
        &pair(Kind::Int, Kind::Long),
        "public class IntLongClass extends SuperClass {}",
    );
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "public class IntObjectClass<VType> extends SuperClass {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "public class ObjectLongClass<KType> extends SuperClass {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "public class ObjectObjectClass<KType, VType> extends SuperClass {}",
    );
}

#[test]
fn test_class_extends_template() {
    let source =
        "public class KTypeVTypeClass<KType, VType> extends KTypeVTypeSuperClass<KType, VType> {}";
    check(
        source,
        &pair(Kind::Int, Kind::Long),
        "public class IntLongClass extends IntLongSuperClass {}",
    );
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "public class IntObjectClass<VType> extends IntObjectSuperClass<VType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "public class ObjectLongClass<KType> extends ObjectLongSuperClass<KType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "public class ObjectObjectClass<KType, VType> extends ObjectObjectSuperClass<KType, VType> {}",
    );
}

#[test]
fn test_class_implements_template() {
    let source = "public class KTypeVTypeClass<KType, VType> \
                  extends KTypeVTypeSuperClass<KType, VType> \
                  implements KTypeVTypeInterface<KType, VType> {}";
    check(
        source,
        &pair(Kind::Int, Kind::Long),
        "public class IntLongClass extends IntLongSuperClass implements IntLongInterface {}",
    );
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "public class IntObjectClass<VType> extends IntObjectSuperClass<VType> implements IntObjectInterface<VType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "public class ObjectLongClass<KType> extends ObjectLongSuperClass<KType> implements ObjectLongInterface<KType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "public class ObjectObjectClass<KType, VType> extends ObjectObjectSuperClass<KType, VType> implements ObjectObjectInterface<KType, VType> {}",
    );
}

#[test]
fn test_interface_kv() {
    let source = "public interface KTypeVTypeInterface<KType, VType> \
                  extends KTypeVTypeSuper<KType, VType> {}";
    check(
        source,
        &pair(Kind::Int, Kind::Long),
        "public interface IntLongInterface extends IntLongSuper {}",
    );
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "public interface IntObjectInterface<VType> extends IntObjectSuper<VType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "public interface ObjectLongInterface<KType> extends ObjectLongSuper<KType> {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "public interface ObjectObjectInterface<KType, VType> extends ObjectObjectSuper<KType, VType> {}",
    );
}

#[test]
fn test_import_declarations() {
    let source = "import foo.KTypeVTypeClass; class Foo {}";
    check(source, &pair(Kind::Int, Kind::Long), "import foo.IntLongClass; class Foo {}");
    check(
        source,
        &pair(Kind::Int, Kind::Generic),
        "import foo.IntObjectClass; class Foo {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Long),
        "import foo.ObjectLongClass; class Foo {}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "import foo.ObjectObjectClass; class Foo {}",
    );
}

#[test]
fn test_field_declaration() {
    let source = "class KTypeFoo<KType> { KType foo; KType [] foo2; }";
    check(
        source,
        &single(Kind::Float),
        "class FloatFoo { float foo; float [] foo2; }",
    );
    check(
        source,
        &single(Kind::Generic),
        "class ObjectFoo<KType> { KType foo; KType [] foo2; }",
    );
}

#[test]
fn test_class_constructor() {
    let source = "class KTypeVTypeFoo<KType, VType> { public KTypeVTypeFoo(KType k, VType v) {} }";
    check(
        source,
        &pair(Kind::Float, Kind::Double),
        "class FloatDoubleFoo { public FloatDoubleFoo(float k, double v) {} }",
    );
    check(
        source,
        &pair(Kind::Float, Kind::Generic),
        "class FloatObjectFoo<VType> { public FloatObjectFoo(float k, VType v) {} }",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Float),
        "class ObjectFloatFoo<KType> { public ObjectFloatFoo(KType k, float v) {} }",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "class ObjectObjectFoo<KType, VType> { public ObjectObjectFoo(KType k, VType v) {} }",
    );
}

#[test]
fn test_this_reference() {
    let source =
        "class KTypeVTypeFoo<KType, VType> { public void foo() { KTypeVTypeFoo.this.foo(); } }";
    check(
        source,
        &pair(Kind::Float, Kind::Double),
        "class FloatDoubleFoo { public void foo() { FloatDoubleFoo.this.foo(); } }",
    );
}

#[test]
fn test_new_class_diamond() {
    let source = "class KTypeVTypeFoo<KType, VType> { public void foo() { new KTypeVTypeFoo<>(); } }";
    check(
        source,
        &pair(Kind::Float, Kind::Double),
        "class FloatDoubleFoo { public void foo() { new FloatDoubleFoo(); } }",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Double),
        "class ObjectDoubleFoo<KType> { public void foo() { new ObjectDoubleFoo<>(); } }",
    );
}

#[test]
fn test_new_class_explicit_arguments() {
    let source =
        "class KTypeVTypeFoo<KType, VType> { public void foo() { new KTypeVTypeFoo<KType, VType>(); } }";
    check(
        source,
        &pair(Kind::Float, Kind::Double),
        "class FloatDoubleFoo { public void foo() { new FloatDoubleFoo(); } }",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Double),
        "class ObjectDoubleFoo<KType> { public void foo() { new ObjectDoubleFoo<KType>(); } }",
    );
}

#[test]
fn test_static_generic_method() {
    let source =
        "class KTypeVTypeFoo<KType, VType> { static <KType, VType> KTypeVTypeFoo foo(KType[] k, VType[] v) {} }";
    check(
        source,
        &pair(Kind::Float, Kind::Double),
        "class FloatDoubleFoo { static FloatDoubleFoo foo(float[] k, double[] v) {} }",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Double),
        "class ObjectDoubleFoo<KType> { static <KType> ObjectDoubleFoo foo(KType[] k, double[] v) {} }",
    );
}

#[test]
fn test_wildcard_bound() {
    let source = "class KTypeFoo<KType> { void bar(KTypeFoo<?> other) {} }";
    check(
        source,
        &single(Kind::Float),
        "class FloatFoo { void bar(FloatFoo other) {} }",
    );
    check(
        source,
        &single(Kind::Generic),
        "class ObjectFoo<KType> { void bar(ObjectFoo<?> other) {} }",
    );
}

#[test]
fn test_generic_named_type_bound() {
    let source =
        "class KTypeFoo<KType> { public <T extends KTypeBar<? super KType>> T forEach(T v) { throw new R(); } }";
    check(
        source,
        &single(Kind::Float),
        "class FloatFoo { public <T extends FloatBar> T forEach(T v) { throw new R(); } }",
    );
    check(
        source,
        &single(Kind::Generic),
        "class ObjectFoo<KType> { public <T extends ObjectBar<? super KType>> T forEach(T v) { throw new R(); } }",
    );
}

#[test]
fn test_object_constructor_untouched() {
    let source =
        "class KTypeVTypeFoo<KType, VType> { static { HashSet<Object> values = new HashSet<Object>(); }}";
    check(
        source,
        &pair(Kind::Float, Kind::Int),
        "class FloatIntFoo { static { HashSet<Object> values = new HashSet<Object>(); }}",
    );
    check(
        source,
        &pair(Kind::Generic, Kind::Generic),
        "class ObjectObjectFoo<KType, VType> { static { HashSet<Object> values = new HashSet<Object>(); }}",
    );
}

#[test]
fn test_untemplated_type_argument_erases_to_object() {
    let source = "class KTypeFoo<KType> { void foo() { KTypeBar<B> x = new KTypeBar<B>(); } }";
    check(
        source,
        &single(Kind::Float),
        "class FloatFoo { void foo() { ObjectBar<B> x = new ObjectBar<B>(); } }",
    );
    check(
        source,
        &single(Kind::Generic),
        "class ObjectFoo<KType> { void foo() { ObjectBar<B> x = new ObjectBar<B>(); } }",
    );
}

#[test]
fn test_nested_class_erasure() {
    let source = "class KTypeFoo<KType> { static class Nested<KType> extends KTypeBar<KType> {} }";
    check(
        source,
        &single(Kind::Float),
        "class FloatFoo { static class Nested extends FloatBar {} }",
    );
    check(
        source,
        &single(Kind::Generic),
        "class ObjectFoo<KType> { static class Nested<KType> extends ObjectBar<KType> {} }",
    );
}

#[test]
fn test_nested_body_shadowed_from_outer_assignment() {
    let source =
        "class KTypeFoo<KType> { KType outer; static class Nested<KType> { KType inner; } }";
    check(
        source,
        &single(Kind::Float),
        "class FloatFoo { float outer; static class Nested { KType inner; } }",
    );
}

#[test]
fn test_new_slot_array() {
    let source = "class KTypeFoo<KType> { Object b = new KType[4]; }";
    check(
        source,
        &single(Kind::Long),
        "class LongFoo { Object b = new long[4]; }",
    );
    check(
        source,
        &single(Kind::Generic),
        "class ObjectFoo<KType> { Object b = new KType[4]; }",
    );
}

#[test]
fn test_string_literals_are_opaque() {
    let source = "class KTypeFoo<KType> { String s = \"KType stays\"; }";
    check(
        source,
        &single(Kind::Int),
        "class IntFoo { String s = \"KType stays\"; }",
    );
}

#[test]
fn test_determinism() {
    let source = "class KTypeVTypeFoo<KType, VType> { KType k; VType v; /** KTypes */ }";
    let assignment = pair(Kind::Int, Kind::Generic);
    let first = super::try_resolve(source, &assignment);
    let second = super::try_resolve(source, &assignment);
    pretty_assertions::assert_eq!(first, second);
    assert!(first.is_ok());
}

#[test]
fn test_byte_short_char_boolean_forms() {
    let source = "class KTypeBox<KType> { KType value; }";
    check(source, &single(Kind::Byte), "class ByteBox { byte value; }");
    check(source, &single(Kind::Short), "class ShortBox { short value; }");
    check(source, &single(Kind::Char), "class CharBox { char value; }");
    check(
        source,
        &single(Kind::Boolean),
        "class BooleanBox { boolean value; }",
    );
}
