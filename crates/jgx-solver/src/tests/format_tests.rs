use super::*;
use crate::capture::capture;
use smallvec::smallvec;

struct Fixture {
    interner: TypeInterner,
    list: ClassId,
    map: ClassId,
}

fn fixture() -> Fixture {
    let interner = TypeInterner::new();
    let list = interner.declare_class("java/util/List", ClassKind::Interface, &["E"]);
    let map = interner.declare_class("java/util/Map", ClassKind::Interface, &["K", "V"]);
    Fixture {
        interner,
        list,
        map,
    }
}

fn site() -> CaptureSite {
    CaptureSite {
        source_type: TypeId::STRING,
        start: 0,
        end: 8,
        cud: CompilationUnitId(0),
    }
}

#[test]
fn test_class_names() {
    let f = fixture();
    let i = &f.interner;
    assert_eq!(readable_name(i, TypeId::STRING), "java.lang.String");
    assert_eq!(short_readable_name(i, TypeId::STRING), "String");
    assert_eq!(debug_name(i, TypeId::INT), "int");
    assert_eq!(debug_name(i, TypeId::NULL), "null");
    assert_eq!(debug_name(i, TypeId::ERROR), "<error>");
    assert_eq!(debug_name(i, TypeId::BOUND_MISMATCH), "<bound mismatch>");

    assert_eq!(short_readable_name(i, i.class_type(f.map)), "Map<K,V>");
    assert_eq!(readable_name(i, i.raw(f.list)), "java.util.List");
    assert_eq!(short_readable_name(i, i.raw(f.list)), "List");
    assert_eq!(
        short_readable_name(i, i.array(TypeId::INT, 2)),
        "int[][]"
    );
}

#[test]
fn test_parameterized_names() {
    let f = fixture();
    let i = &f.interner;
    let map = i.parameterized(f.map, &[TypeId::STRING, i.parameterized(f.list, &[TypeId::INTEGER])]);
    assert_eq!(
        readable_name(i, map),
        "java.util.Map<java.lang.String,java.util.List<java.lang.Integer>>"
    );
    assert_eq!(short_readable_name(i, map), "Map<String,List<Integer>>");

    let outer = i.declare_class("p/Outer", ClassKind::Class, &["T"]);
    let inner = i.declare_member_class("p/Outer$Inner", ClassKind::Class, outer, &["U"]);
    let nested = i.parameterized_in(
        inner,
        &[TypeId::INTEGER],
        Some(i.parameterized(outer, &[TypeId::STRING])),
    );
    assert_eq!(short_readable_name(i, nested), "Outer<String>.Inner<Integer>");
    assert_eq!(
        readable_name(i, nested),
        "p.Outer<java.lang.String>.Inner<java.lang.Integer>"
    );
    assert_eq!(short_readable_name(i, i.raw(inner)), "Outer.Inner");
    assert_eq!(readable_name(i, i.raw(inner)), "p.Outer.Inner");
}

#[test]
fn test_wildcard_and_capture_names() {
    let f = fixture();
    let i = &f.interner;
    let list = Some(f.list);
    let any = i.wildcard(WildcardShape::unbound(list, 0));
    let extends = i.wildcard(WildcardShape::extends(list, 0, TypeId::NUMBER));
    let super_ = i.wildcard(WildcardShape::super_(list, 0, TypeId::INTEGER));
    let glb = i.wildcard(WildcardShape::new(
        list,
        0,
        BoundKind::Extends,
        Some(TypeId::NUMBER),
        &[TypeId::SERIALIZABLE],
    ));

    assert_eq!(short_readable_name(i, i.parameterized(f.list, &[any])), "List<?>");
    assert_eq!(short_readable_name(i, extends), "? extends Number");
    assert_eq!(short_readable_name(i, super_), "? super Integer");
    assert_eq!(short_readable_name(i, glb), "Number&Serializable");

    let captured = capture(i, i.parameterized(f.list, &[extends]), site());
    let cap = i.parameterized_shape(captured).unwrap().args[0];
    let id = i.capture_shape(cap).unwrap().capture_id;
    assert_eq!(
        short_readable_name(i, captured),
        format!("List<capture#{id}-of ? extends Number>")
    );

    let both = i.intersection(&[TypeId::NUMBER, TypeId::CLONEABLE]);
    assert_eq!(short_readable_name(i, both), "Number & Cloneable");
}

#[test]
fn test_variable_names() {
    let f = fixture();
    let i = &f.interner;
    let e = i.type_param_types(f.list)[0];
    assert_eq!(short_readable_name(i, e), "E");
    assert_eq!(short_readable_name(i, i.fresh_inference_variable("α")), "α");
}

#[test]
fn test_debug_name_shows_annotations() {
    let f = fixture();
    let i = &f.interner;
    let non_null = i.with_null_tag(TypeId::STRING, Some(NullTag::NonNull));
    assert_eq!(debug_name(i, non_null), "@NonNull java.lang.String");
    assert_eq!(readable_name(i, non_null), "java.lang.String");

    let marker = i.annotation_named("p/Marker");
    let marked = i.with_annotations(i.parameterized(f.list, &[non_null]), smallvec![marker]);
    assert_eq!(
        debug_name(i, marked),
        "@Marker java.util.List<@NonNull java.lang.String>"
    );
    assert_eq!(short_readable_name(i, marked), "List<String>");
}

#[test]
fn test_erased_signatures() {
    let f = fixture();
    let i = &f.interner;
    assert_eq!(signature(i, TypeId::INT), "I");
    assert_eq!(signature(i, TypeId::STRING), "Ljava/lang/String;");
    assert_eq!(
        signature(i, i.parameterized(f.list, &[TypeId::STRING])),
        "Ljava/util/List;"
    );
    assert_eq!(
        signature(i, i.array(i.parameterized(f.list, &[TypeId::STRING]), 2)),
        "[[Ljava/util/List;"
    );
    assert_eq!(signature(i, i.type_param_types(f.list)[0]), "Ljava/lang/Object;");
    assert_eq!(signature(i, TypeId::ERROR), "Ljava/lang/Object;");

    let extends = i.wildcard(WildcardShape::extends(Some(f.list), 0, TypeId::NUMBER));
    let captured = capture(i, i.parameterized(f.list, &[extends]), site());
    let cap = i.parameterized_shape(captured).unwrap().args[0];
    assert_eq!(signature(i, cap), "Ljava/lang/Number;");
}

#[test]
fn test_generic_signatures() {
    let f = fixture();
    let i = &f.interner;
    let list = Some(f.list);
    assert_eq!(generic_signature(i, i.class_type(f.map)), "Ljava/util/Map<TK;TV;>;");
    assert_eq!(generic_signature(i, i.raw(f.map)), "Ljava/util/Map;");
    assert_eq!(
        generic_signature(i, i.parameterized(f.map, &[TypeId::STRING, TypeId::INTEGER])),
        "Ljava/util/Map<Ljava/lang/String;Ljava/lang/Integer;>;"
    );

    let wildcards = i.parameterized(
        f.map,
        &[
            i.wildcard(WildcardShape::extends(list, 0, TypeId::NUMBER)),
            i.wildcard(WildcardShape::super_(list, 1, TypeId::INTEGER)),
        ],
    );
    assert_eq!(
        generic_signature(i, wildcards),
        "Ljava/util/Map<+Ljava/lang/Number;-Ljava/lang/Integer;>;"
    );
    assert_eq!(
        generic_signature(i, i.parameterized(f.list, &[i.wildcard(WildcardShape::unbound(list, 0))])),
        "Ljava/util/List<*>;"
    );
    assert_eq!(generic_signature(i, i.array(TypeId::INT, 1)), "[I");
    assert_eq!(generic_signature(i, i.fresh_inference_variable("α")), "^α;");
    assert_eq!(generic_signature(i, TypeId::NULL), "Ljava/lang/Object;");

    let outer = i.declare_class("p/Outer", ClassKind::Class, &["T"]);
    let inner = i.declare_member_class("p/Outer$Inner", ClassKind::Class, outer, &["U"]);
    let nested = i.parameterized_in(
        inner,
        &[TypeId::INTEGER],
        Some(i.parameterized(outer, &[TypeId::STRING])),
    );
    assert_eq!(
        generic_signature(i, nested),
        "Lp/Outer<Ljava/lang/String;>.Inner<Ljava/lang/Integer;>;"
    );
}

#[test]
fn test_capture_generic_signatures() {
    let f = fixture();
    let i = &f.interner;
    let list = Some(f.list);

    let extends = i.wildcard(WildcardShape::extends(list, 0, TypeId::NUMBER));
    let captured = capture(i, i.parameterized(f.list, &[extends]), site());
    assert_eq!(generic_signature(i, captured), "Ljava/util/List<Ljava/lang/Number;>;");

    let any = i.wildcard(WildcardShape::unbound(list, 0));
    let captured = capture(i, i.parameterized(f.list, &[any]), site());
    assert_eq!(generic_signature(i, captured), "Ljava/util/List<Ljava/lang/Object;>;");
}

#[test]
fn test_self_capture_generic_signature_terminates() {
    let f = fixture();
    let i = &f.interner;
    // class X<T extends X<T>>
    let x = i.declare_class("p/X", ClassKind::Class, &["T"]);
    let var = i.type_params(x)[0];
    i.set_bounds(var, &[i.parameterized(x, &[i.type_param(var)])]).unwrap();

    let any = i.wildcard(WildcardShape::unbound(Some(x), 0));
    let captured = capture(i, i.parameterized(x, &[any]), site());
    assert_eq!(generic_signature(i, captured), "Lp/X<Lp/X<Ljava/lang/Object;>;>;");
}
