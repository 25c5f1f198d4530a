use super::*;

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

fn key(interner: &TypeInterner, ty: TypeId) -> String {
    compute_unique_key(interner, ty, false)
}

#[test]
fn test_simple_name() {
    assert_eq!(simple_name("p/Outer$Inner"), "Inner");
    assert_eq!(simple_name("java/lang/String"), "String");
    assert_eq!(simple_name("Top"), "Top");
}

#[test]
fn test_class_keys() {
    let f = fixture();
    let i = &f.interner;
    assert_eq!(key(i, TypeId::STRING), "Ljava/lang/String;");
    assert_eq!(key(i, TypeId::INT), "I");
    assert_eq!(key(i, TypeId::ERROR), "Ljava/lang/Object;");
    assert_eq!(key(i, TypeId::BOUND_MISMATCH), "Ljava/lang/Object;");

    let generic = i.class_type(f.map);
    assert_eq!(key(i, generic), "Ljava/util/Map;");
    assert_eq!(compute_unique_key(i, generic, true), "Ljava/util/Map<TK;TV;>;");
    assert_eq!(compute_unique_key(i, TypeId::STRING, true), "Ljava/lang/String;");
    assert_eq!(key(i, i.raw(f.list)), "Ljava/util/List<>;");
}

#[test]
fn test_parameterized_and_array_keys() {
    let f = fixture();
    let i = &f.interner;
    let map_string_integer = i.parameterized(f.map, &[TypeId::STRING, TypeId::INTEGER]);
    assert_eq!(
        key(i, map_string_integer),
        "Ljava/util/Map<Ljava/lang/String;Ljava/lang/Integer;>;"
    );
    assert_eq!(
        key(i, i.array(i.parameterized(f.list, &[TypeId::STRING]), 2)),
        "[[Ljava/util/List<Ljava/lang/String;>;"
    );
    assert_eq!(key(i, i.array(TypeId::INT, 1)), "[I");
}

#[test]
fn test_member_type_keys() {
    let f = fixture();
    let i = &f.interner;
    let outer = i.declare_class("p/Outer", ClassKind::Class, &["T"]);
    let inner = i.declare_member_class("p/Outer$Inner", ClassKind::Class, outer, &["U"]);
    let outer_string = i.parameterized(outer, &[TypeId::STRING]);
    let ty = i.parameterized_in(inner, &[TypeId::INTEGER], Some(outer_string));
    assert_eq!(
        key(i, ty),
        "Lp/Outer<Ljava/lang/String;>.Inner<Ljava/lang/Integer;>;"
    );
}

#[test]
fn test_wildcard_keys() {
    let f = fixture();
    let i = &f.interner;
    let unbound = i.wildcard(WildcardShape::unbound(Some(f.map), 1));
    assert_eq!(key(i, unbound), "Ljava/util/Map;{1}*");

    let extends = i.wildcard(WildcardShape::extends(Some(f.list), 0, TypeId::NUMBER));
    assert_eq!(key(i, extends), "Ljava/util/List;{0}+Ljava/lang/Number;");

    let super_ = i.wildcard(WildcardShape::super_(Some(f.list), 0, TypeId::INTEGER));
    assert_eq!(key(i, super_), "Ljava/util/List;{0}-Ljava/lang/Integer;");

    let detached = i.wildcard(WildcardShape::unbound(None, 0));
    assert_eq!(key(i, detached), "{0}*");

    assert_eq!(
        key(i, i.parameterized(f.list, &[extends])),
        "Ljava/util/List<Ljava/util/List;{0}+Ljava/lang/Number;>;"
    );
}

#[test]
fn test_type_variable_keys() {
    let f = fixture();
    let i = &f.interner;
    let e = i.type_param_types(f.list)[0];
    assert_eq!(key(i, e), "Ljava/util/List;:TE;");

    let x = i.declare_class("p/X", ClassKind::Class, &[]);
    let var = i.declare_method_type_param(x, "sel", "T", 0);
    assert_eq!(key(i, i.type_param(var)), "Lp/X;.sel:TT;");

    let alpha = i.fresh_inference_variable("α");
    assert_eq!(key(i, alpha), "^α;");
}

#[test]
fn test_capture_keys() {
    let f = fixture();
    let i = &f.interner;
    let any = i.wildcard(WildcardShape::unbound(Some(f.list), 0));
    let site = CaptureSite {
        source_type: TypeId::STRING,
        start: 4,
        end: 10,
        cud: CompilationUnitId(0),
    };
    let capture = i.captured_wildcard(any, site);

    assert_eq!(
        compute_unique_key(i, capture, true),
        "Ljava/lang/String;&!Ljava/util/List;{0}*10;"
    );
    assert_eq!(key(i, capture), "!Ljava/util/List;{0}*10;");

    // A parameterized type holding a foreign capture is anchored to the
    // capture's source type.
    assert_eq!(
        key(i, i.parameterized(f.list, &[capture])),
        "Ljava/lang/String;&Ljava/util/List<!Ljava/util/List;{0}*10;>;"
    );

    let own_site = CaptureSite {
        source_type: i.class_type(f.list),
        ..site
    };
    let own = i.captured_wildcard(any, own_site);
    assert_eq!(
        key(i, i.parameterized(f.list, &[own])),
        "Ljava/util/List<!Ljava/util/List;{0}*10;>;"
    );
}

#[test]
fn test_keys_are_deterministic_across_interners() {
    let build = || {
        let f = fixture();
        let i = &f.interner;
        let extends = i.wildcard(WildcardShape::extends(Some(f.list), 0, TypeId::NUMBER));
        let ty = i.parameterized(f.map, &[TypeId::STRING, i.parameterized(f.list, &[extends])]);
        compute_unique_key(i, ty, true)
    };
    assert_eq!(build(), build());
}
