//! End-to-end scenarios across capture, projection, inference and keys.
//!
//! Each test plays the part of a front end: it declares a small class
//! table, captures a receiver, substitutes member types through it and
//! checks what a user would finally see.

use crate::*;
use jgx_common::{CompilerOptions, JavaRelease};
use std::sync::Arc;

/// `Collection<E>`, `List<E> extends Collection<E>`, `ArrayList<E> implements List<E>`.
struct Library {
    interner: TypeInterner,
    collection: ClassId,
    list: ClassId,
    array_list: ClassId,
}

fn library_with(interner: TypeInterner) -> Library {
    let collection = interner.declare_class("java/util/Collection", ClassKind::Interface, &["E"]);
    let list = interner.declare_class("java/util/List", ClassKind::Interface, &["E"]);
    let array_list = interner.declare_class("java/util/ArrayList", ClassKind::Class, &["E"]);

    let list_e = interner.type_param_types(list)[0];
    interner
        .set_supertypes(list, None, &[interner.parameterized(collection, &[list_e])])
        .unwrap();
    let array_list_e = interner.type_param_types(array_list)[0];
    interner
        .set_supertypes(
            array_list,
            Some(TypeId::OBJECT),
            &[interner.parameterized(list, &[array_list_e])],
        )
        .unwrap();
    Library {
        interner,
        collection,
        list,
        array_list,
    }
}

fn library() -> Library {
    library_with(TypeInterner::new())
}

fn site_in(cud: u32, start: u32) -> CaptureSite {
    CaptureSite {
        source_type: TypeId::STRING,
        start,
        end: start + 20,
        cud: CompilationUnitId(cud),
    }
}

#[test]
fn test_var_of_element_from_extends_wildcard_list() {
    // List<? extends Number> list; var x = list.get(0);
    let lib = library();
    let i = &lib.interner;
    let extends_number = i.wildcard(WildcardShape::extends(Some(lib.list), 0, TypeId::NUMBER));
    let receiver = i.parameterized(lib.list, &[extends_number]);

    let captured = capture(i, receiver, site_in(1, 100));
    let cap = i.parameterized_shape(captured).unwrap().args[0];
    let get_return = i.type_param_types(lib.list)[0];
    let element = substitute(i, captured, get_return);
    assert_eq!(element, cap);

    let visible = upwards_projection(i, element, &[cap]);
    assert_eq!(visible, TypeId::NUMBER);
    assert_eq!(readable_name(i, visible), "java.lang.Number");

    // var y = list;
    assert_eq!(upwards_projection(i, captured, &[cap]), receiver);
}

#[test]
fn test_captured_receiver_is_still_a_collection() {
    let lib = library();
    let i = &lib.interner;
    let any = i.wildcard(WildcardShape::unbound(Some(lib.list), 0));
    let captured = capture(i, i.parameterized(lib.list, &[any]), site_in(1, 0));
    let cap = i.parameterized_shape(captured).unwrap().args[0];

    let as_collection = find_super_type_originating_from(i, captured, lib.collection).unwrap();
    assert_eq!(as_collection, i.parameterized(lib.collection, &[cap]));

    let collection_any = i.parameterized(
        lib.collection,
        &[i.wildcard(WildcardShape::unbound(Some(lib.collection), 0))],
    );
    assert!(is_compatible_with(i, captured, collection_any));
    assert!(!is_compatible_with(
        i,
        captured,
        i.parameterized(lib.collection, &[TypeId::OBJECT])
    ));
}

#[test]
fn test_generic_method_inference_with_wildcard_formals() {
    // static <T> void copy(List<? super T> dst, List<? extends T> src)
    let lib = library();
    let i = &lib.interner;
    let owner = i.declare_class("java/util/Collections", ClassKind::Class, &[]);
    let var = i.declare_method_type_param(owner, "copy", "T", 0);
    let t = i.type_param(var);
    let dst = i.parameterized(lib.list, &[i.wildcard(WildcardShape::super_(Some(lib.list), 0, t))]);
    let src = i.parameterized(lib.list, &[i.wildcard(WildcardShape::extends(Some(lib.list), 0, t))]);

    let dst_actual = i.parameterized(lib.array_list, &[TypeId::NUMBER]);
    let src_actual = i.parameterized(lib.list, &[TypeId::INTEGER]);

    let mut ctx = InferenceContext::with_targets(&[t]);
    collect_substitutes(i, dst, dst_actual, ConstraintKind::Extends, &mut ctx);
    collect_substitutes(i, src, src_actual, ConstraintKind::Extends, &mut ctx);
    assert!(!ctx.is_unchecked());

    let constraints = ctx.constraints(t);
    assert_eq!(constraints.lower_bounds.iter().copied().collect::<Vec<_>>(), vec![TypeId::INTEGER]);
    assert_eq!(constraints.upper_bounds.iter().copied().collect::<Vec<_>>(), vec![TypeId::NUMBER]);

    // Pick the lower bound and check the call against the instantiated formals.
    let mut subst = TypeSubstitution::new();
    subst.insert(var, TypeId::INTEGER);
    let dst_formal = instantiate_type(i, dst, &subst);
    let src_formal = instantiate_type(i, src, &subst);
    assert_eq!(short_readable_name(i, dst_formal), "List<? super Integer>");
    assert!(is_compatible_with(i, dst_actual, dst_formal));
    assert!(is_compatible_with(i, src_actual, src_formal));
}

#[test]
fn test_raw_argument_makes_inference_unchecked() {
    let lib = library();
    let i = &lib.interner;
    let alpha = i.fresh_inference_variable("α");
    let mut ctx = InferenceContext::with_targets(&[alpha]);
    collect_substitutes(
        i,
        i.parameterized(lib.list, &[alpha]),
        i.raw(lib.array_list),
        ConstraintKind::Extends,
        &mut ctx,
    );
    assert!(ctx.is_unchecked());
    assert!(ctx.constraints(alpha).is_empty());
}

#[test]
fn test_inference_variable_resolution_flows_through_wildcards() {
    let lib = library();
    let i = &lib.interner;
    let alpha = i.fresh_inference_variable("α");
    let mut ctx = InferenceContext::with_targets(&[alpha]);
    collect_substitutes(
        i,
        i.parameterized(lib.list, &[alpha]),
        i.parameterized(lib.array_list, &[TypeId::STRING]),
        ConstraintKind::Extends,
        &mut ctx,
    );
    let resolved = ctx.resolved(alpha).unwrap();
    assert_eq!(resolved, TypeId::STRING);

    let extends_alpha = i.wildcard(WildcardShape::extends(Some(lib.collection), 0, alpha));
    let pending = i.parameterized(lib.collection, &[extends_alpha]);
    assert!(!wildcard::is_proper_type(i, pending));
    let result = substitute_inference_variable(i, pending, alpha, resolved);
    assert!(wildcard::is_proper_type(i, result));
    assert_eq!(
        generic_signature(i, result),
        "Ljava/util/Collection<+Ljava/lang/String;>;"
    );
}

#[test]
fn test_unique_keys_survive_compilation_unit_discard() {
    let lib = library();
    let i = &lib.interner;
    let any = i.wildcard(WildcardShape::unbound(Some(lib.list), 0));
    let receiver = i.parameterized(lib.list, &[any]);

    let first = capture(i, receiver, site_in(4, 10));
    let first_cap = i.parameterized_shape(first).unwrap().args[0];
    let key = compute_unique_key(i, first_cap, true);
    assert_eq!(capture(i, receiver, site_in(4, 10)), first);

    i.discard_compilation_unit(CompilationUnitId(4));
    let second = capture(i, receiver, site_in(4, 10));
    let second_cap = i.parameterized_shape(second).unwrap().args[0];
    assert_ne!(second_cap, first_cap);
    assert_eq!(compute_unique_key(i, second_cap, true), key);
}

#[test]
fn test_options_document_drives_capture_and_nullness() {
    let options = CompilerOptions::from_json(
        r#"{
            "compilerOptions": {
                "release": "1.7",
                "nullTypeAnnotations": "true",
                "nonNullAnnotation": "p.NN",
                "nullableAnnotation": "p.N"
            }
        }"#,
    )
    .unwrap();
    assert_eq!(options.release, JavaRelease::JAVA_7);

    let reporter = Arc::new(CollectingReporter::new());
    let lib = library_with(TypeInterner::with_options(options, reporter.clone()));
    let i = &lib.interner;
    assert_eq!(i.annotation_named("p.NN"), TypeAnnotation::NonNull);
    assert_eq!(i.annotation_named("p/N"), TypeAnnotation::Nullable);

    let any = i.wildcard(WildcardShape::unbound(Some(lib.list), 0));
    let list_any = i.parameterized(lib.list, &[any]);
    let extends = i.wildcard(WildcardShape::extends(Some(lib.list), 0, list_any));
    let captured = capture(i, i.parameterized(lib.list, &[extends]), site_in(0, 0));
    let cap = i.parameterized_shape(captured).unwrap().args[0];
    let first = i.capture_bounds(cap).first_bound.unwrap();
    assert!(i.is_capture(i.parameterized_shape(first).unwrap().args[0]));
    assert!(reporter.problems().is_empty());

    let both = i.with_annotations(
        TypeId::STRING,
        smallvec::smallvec![TypeAnnotation::NonNull, TypeAnnotation::Nullable],
    );
    assert_eq!(
        reporter.take(),
        vec![Problem::ContradictoryNullAnnotations { ty: both }]
    );
}

#[test]
fn test_problem_types_do_not_cascade() {
    let lib = library();
    let i = &lib.interner;
    let list_error = i.parameterized(lib.list, &[TypeId::ERROR]);
    assert!(is_compatible_with(i, TypeId::ERROR, TypeId::STRING));
    assert!(is_compatible_with(i, TypeId::STRING, TypeId::ERROR));
    assert_eq!(compute_unique_key(i, list_error, false), "Ljava/util/List<Ljava/lang/Object;>;");
    assert_eq!(signature(i, TypeId::BOUND_MISMATCH), "Ljava/lang/Object;");
}
