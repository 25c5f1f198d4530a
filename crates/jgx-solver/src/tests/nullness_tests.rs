use super::*;
use crate::capture::capture;
use crate::diagnostics::CollectingReporter;
use jgx_common::CompilerOptions;
use smallvec::smallvec;
use std::sync::Arc;

fn null_aware() -> (TypeInterner, Arc<CollectingReporter>) {
    let reporter = Arc::new(CollectingReporter::new());
    let interner = TypeInterner::with_options(
        CompilerOptions::default().with_null_type_annotations(),
        reporter.clone(),
    );
    (interner, reporter)
}

fn site(source: TypeId) -> CaptureSite {
    CaptureSite {
        source_type: source,
        start: 12,
        end: 30,
        cud: CompilationUnitId(1),
    }
}

/// `class Box<T extends @NonNull Number>`.
fn non_null_box(interner: &TypeInterner) -> ClassId {
    let boxed = interner.declare_class("p/Box", ClassKind::Class, &["T"]);
    let var = interner.type_params(boxed)[0];
    let non_null_number = interner.with_null_tag(TypeId::NUMBER, Some(NullTag::NonNull));
    interner.set_bounds(var, &[non_null_number]).unwrap();
    boxed
}

#[test]
fn test_toplevel_annotation_queries() {
    let (interner, _) = null_aware();
    let list = interner.declare_class("java/util/List", ClassKind::Interface, &["E"]);
    let nullable_string = interner.with_null_tag(TypeId::STRING, Some(NullTag::Nullable));
    let list_of_nullable = interner.parameterized(list, &[nullable_string]);

    assert!(has_toplevel_null_annotation(&interner, nullable_string));
    assert_eq!(null_tag_of(&interner, nullable_string), Some(NullTag::Nullable));
    assert!(!has_toplevel_null_annotation(&interner, list_of_nullable));
    assert_eq!(null_tag_of(&interner, list_of_nullable), None);
    assert!(
        interner
            .flags(list_of_nullable)
            .contains(TagBits::HAS_NULL_TYPE_ANNOTATION)
    );
}

#[test]
fn test_capture_inherits_non_null_from_formal_bound() {
    let (interner, reporter) = null_aware();
    let boxed = non_null_box(&interner);
    let any = interner.wildcard(WildcardShape::unbound(Some(boxed), 0));
    let box_any = interner.parameterized(boxed, &[any]);

    let captured = capture(&interner, box_any, site(TypeId::STRING));
    let cap = interner.parameterized_shape(captured).unwrap().args[0];
    assert_eq!(interner.capture_bounds(cap).null_tag, Some(NullTag::NonNull));
    assert_eq!(null_tag_of(&interner, cap), Some(NullTag::NonNull));
    assert!(!has_toplevel_null_annotation(&interner, cap));
    assert!(reporter.problems().is_empty());
}

#[test]
fn test_capture_takes_wildcard_nullness() {
    let (interner, _) = null_aware();
    let list = interner.declare_class("java/util/List", ClassKind::Interface, &["E"]);
    let non_null_string = interner.with_null_tag(TypeId::STRING, Some(NullTag::NonNull));
    let extends = interner.wildcard(WildcardShape::extends(Some(list), 0, non_null_string));
    let list_extends = interner.parameterized(list, &[extends]);

    let captured = capture(&interner, list_extends, site(TypeId::NUMBER));
    let cap = interner.parameterized_shape(captured).unwrap().args[0];
    assert_eq!(null_tag_of(&interner, cap), Some(NullTag::NonNull));
}

#[test]
fn test_contradictory_capture_nullness_is_reported() {
    let (interner, reporter) = null_aware();
    let boxed = non_null_box(&interner);
    let nullable_any = interner.wildcard_annotated(
        WildcardShape::unbound(Some(boxed), 0),
        smallvec![TypeAnnotation::Nullable],
    );
    let box_nullable = interner.parameterized(boxed, &[nullable_any]);

    let captured = capture(&interner, box_nullable, site(TypeId::STRING));
    let cap = interner.parameterized_shape(captured).unwrap().args[0];
    let non_null_number = interner.with_null_tag(TypeId::NUMBER, Some(NullTag::NonNull));

    assert_eq!(
        reporter.take(),
        vec![Problem::ContradictoryNullAnnotationsOnBounds {
            ty: cap,
            bound: non_null_number,
        }]
    );
    assert_eq!(interner.capture_bounds(cap).null_tag, None);
    // The use itself stays annotated.
    assert_eq!(null_tag_of(&interner, cap), Some(NullTag::Nullable));
}

#[test]
fn test_capture_null_tag_skips_self_and_untagged_bounds() {
    let (interner, reporter) = null_aware();
    let list = interner.declare_class("java/util/List", ClassKind::Interface, &["E"]);
    let wildcard = interner.wildcard(WildcardShape::unbound(Some(list), 0));
    let cap = interner.captured_wildcard(wildcard, site(TypeId::STRING));

    let mut bounds = CaptureBounds::object();
    bounds.first_bound = Some(cap);
    bounds.super_interfaces = smallvec![TypeId::SERIALIZABLE];
    assert_eq!(capture_null_tag(&interner, cap, wildcard, &bounds), None);

    let nullable_cloneable = interner.with_null_tag(TypeId::CLONEABLE, Some(NullTag::Nullable));
    bounds.super_interfaces.push(nullable_cloneable);
    assert_eq!(capture_null_tag(&interner, cap, wildcard, &bounds), None);
    assert!(reporter.problems().is_empty());
}

#[test]
fn test_overlay_disabled_leaves_captures_untagged() {
    let interner = TypeInterner::new();
    let boxed = non_null_box(&interner);
    let any = interner.wildcard(WildcardShape::unbound(Some(boxed), 0));
    let captured = capture(
        &interner,
        interner.parameterized(boxed, &[any]),
        site(TypeId::STRING),
    );
    let cap = interner.parameterized_shape(captured).unwrap().args[0];
    assert_eq!(interner.capture_bounds(cap).null_tag, None);
}
