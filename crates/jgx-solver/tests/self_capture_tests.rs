//! F-bounded declarations: `class X<T extends X<T>>`.
//!
//! Capturing `X<? extends X<? extends X<?>>>` produces captures whose bounds
//! mention captured types again. Every algorithm walking those bounds has to
//! terminate and agree with the others.

use crate::*;
use jgx_common::{CompilerOptions, JavaRelease};
use std::sync::Arc;

struct SelfBounded {
    interner: TypeInterner,
    x: ClassId,
    /// `?`
    innermost: TypeId,
    /// `? extends X<? extends X<?>>`
    outer: TypeId,
    /// `X<? extends X<?>>`
    outer_bound: TypeId,
}

fn self_bounded(interner: TypeInterner) -> SelfBounded {
    let x = interner.declare_class("p/X", ClassKind::Class, &["T"]);
    let var = interner.type_params(x)[0];
    interner
        .set_bounds(var, &[interner.parameterized(x, &[interner.type_param(var)])])
        .unwrap();

    let innermost = interner.wildcard(WildcardShape::unbound(Some(x), 0));
    let middle = interner.wildcard(WildcardShape::extends(
        Some(x),
        0,
        interner.parameterized(x, &[innermost]),
    ));
    let outer_bound = interner.parameterized(x, &[middle]);
    let outer = interner.wildcard(WildcardShape::extends(Some(x), 0, outer_bound));
    SelfBounded {
        interner,
        x,
        innermost,
        outer,
        outer_bound,
    }
}

fn site() -> CaptureSite {
    CaptureSite {
        source_type: TypeId::STRING,
        start: 12,
        end: 20,
        cud: CompilationUnitId(0),
    }
}

fn java7() -> TypeInterner {
    TypeInterner::with_options(
        CompilerOptions::for_release(JavaRelease::JAVA_7),
        Arc::new(TracingReporter),
    )
}

/// `RUST_LOG=jgx_solver=trace` shows each guard re-entry while these run.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The capture standing in the single argument of `ty`.
fn arg_capture(interner: &TypeInterner, ty: TypeId) -> TypeId {
    let arg = interner.parameterized_shape(ty).unwrap().args[0];
    assert!(interner.is_capture(arg));
    arg
}

#[test]
fn test_simple_self_capture() {
    let s = self_bounded(TypeInterner::new());
    let i = &s.interner;
    let captured = capture(i, i.parameterized(s.x, &[s.innermost]), site());
    let cap = arg_capture(i, captured);

    let bounds = i.capture_bounds(cap);
    assert_eq!(bounds.superclass, captured);
    assert_eq!(bounds.first_bound, Some(captured));
    assert!(is_compatible_with(i, cap, captured));
    assert!(is_compatible_with(i, captured, i.parameterized(s.x, &[s.innermost])));
    assert_eq!(signature(i, cap), "Lp/X;");
    assert_eq!(erasure(i, cap), i.class_type(s.x));
}

#[test]
fn test_three_level_capture_keeps_declared_bound() {
    init_logging();
    let s = self_bounded(TypeInterner::new());
    let i = &s.interner;
    let receiver = i.parameterized(s.x, &[s.outer]);
    let captured = capture(i, receiver, site());
    let cap = arg_capture(i, captured);

    let bounds = i.capture_bounds(cap);
    assert_eq!(bounds.superclass, s.outer_bound);
    assert_eq!(bounds.first_bound, Some(s.outer_bound));
    assert!(is_compatible_with(i, cap, s.outer_bound));
    assert!(is_compatible_with(i, captured, receiver));

    assert_eq!(upwards_projection(i, captured, &[cap]), receiver);
    assert_eq!(upwards_projection(i, cap, &[cap]), s.outer_bound);

    let id = i.capture_shape(cap).unwrap().capture_id;
    assert_eq!(
        short_readable_name(i, captured),
        format!("X<capture#{id}-of ? extends X<? extends X<?>>>")
    );
    assert_eq!(
        compute_unique_key(i, cap, true),
        "Ljava/lang/String;&!Lp/X;{0}+Lp/X<Lp/X;{0}+Lp/X<Lp/X;{0}*>;>;20;"
    );
}

#[test]
fn test_three_level_recapture_before_java8() {
    init_logging();
    let s = self_bounded(java7());
    let i = &s.interner;
    let receiver = i.parameterized(s.x, &[s.outer]);
    let captured = capture(i, receiver, site());

    // Every extends bound is itself captured at the same site.
    let first = arg_capture(i, captured);
    let second = arg_capture(i, i.capture_bounds(first).first_bound.unwrap());
    let third = arg_capture(i, i.capture_bounds(second).first_bound.unwrap());
    let third_bound = i.capture_bounds(third).first_bound.unwrap();
    assert_eq!(arg_capture(i, third_bound), third);
    assert_eq!(i.capture_shape(third).unwrap().wildcard, s.innermost);
    assert_eq!(i.live_captures(), 3);

    assert!(is_compatible_with(i, captured, receiver));
    assert!(is_compatible_with(i, third, third_bound));
    assert_eq!(
        generic_signature(i, captured),
        "Lp/X<Lp/X<Lp/X<Lp/X<Ljava/lang/Object;>;>;>;>;"
    );

    let all = [first, second, third];
    let projected = upwards_projection(i, captured, &all);
    assert!(!mentions_any(i, projected, &all));
    assert!(is_compatible_with(i, captured, projected));
    assert_eq!(i.class_of(projected), Some(s.x));
    assert_eq!(downwards_projection(i, captured, &all), None);
}

#[test]
fn test_self_capture_substitution_through_inference_variable() {
    let s = self_bounded(TypeInterner::new());
    let i = &s.interner;
    let alpha = i.fresh_inference_variable("α");
    let extends_alpha = i.wildcard(WildcardShape::extends(Some(s.x), 0, alpha));
    let captured = capture(i, i.parameterized(s.x, &[extends_alpha]), site());
    let cap = arg_capture(i, captured);
    assert_eq!(i.capture_bounds(cap).first_bound, Some(alpha));

    let result = substitute_inference_variable(i, captured, alpha, s.outer_bound);
    let clone = arg_capture(i, result);
    assert_ne!(clone, cap);
    assert_eq!(
        i.capture_shape(clone).unwrap().capture_id,
        i.capture_shape(cap).unwrap().capture_id
    );
    assert_eq!(i.capture_bounds(clone).first_bound, Some(s.outer_bound));
    assert!(wildcard::is_proper_type(i, result));
}
