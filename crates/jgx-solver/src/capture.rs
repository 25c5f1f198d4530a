//! Capture conversion (JLS 5.1.10).
//!
//! `capture` replaces every wildcard argument of a parameterized type by a
//! fresh capture, then computes each capture's bounds from the wildcard
//! bound and the formal bounds of the type variable it stands for, the
//! latter substituted through the captured type itself.
//!
//! The substitution makes F-bounded declarations self-referential: for
//! `class X<T extends X<T>>`, capturing `X<?>` yields `X<CAP>` with
//! `CAP <: X<CAP>`. The only cycle the bound synthesis itself can hit is a
//! substituted bound that *is* the capture being initialized, which falls
//! back to the unsubstituted formal bound.

use crate::hierarchy::{greatest_lower_bound, is_superclass_of};
use crate::instantiate::substitute;
use crate::intern::TypeInterner;
use crate::nullness::capture_null_tag;
use crate::types::*;
use crate::wildcard::type_variable;
use smallvec::SmallVec;
use tracing::{debug, trace};

/// Capture-convert `ty` at `site`.
///
/// Types without wildcard arguments are returned unchanged. Capturing the
/// same occurrence twice in one pass returns the same captured type.
pub fn capture(interner: &TypeInterner, ty: TypeId, site: CaptureSite) -> TypeId {
    if !interner.flags(ty).contains(TagBits::HAS_DIRECT_WILDCARD) {
        return ty;
    }
    let Some(shape) = interner.parameterized_shape(ty) else {
        return ty;
    };

    let mut fresh: SmallVec<[TypeId; 2]> = SmallVec::new();
    let args: TypeList = shape
        .args
        .iter()
        .map(|&arg| {
            if interner.is_wildcard(arg) {
                let capture = interner.captured_wildcard(arg, site);
                fresh.push(capture);
                capture
            } else {
                arg
            }
        })
        .collect();

    let captured = interner.parameterized_in(shape.generic, &args, shape.enclosing);
    let captured = match interner.annotations(ty) {
        annotations if annotations.is_empty() => captured,
        annotations => interner.with_annotations(captured, annotations),
    };
    trace!(ty = ty.0, captured = captured.0, captures = fresh.len(), "captured type");

    for capture in fresh {
        initialize_bounds(interner, capture, captured);
    }
    captured
}

/// Compute and store the bounds of `capture` against `captured_owner`, the
/// parameterized type it is an argument of. Already initialized captures
/// are left alone.
pub fn initialize_bounds(interner: &TypeInterner, capture: TypeId, captured_owner: TypeId) {
    if interner.has_capture_bounds(capture) {
        return;
    }
    let Some(shape) = interner.capture_shape(capture) else {
        return;
    };
    let Some(wildcard) = interner.wildcard_shape(shape.wildcard) else {
        debug!(capture = capture.0, "captured type is not a wildcard");
        interner.set_capture_bounds(capture, CaptureBounds::object());
        return;
    };

    let bounds = match type_variable(interner, &wildcard) {
        None => degenerate_bounds(interner, capture, &shape, &wildcard),
        Some(var) => {
            let mut bounds = variable_bounds(interner, capture, &shape, &wildcard, var, captured_owner);
            if interner.uses_null_type_annotations() {
                bounds.null_tag = capture_null_tag(interner, capture, shape.wildcard, &bounds);
            }
            bounds
        }
    };
    trace!(
        capture = capture.0,
        superclass = bounds.superclass.0,
        interfaces = ?bounds.super_interfaces,
        lower = ?bounds.lower_bound,
        "initialized capture bounds"
    );
    interner.set_capture_bounds(capture, bounds);
}

/// The bound of an `extends` wildcard as it appears in the capture's
/// bounds. Before Java 8 the bound is itself captured at the same site.
fn captured_wildcard_bound(
    interner: &TypeInterner,
    shape: &CaptureShape,
    bound: TypeId,
) -> TypeId {
    if interner.options().release.is_java8_or_later() {
        bound
    } else {
        capture(interner, bound, shape.site())
    }
}

/// Bounds for a wildcard whose formal variable cannot be resolved, as in
/// `Zork<?>`. Nothing is substituted.
fn degenerate_bounds(
    interner: &TypeInterner,
    capture: TypeId,
    shape: &CaptureShape,
    wildcard: &WildcardShape,
) -> CaptureBounds {
    let mut bounds = CaptureBounds::object();
    match (wildcard.bound_kind, wildcard.bound) {
        (BoundKind::Extends, Some(bound)) => {
            let captured_bound = captured_wildcard_bound(interner, shape, bound);
            if interner.is_interface(bound) {
                bounds.super_interfaces.push(captured_bound);
            } else if !interner.is_array(captured_bound) && captured_bound != capture {
                bounds.superclass = captured_bound;
            }
            bounds.first_bound = Some(captured_bound);
        }
        (BoundKind::Super, bound) => bounds.lower_bound = bound,
        _ => {}
    }
    bounds
}

fn variable_bounds(
    interner: &TypeInterner,
    capture: TypeId,
    shape: &CaptureShape,
    wildcard: &WildcardShape,
    var: TypeVarId,
    captured_owner: TypeId,
) -> CaptureBounds {
    let formal = interner.type_var_bounds(var);

    // A substituted bound identical to the capture itself falls back to the
    // formal bound.
    let substituted = |original: TypeId| {
        let result = substitute(interner, captured_owner, original);
        if result == capture {
            debug!(capture = capture.0, "self-capture in bound, keeping formal bound");
            original
        } else {
            result
        }
    };
    let superclass = substituted(formal.superclass);
    let interfaces: TypeList = formal.interfaces.iter().map(|&i| substituted(i)).collect();

    let mut bounds = CaptureBounds::object();
    match (wildcard.bound_kind, wildcard.bound) {
        (BoundKind::Extends, Some(bound)) => {
            let captured_bound = captured_wildcard_bound(interner, shape, bound);
            if interner.is_interface(captured_bound) {
                bounds.superclass = superclass;
                bounds.super_interfaces = if interfaces.is_empty() {
                    TypeList::from_slice(&[captured_bound])
                } else {
                    let mut candidates = TypeList::from_slice(&[captured_bound]);
                    candidates.extend(interfaces.iter().copied());
                    greatest_lower_bound(interner, &candidates).unwrap_or(candidates)
                };
            } else {
                // The bound may be less specific than the variable's
                // superclass; keep the more specific one.
                bounds.superclass = if interner.is_array(captured_bound)
                    || captured_bound == capture
                    || is_superclass_of(interner, captured_bound, superclass)
                {
                    superclass
                } else {
                    captured_bound
                };
                bounds.super_interfaces = interfaces;
            }
            bounds.first_bound = Some(captured_bound);
        }
        (BoundKind::Super, bound) => {
            bounds.superclass = superclass;
            bounds.super_interfaces = interfaces;
            // Lower bounds are never substituted.
            bounds.lower_bound = bound;
            if Some(superclass) == formal.first_bound || Some(superclass) == bound {
                bounds.first_bound = Some(superclass);
            }
        }
        _ => {
            bounds.first_bound = if superclass != TypeId::OBJECT {
                Some(superclass)
            } else {
                interfaces.first().copied()
            };
            bounds.superclass = superclass;
            bounds.super_interfaces = interfaces;
        }
    }
    bounds
}

#[cfg(test)]
#[path = "tests/capture_tests.rs"]
mod tests;
