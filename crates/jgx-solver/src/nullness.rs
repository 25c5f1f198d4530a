//! Null type annotation overlay.
//!
//! Only active when `CompilerOptions::null_type_annotations` is set. Own
//! annotations and wildcard bounds are folded into tag bits at interning
//! time; captures resolve their nullness against their bounds when capture
//! conversion initializes them.

use crate::diagnostics::Problem;
use crate::intern::TypeInterner;
use crate::types::*;
use tracing::trace;

/// Effective null tag of a type, including the resolved nullness of
/// initialized captures.
pub fn null_tag_of(interner: &TypeInterner, ty: TypeId) -> Option<NullTag> {
    let own = interner.flags(ty).null_tag();
    if own.is_some() {
        return own;
    }
    if interner.is_capture(ty) {
        return interner.capture_bounds(ty).null_tag;
    }
    None
}

/// True when `ty` itself carries a null annotation.
pub fn has_toplevel_null_annotation(interner: &TypeInterner, ty: TypeId) -> bool {
    interner
        .annotations(ty)
        .iter()
        .any(|annotation| annotation.null_tag().is_some())
}

/// Resolve the nullness of a capture from its wildcard and bounds.
///
/// The capture's own tag comes from its annotations, else from the
/// wildcard. Without one, a `@NonNull` first bound or superinterface makes
/// the capture non-null. An own tag that differs from a bound's tag is
/// reported and dropped.
pub fn capture_null_tag(
    interner: &TypeInterner,
    capture: TypeId,
    wildcard: TypeId,
    bounds: &CaptureBounds,
) -> Option<NullTag> {
    let mut tag = interner
        .flags(capture)
        .null_tag()
        .or_else(|| interner.flags(wildcard).null_tag());
    let candidates = bounds
        .first_bound
        .into_iter()
        .chain(bounds.super_interfaces.iter().copied());
    for bound in candidates {
        if bound == capture {
            continue;
        }
        let Some(bound_tag) = null_tag_of(interner, bound) else {
            continue;
        };
        match tag {
            None if bound_tag == NullTag::NonNull => tag = Some(NullTag::NonNull),
            None => {}
            Some(own) if own != bound_tag => {
                trace!(capture = capture.0, bound = bound.0, "contradictory capture nullness");
                interner.report(Problem::ContradictoryNullAnnotationsOnBounds {
                    ty: capture,
                    bound,
                });
                return None;
            }
            Some(_) => {}
        }
    }
    tag
}

#[cfg(test)]
#[path = "tests/nullness_tests.rs"]
mod tests;
