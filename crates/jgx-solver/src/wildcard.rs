//! Wildcard queries.
//!
//! A wildcard is interned per `(generic, rank, bound_kind, bound,
//! other_bounds, annotations)`. Its supertypes are derived from the bound
//! and from the formal type variable at `(generic, rank)`, computed once and
//! cached on the interned slot.

use crate::hierarchy::{self, CompatibilityChecker};
use crate::intern::TypeInterner;
use crate::types::*;
use tracing::debug;

/// The formal type variable a wildcard stands in for.
///
/// `None` for wildcards synthesized outside a parameterization and for
/// ranks the generic type does not declare.
pub fn type_variable(interner: &TypeInterner, shape: &WildcardShape) -> Option<TypeVarId> {
    let generic = shape.generic?;
    interner.type_params(generic).get(shape.rank as usize).copied()
}

/// The primary bound; an unbound wildcard resolves to its formal variable.
pub fn bound_or_variable(interner: &TypeInterner, shape: &WildcardShape) -> Option<TypeId> {
    match shape.bound_kind {
        BoundKind::Unbound => type_variable(interner, shape).map(|var| interner.type_param(var)),
        _ => shape.bound,
    }
}

/// Creates `?` for position `rank` of `generic`.
pub fn unbound(interner: &TypeInterner, generic: ClassId, rank: u32) -> TypeId {
    interner.wildcard(WildcardShape::unbound(Some(generic), rank))
}

/// Creates `? extends bound` for position `rank` of `generic`.
pub fn extends(interner: &TypeInterner, generic: ClassId, rank: u32, bound: TypeId) -> TypeId {
    interner.wildcard(WildcardShape::extends(Some(generic), rank, bound))
}

/// Creates `? super bound` for position `rank` of `generic`.
pub fn super_(interner: &TypeInterner, generic: ClassId, rank: u32, bound: TypeId) -> TypeId {
    interner.wildcard(WildcardShape::super_(Some(generic), rank, bound))
}

/// Does `actual` satisfy the wildcard's bounds?
///
/// `?` accepts anything. `? extends B & C` needs `actual` compatible with
/// every bound. `? super B` needs the lower bound `B` to be usable where
/// `actual` is required.
pub fn bound_check(interner: &TypeInterner, wildcard: TypeId, actual: TypeId) -> bool {
    let Some(shape) = interner.wildcard_shape(wildcard) else {
        return false;
    };
    let mut checker = CompatibilityChecker::new(interner);
    match shape.bound_kind {
        BoundKind::Unbound => true,
        BoundKind::Extends => shape
            .all_bound_types()
            .into_iter()
            .all(|bound| checker.is_compatible_with(actual, bound)),
        BoundKind::Super => match shape.bound {
            Some(bound) => checker.is_compatible_with(bound, actual),
            None => true,
        },
    }
}

/// The superclass of a wildcard: a class `extends` bound, else the class
/// first bound of its formal variable, else `Object`.
pub fn wildcard_superclass(interner: &TypeInterner, wildcard: TypeId) -> TypeId {
    wildcard_supers(interner, wildcard).0
}

/// The superinterfaces of a wildcard: those of its formal variable, with an
/// interface `extends` bound first and any other bounds appended.
pub fn wildcard_super_interfaces(interner: &TypeInterner, wildcard: TypeId) -> TypeList {
    wildcard_supers(interner, wildcard).1
}

fn wildcard_supers(interner: &TypeInterner, wildcard: TypeId) -> (TypeId, TypeList) {
    let Some(shape) = interner.wildcard_shape(wildcard) else {
        return (TypeId::OBJECT, TypeList::new());
    };
    interner.wildcard_supers_with(wildcard, || {
        let variable = type_variable(interner, &shape);
        let candidate = match (shape.bound_kind, shape.bound) {
            (BoundKind::Extends, Some(bound)) if !interner.is_interface(bound) => Some(bound),
            _ => variable.and_then(|var| interner.type_var_bounds(var).first_bound),
        };
        let superclass = candidate
            .filter(|&ty| {
                interner.is_reference_type(ty) && !interner.is_interface(ty) && !interner.is_array(ty)
            })
            .unwrap_or(TypeId::OBJECT);
        let mut interfaces: TypeList = variable
            .map(|var| interner.type_var_bounds(var).interfaces)
            .unwrap_or_default();
        if shape.bound_kind == BoundKind::Extends {
            if let Some(bound) = shape.bound
                && interner.is_interface(bound)
            {
                interfaces.insert(0, bound);
            }
            // other bounds are interfaces by construction
            if let Some(others) = &shape.other_bounds {
                interfaces.extend(others.iter().copied());
            }
        }
        (superclass, interfaces)
    })
}

/// For `? super B`: whether `B` is a superclass of `other`.
pub fn is_superclass_of(interner: &TypeInterner, wildcard: TypeId, other: TypeId) -> bool {
    let Some(shape) = interner.wildcard_shape(wildcard) else {
        return false;
    };
    match (shape.bound_kind, shape.bound) {
        (BoundKind::Super, Some(bound)) if interner.is_reference_type(bound) => {
            hierarchy::is_superclass_of(interner, bound, other)
        }
        (BoundKind::Super, _) => interner.is_object(other),
        _ => false,
    }
}

/// The erasure of a wildcard.
pub fn wildcard_erasure(interner: &TypeInterner, shape: &WildcardShape) -> TypeId {
    if let Some(others) = &shape.other_bounds {
        // `? extends Object & I` erases to `I`.
        let erased = match shape.bound {
            Some(bound) if !interner.is_object(bound) => bound,
            _ => others.first().copied().unwrap_or(TypeId::OBJECT),
        };
        return hierarchy::erasure(interner, erased);
    }
    match (shape.bound_kind, shape.bound) {
        (BoundKind::Extends, Some(bound)) => hierarchy::erasure(interner, bound),
        _ => match type_variable(interner, shape) {
            Some(var) => hierarchy::erasure(interner, interner.type_param(var)),
            None => shape
                .generic
                .map(|generic| interner.class_type(generic))
                .unwrap_or(TypeId::OBJECT),
        },
    }
}

/// The intersection of a wildcard's bound and other bounds.
///
/// Falls back to the bound alone when a member is not a reference type.
pub fn all_bounds(interner: &TypeInterner, wildcard: TypeId) -> Option<TypeId> {
    let shape = interner.wildcard_shape(wildcard)?;
    let Some(others) = &shape.other_bounds else {
        return shape.bound;
    };
    let members = shape.all_bound_types();
    if members.iter().any(|&member| !interner.is_reference_type(member)) {
        debug!(wildcard = wildcard.0, "non-reference bound in intersection wildcard");
        return shape.bound;
    }
    debug_assert!(!others.is_empty());
    Some(interner.intersection(&members))
}

/// `[bound, other_bounds...]` for an intersection wildcard, else `None`.
pub fn intersecting_types(interner: &TypeInterner, wildcard: TypeId) -> Option<TypeList> {
    let shape = interner.wildcard_shape(wildcard)?;
    shape.is_intersection().then(|| shape.all_bound_types())
}

/// True when `ty` mentions no inference variable.
pub fn is_proper_type(interner: &TypeInterner, ty: TypeId) -> bool {
    !interner
        .flags(ty)
        .contains(TagBits::HAS_INFERENCE_VARIABLE)
}

/// Replace every capture in `ty` by the wildcard it captured.
pub fn uncapture(interner: &TypeInterner, ty: TypeId) -> TypeId {
    let entry = interner.entry(ty);
    if !entry.flags.contains(TagBits::HAS_CAPTURED_WILDCARD) {
        return ty;
    }
    let rebuilt = match &entry.data {
        TypeData::Capture(shape) => shape.wildcard,
        TypeData::Wildcard(shape) => {
            let bound = shape.bound.map(|bound| uncapture(interner, bound));
            let others: TypeList = shape
                .other_bounds
                .iter()
                .flatten()
                .map(|&other| uncapture(interner, other))
                .collect();
            interner.wildcard(WildcardShape::new(
                shape.generic,
                shape.rank,
                shape.bound_kind,
                bound,
                &others,
            ))
        }
        TypeData::Parameterized(shape) => {
            let args: TypeList = shape
                .args
                .iter()
                .map(|&arg| uncapture(interner, arg))
                .collect();
            let enclosing = shape.enclosing.map(|enclosing| uncapture(interner, enclosing));
            interner.parameterized_in(shape.generic, &args, enclosing)
        }
        TypeData::Array { leaf, dims } => interner.array(uncapture(interner, *leaf), *dims),
        TypeData::Intersection(members) => {
            let members: TypeList = members
                .iter()
                .map(|&member| uncapture(interner, member))
                .collect();
            interner.intersection(&members)
        }
        _ => return ty,
    };
    if entry.annotations.is_empty() {
        rebuilt
    } else {
        interner.with_annotations(rebuilt, entry.annotations.clone())
    }
}

/// `ty` without its own null annotation; nested annotations stay.
pub fn without_toplevel_null_annotation(interner: &TypeInterner, ty: TypeId) -> TypeId {
    let has_null = interner
        .annotations(ty)
        .iter()
        .any(|annotation| annotation.null_tag().is_some());
    if !has_null {
        return ty;
    }
    interner.with_null_tag(ty, None)
}

#[cfg(test)]
#[path = "tests/wildcard_tests.rs"]
mod tests;
