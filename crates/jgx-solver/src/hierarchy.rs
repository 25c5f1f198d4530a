//! Supertype lattice queries over the declaration table.
//!
//! These are the collaborator operations the bound algorithms consume:
//! supertypes of any reference type, the "originating from" supertype walk,
//! compatibility (subtyping with type-argument containment), greatest lower
//! bounds and erasure.
//!
//! Compatibility is coinductive: a pair `(a, b)` that is re-entered while it
//! is still being checked is assumed to hold. This is what makes checks on
//! F-bounded captures such as `capture-of ? <: X<capture-of ?>` terminate.

use crate::instantiate::substitute;
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use crate::wildcard;
use rustc_hash::FxHashSet;
use tracing::trace;

// =============================================================================
// Direct supertypes
// =============================================================================

/// The superclass of a reference type.
///
/// Interfaces and `Object` have none. Arrays, wildcards and type variables
/// without a class bound answer `Object`.
pub fn superclass(interner: &TypeInterner, ty: TypeId) -> Option<TypeId> {
    match interner.lookup(ty)? {
        TypeData::Class(class) => interner.class_supertypes(class).superclass,
        TypeData::Raw(class) => interner
            .class_supertypes(class)
            .superclass
            .map(|sup| raw_supertype(interner, sup)),
        TypeData::Parameterized(_) => {
            let class = interner.class_of(ty)?;
            let formal = interner.class_supertypes(class).superclass?;
            Some(substitute(interner, ty, formal))
        }
        TypeData::Array { .. } => Some(TypeId::OBJECT),
        TypeData::TypeVariable(var) => Some(interner.type_var_bounds(var).superclass),
        TypeData::Capture(_) => Some(interner.capture_bounds(ty).superclass),
        TypeData::Wildcard(_) => Some(wildcard::wildcard_superclass(interner, ty)),
        TypeData::Intersection(members) => Some(
            members
                .iter()
                .copied()
                .find(|&member| !interner.is_interface(member))
                .unwrap_or(TypeId::OBJECT),
        ),
        TypeData::Base(_)
        | TypeData::Null
        | TypeData::InferenceVariable(_)
        | TypeData::Problem(_) => None,
    }
}

/// The direct superinterfaces of a reference type.
pub fn super_interfaces(interner: &TypeInterner, ty: TypeId) -> TypeList {
    match interner.lookup(ty) {
        Some(TypeData::Class(class)) => interner.class_supertypes(class).interfaces,
        Some(TypeData::Raw(class)) => interner
            .class_supertypes(class)
            .interfaces
            .into_iter()
            .map(|sup| raw_supertype(interner, sup))
            .collect(),
        Some(TypeData::Parameterized(shape)) => interner
            .class_supertypes(shape.generic)
            .interfaces
            .into_iter()
            .map(|formal| substitute(interner, ty, formal))
            .collect(),
        Some(TypeData::Array { .. }) => {
            TypeList::from_slice(&[TypeId::CLONEABLE, TypeId::SERIALIZABLE])
        }
        Some(TypeData::TypeVariable(var)) => interner.type_var_bounds(var).interfaces,
        Some(TypeData::Capture(_)) => interner.capture_bounds(ty).super_interfaces,
        Some(TypeData::Wildcard(_)) => wildcard::wildcard_super_interfaces(interner, ty),
        Some(TypeData::Intersection(members)) => members
            .into_iter()
            .filter(|&member| interner.is_interface(member))
            .collect(),
        _ => TypeList::new(),
    }
}

/// Supertypes of a raw type are raw.
fn raw_supertype(interner: &TypeInterner, sup: TypeId) -> TypeId {
    match interner.lookup(sup) {
        Some(TypeData::Parameterized(shape)) => interner.raw(shape.generic),
        _ => sup,
    }
}

/// Walk the supertypes of `ty` for the one declared by `class`.
///
/// Returns `ty` itself when it is already a type of `class`. Type variables
/// and captures are searched through their bounds, intersections through
/// their members.
pub fn find_super_type_originating_from(
    interner: &TypeInterner,
    ty: TypeId,
    class: ClassId,
) -> Option<TypeId> {
    let mut visited = FxHashSet::default();
    find_originating(interner, ty, class, &mut visited)
}

fn find_originating(
    interner: &TypeInterner,
    ty: TypeId,
    class: ClassId,
    visited: &mut FxHashSet<TypeId>,
) -> Option<TypeId> {
    if !visited.insert(ty) {
        return None;
    }
    match interner.lookup(ty)? {
        TypeData::Class(c) | TypeData::Raw(c) if c == class => return Some(ty),
        TypeData::Parameterized(shape) if shape.generic == class => return Some(ty),
        TypeData::Array { .. } => {
            let found = match class {
                ClassId::OBJECT => TypeId::OBJECT,
                ClassId::CLONEABLE => TypeId::CLONEABLE,
                ClassId::SERIALIZABLE => TypeId::SERIALIZABLE,
                _ => return None,
            };
            return Some(found);
        }
        TypeData::Intersection(members) => {
            return members
                .iter()
                .find_map(|&member| find_originating(interner, member, class, visited));
        }
        TypeData::Base(_) | TypeData::Null | TypeData::Problem(_) => return None,
        _ => {}
    }

    if let Some(sup) = superclass(interner, ty)
        && let Some(found) = find_originating(interner, sup, class, visited)
    {
        return Some(found);
    }
    super_interfaces(interner, ty)
        .into_iter()
        .find_map(|sup| find_originating(interner, sup, class, visited))
}

/// True when `a` and `b` name the same type, ignoring annotations, or
/// when one of them is the raw or generic form of the other's class.
pub fn is_equivalent_to(interner: &TypeInterner, a: TypeId, b: TypeId) -> bool {
    let a = interner.unannotated(a);
    let b = interner.unannotated(b);
    if a == b {
        return true;
    }
    match (interner.lookup(a), interner.lookup(b)) {
        (Some(TypeData::Raw(x) | TypeData::Class(x)), Some(TypeData::Parameterized(shape)))
        | (Some(TypeData::Parameterized(shape)), Some(TypeData::Raw(x) | TypeData::Class(x))) => {
            x == shape.generic
        }
        (Some(TypeData::Raw(x)), Some(TypeData::Class(y)))
        | (Some(TypeData::Class(x)), Some(TypeData::Raw(y))) => x == y,
        _ => false,
    }
}

/// True when `sup` appears on the superclass chain of `ty`.
///
/// Interfaces are never superclasses. A `? super B` wildcard delegates to
/// its bound.
pub fn is_superclass_of(interner: &TypeInterner, sup: TypeId, ty: TypeId) -> bool {
    if interner.is_wildcard(sup) {
        return wildcard::is_superclass_of(interner, sup, ty);
    }
    if interner.is_interface(sup) {
        return false;
    }
    let mut seen = FxHashSet::default();
    let mut current = superclass(interner, ty);
    while let Some(candidate) = current {
        if !seen.insert(candidate) {
            return false;
        }
        if is_equivalent_to(interner, candidate, sup) {
            return true;
        }
        current = superclass(interner, candidate);
    }
    false
}

// =============================================================================
// Compatibility
// =============================================================================

/// Checks `a <: b` with type-argument containment.
pub struct CompatibilityChecker<'a> {
    interner: &'a TypeInterner,
    guard: RecursionGuard<(TypeId, TypeId)>,
}

impl<'a> CompatibilityChecker<'a> {
    pub fn new(interner: &'a TypeInterner) -> Self {
        CompatibilityChecker {
            interner,
            guard: RecursionGuard::with_profile(RecursionProfile::SubtypeCheck),
        }
    }

    /// Whether a value of type `a` can be used where `b` is expected.
    pub fn is_compatible_with(&mut self, a: TypeId, b: TypeId) -> bool {
        let a = self.interner.unannotated(a);
        let b = self.interner.unannotated(b);
        if a == b {
            return true;
        }

        let a_data = self.interner.lookup(a);
        let b_data = self.interner.lookup(b);
        match (&a_data, &b_data) {
            (None, _) | (_, None) => return false,
            (Some(TypeData::Problem(_)), _) | (_, Some(TypeData::Problem(_))) => return true,
            (Some(TypeData::Base(_)), _) | (_, Some(TypeData::Base(_))) => return false,
            (Some(TypeData::Null), _) => return self.interner.is_reference_type(b),
            (_, Some(TypeData::Null)) => return false,
            _ => {}
        }
        if b == TypeId::OBJECT && !matches!(a_data, Some(TypeData::Wildcard(_))) {
            return true;
        }

        match self.guard.enter((a, b)) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle => {
                trace!(a = a.0, b = b.0, "compatibility cycle, assuming true");
                return true;
            }
            _ => return false,
        }
        let result = self.check(a, a_data, b, b_data);
        self.guard.leave((a, b));
        result
    }

    fn check(
        &mut self,
        a: TypeId,
        a_data: Option<TypeData>,
        b: TypeId,
        b_data: Option<TypeData>,
    ) -> bool {
        match b_data {
            Some(TypeData::Intersection(members)) => {
                return members.iter().all(|&member| self.is_compatible_with(a, member));
            }
            Some(TypeData::Capture(_)) => {
                if let Some(lower) = self.interner.capture_bounds(b).lower_bound
                    && self.is_compatible_with(a, lower)
                {
                    return true;
                }
            }
            _ => {}
        }

        match a_data {
            Some(TypeData::TypeVariable(_) | TypeData::Capture(_)) => {
                let upper = superclass(self.interner, a)
                    .into_iter()
                    .chain(super_interfaces(self.interner, a));
                let upper: TypeList = upper.collect();
                upper.into_iter().any(|sup| self.is_compatible_with(sup, b))
            }
            Some(TypeData::Wildcard(shape)) => match shape.bound_kind {
                BoundKind::Extends => shape
                    .all_bound_types()
                    .into_iter()
                    .any(|bound| self.is_compatible_with(bound, b)),
                BoundKind::Unbound | BoundKind::Super => b == TypeId::OBJECT,
            },
            Some(TypeData::Intersection(members)) => members
                .iter()
                .any(|&member| self.is_compatible_with(member, b)),
            Some(TypeData::Array { leaf, dims }) => self.array_compatible(leaf, dims, b, b_data),
            Some(TypeData::Class(_) | TypeData::Raw(_) | TypeData::Parameterized(_)) => {
                self.class_compatible(a, b, b_data)
            }
            _ => false,
        }
    }

    fn array_compatible(
        &mut self,
        leaf: TypeId,
        dims: u8,
        b: TypeId,
        b_data: Option<TypeData>,
    ) -> bool {
        let Some(TypeData::Array {
            leaf: b_leaf,
            dims: b_dims,
        }) = b_data
        else {
            return matches!(
                b,
                TypeId::OBJECT | TypeId::CLONEABLE | TypeId::SERIALIZABLE
            );
        };
        let a_component = self.interner.array(leaf, dims - 1);
        let b_component = self.interner.array(b_leaf, b_dims - 1);
        if a_component.is_base_type() || b_component.is_base_type() {
            return a_component == b_component;
        }
        self.is_compatible_with(a_component, b_component)
    }

    fn class_compatible(&mut self, a: TypeId, b: TypeId, b_data: Option<TypeData>) -> bool {
        let Some(class) = self.interner.class_of(b) else {
            return false;
        };
        let Some(sup) = find_super_type_originating_from(self.interner, a, class) else {
            return false;
        };
        let Some(TypeData::Parameterized(formal)) = b_data else {
            return true;
        };
        match self.interner.lookup(sup) {
            Some(TypeData::Parameterized(actual)) => {
                actual.args.len() == formal.args.len()
                    && formal
                        .args
                        .iter()
                        .zip(actual.args.iter())
                        .all(|(&f, &a)| self.contains(f, a))
            }
            // unchecked conversion
            Some(TypeData::Raw(_) | TypeData::Class(_)) => true,
            _ => false,
        }
    }

    /// Type-argument containment: does the formal argument contain the
    /// actual one?
    pub fn contains(&mut self, formal: TypeId, actual: TypeId) -> bool {
        let Some(shape) = self.interner.wildcard_shape(formal) else {
            return self.interner.unannotated(formal) == self.interner.unannotated(actual);
        };
        let actual_wildcard = self.interner.wildcard_shape(actual);
        match shape.bound_kind {
            BoundKind::Unbound => true,
            BoundKind::Extends => {
                let bounds = shape.all_bound_types();
                match actual_wildcard {
                    Some(other) if other.bound_kind == BoundKind::Extends => {
                        let other_bounds = other.all_bound_types();
                        bounds.iter().all(|&bound| {
                            other_bounds
                                .iter()
                                .any(|&candidate| self.is_compatible_with(candidate, bound))
                        })
                    }
                    Some(_) => bounds.iter().all(|&bound| self.interner.is_object(bound)),
                    None => bounds
                        .iter()
                        .all(|&bound| self.is_compatible_with(actual, bound)),
                }
            }
            BoundKind::Super => {
                let Some(bound) = shape.bound else {
                    return true;
                };
                match actual_wildcard {
                    Some(other) => match (other.bound_kind, other.bound) {
                        (BoundKind::Super, Some(other_bound)) => {
                            self.is_compatible_with(bound, other_bound)
                        }
                        _ => false,
                    },
                    None => self.is_compatible_with(bound, actual),
                }
            }
        }
    }
}

/// Convenience wrapper around [`CompatibilityChecker`].
pub fn is_compatible_with(interner: &TypeInterner, a: TypeId, b: TypeId) -> bool {
    CompatibilityChecker::new(interner).is_compatible_with(a, b)
}

// =============================================================================
// Greatest lower bound
// =============================================================================

/// Merge a set of bounds into their greatest lower bound.
///
/// Duplicates and members that are supertypes of other members are
/// dropped. Returns `None` when the set has no lower bound: two unrelated
/// classes, or two parameterizations of the same generic type.
pub fn greatest_lower_bound(interner: &TypeInterner, types: &[TypeId]) -> Option<TypeList> {
    let mut unique = TypeList::new();
    for &ty in types {
        if !unique.contains(&ty) {
            unique.push(ty);
        }
    }
    if unique.len() <= 1 {
        return Some(unique);
    }

    let mut checker = CompatibilityChecker::new(interner);
    let mut removed = vec![false; unique.len()];
    for i in 0..unique.len() {
        for j in 0..unique.len() {
            if i == j || removed[j] || removed[i] {
                continue;
            }
            // unique[j] <: unique[i] makes unique[i] redundant; of two
            // mutually compatible members the earlier one stays.
            if checker.is_compatible_with(unique[j], unique[i])
                && (j < i || !checker.is_compatible_with(unique[i], unique[j]))
            {
                removed[i] = true;
            }
        }
    }
    let result: TypeList = unique
        .iter()
        .zip(removed)
        .filter_map(|(&ty, gone)| (!gone).then_some(ty))
        .collect();

    let classes = result
        .iter()
        .filter(|&&ty| !interner.is_interface(ty))
        .count();
    if classes > 1 {
        trace!(?result, "glb has more than one class");
        return None;
    }
    for (i, &x) in result.iter().enumerate() {
        for &y in &result[i + 1..] {
            if let (Some(cx), Some(cy)) = (interner.class_of(x), interner.class_of(y))
                && cx == cy
            {
                trace!(x = x.0, y = y.0, "glb has two parameterizations of one generic");
                return None;
            }
        }
    }
    Some(result)
}

// =============================================================================
// Erasure
// =============================================================================

pub fn erasure(interner: &TypeInterner, ty: TypeId) -> TypeId {
    let Some(data) = interner.lookup(ty) else {
        return ty;
    };
    match data {
        TypeData::Parameterized(shape) => interner.class_type(shape.generic),
        TypeData::Raw(class) => interner.class_type(class),
        TypeData::Class(_) => interner.unannotated(ty),
        TypeData::Array { leaf, dims } => interner.array(erasure(interner, leaf), dims),
        TypeData::TypeVariable(var) => {
            // `T extends U, U extends T` is illegal but must not loop.
            let mut seen = FxHashSet::default();
            let mut current = var;
            loop {
                if !seen.insert(current) {
                    return TypeId::OBJECT;
                }
                let bounds = interner.type_var_bounds(current);
                let next = bounds.first_bound.unwrap_or(bounds.superclass);
                match interner.lookup(next) {
                    Some(TypeData::TypeVariable(next_var)) => current = next_var,
                    _ => return erasure(interner, next),
                }
            }
        }
        TypeData::Capture(_) => match interner.capture_bounds(ty).first_bound {
            Some(first) if first != ty => erasure(interner, first),
            _ => TypeId::OBJECT,
        },
        TypeData::Wildcard(shape) => wildcard::wildcard_erasure(interner, &shape),
        TypeData::Intersection(members) => members
            .first()
            .map(|&first| erasure(interner, first))
            .unwrap_or(TypeId::OBJECT),
        TypeData::Base(_)
        | TypeData::Null
        | TypeData::InferenceVariable(_)
        | TypeData::Problem(_) => interner.unannotated(ty),
    }
}

#[cfg(test)]
#[path = "tests/hierarchy_tests.rs"]
mod tests;
