//! Upward and downward projection (JLS 4.10.5).
//!
//! Projection eliminates mentions of restricted variables, usually fresh
//! captures, from a type that is about to become user visible, for example
//! the inferred type of `var x = list.get(0)` with `list: List<?>`.
//!
//! Upward projection always has an answer. Downward projection may not:
//! `None` means no denotable lower bound exists and the caller must reject
//! the inference.

use crate::hierarchy::{greatest_lower_bound, is_compatible_with};
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use tracing::trace;

/// True when `ty` mentions one of `vars`.
///
/// Captures and type variables mention only themselves; their bounds are
/// not inspected.
pub fn mentions_any(interner: &TypeInterner, ty: TypeId, vars: &[TypeId]) -> bool {
    if vars.is_empty() {
        return false;
    }
    let base = interner.unannotated(ty);
    if vars.iter().any(|&var| interner.unannotated(var) == base) {
        return true;
    }
    match interner.lookup(base) {
        Some(TypeData::Parameterized(shape)) => {
            shape.args.iter().any(|&arg| mentions_any(interner, arg, vars))
                || shape
                    .enclosing
                    .is_some_and(|enclosing| mentions_any(interner, enclosing, vars))
        }
        Some(TypeData::Array { leaf, .. }) => mentions_any(interner, leaf, vars),
        Some(TypeData::Wildcard(shape)) => shape
            .all_bound_types()
            .into_iter()
            .any(|bound| mentions_any(interner, bound, vars)),
        Some(TypeData::Intersection(members)) => members
            .iter()
            .any(|&member| mentions_any(interner, member, vars)),
        _ => false,
    }
}

/// The denotable upper bound of a capture.
///
/// With superinterfaces this is the greatest lower bound of the superclass
/// and the interfaces: [`TypeId::BOUND_MISMATCH`] when none exists, the
/// single member when there is one, an intersection otherwise. `Object`
/// with exactly one interface is just that interface.
pub fn upper_bound_for_projection(interner: &TypeInterner, capture: TypeId) -> TypeId {
    let bounds = interner.capture_bounds(capture);
    if bounds.super_interfaces.is_empty() {
        return bounds.superclass;
    }
    if interner.is_object(bounds.superclass) && bounds.super_interfaces.len() == 1 {
        return bounds.super_interfaces[0];
    }
    let mut members = TypeList::from_slice(&[bounds.superclass]);
    members.extend(bounds.super_interfaces.iter().copied());
    match greatest_lower_bound(interner, &members) {
        None => {
            trace!(capture = capture.0, "capture bounds have no glb");
            TypeId::BOUND_MISMATCH
        }
        Some(glb) if glb.len() == 1 => glb[0],
        Some(glb) => interner.intersection(&glb),
    }
}

/// Projects types against a fixed set of restricted variables.
pub struct Projector<'a> {
    interner: &'a TypeInterner,
    mentioned: &'a [TypeId],
    guard: RecursionGuard<TypeId>,
}

impl<'a> Projector<'a> {
    pub fn new(interner: &'a TypeInterner, mentioned: &'a [TypeId]) -> Self {
        Projector {
            interner,
            mentioned,
            guard: RecursionGuard::with_profile(RecursionProfile::Projection),
        }
    }

    fn is_mentioned(&self, ty: TypeId) -> bool {
        let base = self.interner.unannotated(ty);
        self.mentioned
            .iter()
            .any(|&var| self.interner.unannotated(var) == base)
    }

    /// The least supertype of `ty` that mentions no restricted variable.
    pub fn upwards(&mut self, ty: TypeId) -> TypeId {
        if !mentions_any(self.interner, ty, self.mentioned) {
            return ty;
        }
        let Some(data) = self.interner.lookup(ty) else {
            return ty;
        };
        match data {
            TypeData::Capture(_) | TypeData::TypeVariable(_) | TypeData::InferenceVariable(_) => {
                self.upwards_variable(ty, &data)
            }
            TypeData::Parameterized(shape) => self.upwards_parameterized(&shape),
            TypeData::Array { leaf, dims } => {
                let leaf = self.upwards(leaf);
                self.interner.array(leaf, dims)
            }
            TypeData::Intersection(members) => {
                let members: TypeList = members.iter().map(|&m| self.upwards(m)).collect();
                self.interner.intersection(&members)
            }
            TypeData::Wildcard(shape) => match (shape.bound_kind, shape.bound) {
                (BoundKind::Super, Some(bound)) => match self.downwards(bound) {
                    Some(lower) => self.rebuild_wildcard(&shape, BoundKind::Super, lower),
                    None => self
                        .interner
                        .wildcard(WildcardShape::unbound(shape.generic, shape.rank)),
                },
                _ => {
                    let bounds: TypeList = shape
                        .all_bound_types()
                        .into_iter()
                        .map(|bound| self.upwards(bound))
                        .collect();
                    self.interner.wildcard(WildcardShape::new(
                        shape.generic,
                        shape.rank,
                        shape.bound_kind,
                        bounds.first().copied(),
                        bounds.get(1..).unwrap_or(&[]),
                    ))
                }
            },
            _ => ty,
        }
    }

    fn upwards_variable(&mut self, ty: TypeId, data: &TypeData) -> TypeId {
        if !self.is_mentioned(ty) {
            return ty;
        }
        let bound = match data {
            TypeData::Capture(_) => upper_bound_for_projection(self.interner, ty),
            TypeData::TypeVariable(var) => {
                let bounds = self.interner.type_var_bounds(*var);
                bounds.first_bound.unwrap_or(bounds.superclass)
            }
            _ => TypeId::OBJECT,
        };
        match self.guard.enter(ty) {
            RecursionResult::Entered => {
                let projected = self.upwards(bound);
                self.guard.leave(ty);
                projected
            }
            _ => {
                trace!(ty = ty.0, "re-entered upward projection");
                TypeId::OBJECT
            }
        }
    }

    fn upwards_parameterized(&mut self, shape: &ParameterizedShape) -> TypeId {
        let params = self.interner.type_params(shape.generic);
        let mut args = TypeList::with_capacity(shape.args.len());
        for (rank, &arg) in shape.args.iter().enumerate() {
            if !mentions_any(self.interner, arg, self.mentioned) {
                args.push(arg);
                continue;
            }
            let projected = match self.interner.wildcard_shape(arg) {
                Some(wildcard) => match (wildcard.bound_kind, wildcard.bound) {
                    (BoundKind::Super, Some(bound)) => match self.downwards(bound) {
                        Some(lower) => self.rebuild_wildcard(&wildcard, BoundKind::Super, lower),
                        None => self
                            .interner
                            .wildcard(WildcardShape::unbound(wildcard.generic, wildcard.rank)),
                    },
                    _ => {
                        let bounds: TypeList = wildcard
                            .all_bound_types()
                            .into_iter()
                            .map(|bound| self.upwards(bound))
                            .collect();
                        self.interner.wildcard(WildcardShape::new(
                            wildcard.generic,
                            wildcard.rank,
                            wildcard.bound_kind,
                            bounds.first().copied(),
                            bounds.get(1..).unwrap_or(&[]),
                        ))
                    }
                },
                None => self.upwards_argument(shape, params.get(rank).copied(), rank, arg),
            };
            args.push(projected);
        }
        let enclosing = shape.enclosing.map(|enclosing| self.upwards(enclosing));
        self.interner
            .parameterized_in(shape.generic, &args, enclosing)
    }

    /// A non-wildcard argument `a` becomes `? extends U`, `? super L` or `?`.
    fn upwards_argument(
        &mut self,
        shape: &ParameterizedShape,
        param: Option<TypeVarId>,
        rank: usize,
        arg: TypeId,
    ) -> TypeId {
        let generic = Some(shape.generic);
        let rank = rank as u32;
        let upper = self.upwards(arg);
        if !self.interner.is_object(upper) {
            let declared = param.map(|var| {
                let bounds = self.interner.type_var_bounds(var);
                bounds.first_bound.unwrap_or(bounds.superclass)
            });
            let type_params = self.interner.type_param_types(shape.generic);
            let use_upper = match declared {
                Some(bound) => {
                    mentions_any(self.interner, bound, &type_params)
                        || !is_compatible_with(self.interner, bound, upper)
                }
                None => true,
            };
            if use_upper {
                return self
                    .interner
                    .wildcard(WildcardShape::extends(generic, rank, upper));
            }
        }
        match self.downwards(arg) {
            Some(lower) => self
                .interner
                .wildcard(WildcardShape::super_(generic, rank, lower)),
            None => self.interner.wildcard(WildcardShape::unbound(generic, rank)),
        }
    }

    fn rebuild_wildcard(&self, shape: &WildcardShape, kind: BoundKind, bound: TypeId) -> TypeId {
        self.interner.wildcard(WildcardShape::new(
            shape.generic,
            shape.rank,
            kind,
            Some(bound),
            &[],
        ))
    }

    /// The greatest subtype of `ty` that mentions no restricted variable,
    /// if one is denotable.
    pub fn downwards(&mut self, ty: TypeId) -> Option<TypeId> {
        if !mentions_any(self.interner, ty, self.mentioned) {
            return Some(ty);
        }
        match self.interner.lookup(ty)? {
            TypeData::Capture(_) => {
                if !self.is_mentioned(ty) {
                    return Some(ty);
                }
                let lower = self.interner.capture_bounds(ty).lower_bound?;
                match self.guard.enter(ty) {
                    RecursionResult::Entered => {
                        let projected = self.downwards(lower);
                        self.guard.leave(ty);
                        projected
                    }
                    _ => {
                        trace!(ty = ty.0, "re-entered downward projection");
                        None
                    }
                }
            }
            TypeData::TypeVariable(_) | TypeData::InferenceVariable(_) => {
                if self.is_mentioned(ty) { None } else { Some(ty) }
            }
            TypeData::Parameterized(shape) => self.downwards_parameterized(&shape),
            TypeData::Array { leaf, dims } => {
                let leaf = self.downwards(leaf)?;
                Some(self.interner.array(leaf, dims))
            }
            TypeData::Intersection(members) => {
                let mut projected = TypeList::with_capacity(members.len());
                for member in members {
                    projected.push(self.downwards(member)?);
                }
                Some(self.interner.intersection(&projected))
            }
            _ => None,
        }
    }

    fn downwards_parameterized(&mut self, shape: &ParameterizedShape) -> Option<TypeId> {
        let mut args = TypeList::with_capacity(shape.args.len());
        for &arg in &shape.args {
            if !mentions_any(self.interner, arg, self.mentioned) {
                args.push(arg);
                continue;
            }
            let wildcard = self.interner.wildcard_shape(arg)?;
            let projected = match (wildcard.bound_kind, wildcard.bound) {
                (BoundKind::Extends, Some(bound)) => {
                    let lower = self.downwards(bound)?;
                    self.rebuild_wildcard(&wildcard, BoundKind::Extends, lower)
                }
                (BoundKind::Super, Some(bound)) => {
                    let upper = self.upwards(bound);
                    self.rebuild_wildcard(&wildcard, BoundKind::Super, upper)
                }
                _ => return None,
            };
            args.push(projected);
        }
        let enclosing = match shape.enclosing {
            Some(enclosing) => Some(self.downwards(enclosing)?),
            None => None,
        };
        Some(
            self.interner
                .parameterized_in(shape.generic, &args, enclosing),
        )
    }
}

/// Upward projection of `ty` with respect to `mentioned`.
pub fn upwards_projection(interner: &TypeInterner, ty: TypeId, mentioned: &[TypeId]) -> TypeId {
    Projector::new(interner, mentioned).upwards(ty)
}

/// Downward projection of `ty` with respect to `mentioned`.
pub fn downwards_projection(
    interner: &TypeInterner,
    ty: TypeId,
    mentioned: &[TypeId],
) -> Option<TypeId> {
    Projector::new(interner, mentioned).downwards(ty)
}

#[cfg(test)]
#[path = "tests/projection_tests.rs"]
mod tests;
