//! Type-variable substitution.
//!
//! `substitute(owner, ty)` replaces the type parameters of `owner`'s generic
//! declaration (and of its enclosing parameterizations) with `owner`'s
//! arguments. A raw owner substitutes erasures. Captures are leaves: their
//! bounds were already computed against a concrete owner.

use crate::hierarchy::erasure;
use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use jgx_common::limits::MAX_SUBSTITUTION_DEPTH;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Mapping from type parameters to their replacements.
#[derive(Clone, Debug, Default)]
pub struct TypeSubstitution {
    map: FxHashMap<TypeVarId, TypeId>,
}

impl TypeSubstitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// The substitution induced by a parameterized, raw or plain class type.
    pub fn from_owner(interner: &TypeInterner, owner: TypeId) -> Self {
        let mut subst = Self::new();
        subst.add_owner(interner, owner, 0);
        subst
    }

    fn add_owner(&mut self, interner: &TypeInterner, owner: TypeId, depth: u32) {
        if depth > MAX_SUBSTITUTION_DEPTH {
            return;
        }
        match interner.lookup(owner) {
            Some(TypeData::Parameterized(shape)) => {
                let params = interner.type_params(shape.generic);
                if params.len() == shape.args.len() {
                    for (&var, &arg) in params.iter().zip(shape.args.iter()) {
                        self.map.insert(var, arg);
                    }
                } else {
                    debug!(
                        generic = shape.generic.0,
                        expected = params.len(),
                        actual = shape.args.len(),
                        "argument count mismatch, leaving variables unsubstituted"
                    );
                }
                if let Some(enclosing) = shape.enclosing {
                    self.add_owner(interner, enclosing, depth + 1);
                }
            }
            Some(TypeData::Raw(class)) => {
                let mut current = Some(class);
                while let Some(class) = current {
                    for var in interner.type_params(class) {
                        let erased = erasure(interner, interner.type_param(var));
                        self.map.insert(var, erased);
                    }
                    current = interner.class_decl(class).and_then(|decl| decl.enclosing);
                }
            }
            _ => {}
        }
    }

    pub fn insert(&mut self, var: TypeVarId, replacement: TypeId) {
        self.map.insert(var, replacement);
    }

    pub fn get(&self, var: TypeVarId) -> Option<TypeId> {
        self.map.get(&var).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }
}

/// Rewrites a type under a [`TypeSubstitution`].
pub struct TypeInstantiator<'a> {
    interner: &'a TypeInterner,
    substitution: &'a TypeSubstitution,
    guard: RecursionGuard<TypeId>,
}

impl<'a> TypeInstantiator<'a> {
    pub fn new(interner: &'a TypeInterner, substitution: &'a TypeSubstitution) -> Self {
        TypeInstantiator {
            interner,
            substitution,
            guard: RecursionGuard::with_profile(RecursionProfile::Substitution),
        }
    }

    pub fn instantiate(&mut self, ty: TypeId) -> TypeId {
        if self.substitution.is_empty()
            || !self.interner.flags(ty).contains(TagBits::HAS_TYPE_VARIABLE)
        {
            return ty;
        }
        match self.guard.enter(ty) {
            RecursionResult::Entered => {
                let result = self.instantiate_inner(ty);
                self.guard.leave(ty);
                result
            }
            // captures are leaves, so only a malformed graph gets here
            RecursionResult::Cycle => ty,
            denied => {
                debug!(ty = ty.0, depth = self.guard.depth(), ?denied, "substitution limit reached");
                ty
            }
        }
    }

    fn instantiate_list(&mut self, types: &[TypeId]) -> (TypeList, bool) {
        let mut changed = false;
        let list = types
            .iter()
            .map(|&ty| {
                let new = self.instantiate(ty);
                changed |= new != ty;
                new
            })
            .collect();
        (list, changed)
    }

    fn instantiate_inner(&mut self, ty: TypeId) -> TypeId {
        let entry = self.interner.entry(ty);
        let rebuilt = match &entry.data {
            TypeData::TypeVariable(var) => {
                let Some(replacement) = self.substitution.get(*var) else {
                    return ty;
                };
                return self.carry_annotations(&entry.annotations, replacement);
            }
            TypeData::Parameterized(shape) => {
                let (args, mut changed) = self.instantiate_list(&shape.args);
                let enclosing = shape.enclosing.map(|enclosing| {
                    let new = self.instantiate(enclosing);
                    changed |= new != enclosing;
                    new
                });
                if !changed {
                    return ty;
                }
                self.interner.parameterized_in(shape.generic, &args, enclosing)
            }
            TypeData::Array { leaf, dims } => {
                let new_leaf = self.instantiate(*leaf);
                if new_leaf == *leaf {
                    return ty;
                }
                self.interner.array(new_leaf, *dims)
            }
            TypeData::Wildcard(shape) => {
                let bound = shape.bound.map(|bound| self.instantiate(bound));
                let others = shape
                    .other_bounds
                    .as_ref()
                    .map(|others| self.instantiate_list(others));
                let others_changed = others.as_ref().is_some_and(|(_, changed)| *changed);
                if bound == shape.bound && !others_changed {
                    return ty;
                }
                let others = others.map(|(list, _)| list).unwrap_or_default();
                self.interner.wildcard(WildcardShape::new(
                    shape.generic,
                    shape.rank,
                    shape.bound_kind,
                    bound,
                    &others,
                ))
            }
            TypeData::Intersection(members) => {
                let (members, changed) = self.instantiate_list(members);
                if !changed {
                    return ty;
                }
                self.interner.intersection(&members)
            }
            _ => return ty,
        };
        if entry.annotations.is_empty() {
            rebuilt
        } else {
            self.interner
                .with_annotations(rebuilt, entry.annotations.clone())
        }
    }

    /// Annotations on a type-variable use carry over to a replacement that
    /// has no null annotation of its own.
    fn carry_annotations(&self, annotations: &TypeAnnotations, replacement: TypeId) -> TypeId {
        let mut merged = self.interner.annotations(replacement);
        if annotations.is_empty() || merged.iter().any(|a| a.null_tag().is_some()) {
            return replacement;
        }
        for &annotation in annotations {
            if !merged.contains(&annotation) {
                merged.push(annotation);
            }
        }
        self.interner.with_annotations(replacement, merged)
    }
}

/// Instantiate `ty` under an explicit substitution.
pub fn instantiate_type(
    interner: &TypeInterner,
    ty: TypeId,
    substitution: &TypeSubstitution,
) -> TypeId {
    TypeInstantiator::new(interner, substitution).instantiate(ty)
}

/// Substitute the type parameters of `owner`'s declaration in `ty`.
pub fn substitute(interner: &TypeInterner, owner: TypeId, ty: TypeId) -> TypeId {
    let substitution = TypeSubstitution::from_owner(interner, owner);
    instantiate_type(interner, ty, &substitution)
}

#[cfg(test)]
#[path = "tests/instantiate_tests.rs"]
mod tests;
