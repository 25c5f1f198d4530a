//! Substitution of a resolved inference variable through wildcard and
//! capture graphs.
//!
//! Unchanged parts keep their identity: the result is `ty` itself when the
//! variable is not mentioned. A changed capture is cloned and the clone's
//! bounds are rewritten; since those bounds may mention the capture again,
//! an in-flight map (`pending`) hands the clone to re-entrant visits.

use crate::intern::TypeInterner;
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

pub struct InferenceSubstitution<'a> {
    interner: &'a TypeInterner,
    var: TypeId,
    replacement: TypeId,
    /// Captures being substituted, with their clone once it exists.
    pending: FxHashMap<TypeId, Option<TypeId>>,
    guard: RecursionGuard<TypeId>,
}

impl<'a> InferenceSubstitution<'a> {
    pub fn new(interner: &'a TypeInterner, var: TypeId, replacement: TypeId) -> Self {
        InferenceSubstitution {
            interner,
            var: interner.unannotated(var),
            replacement,
            pending: FxHashMap::default(),
            guard: RecursionGuard::with_profile(RecursionProfile::Substitution),
        }
    }

    pub fn substitute(&mut self, ty: TypeId) -> TypeId {
        if !self
            .interner
            .flags(ty)
            .contains(TagBits::HAS_INFERENCE_VARIABLE)
        {
            return ty;
        }
        match self.guard.enter(ty) {
            RecursionResult::Entered => {
                let result = self.substitute_inner(ty);
                self.guard.leave(ty);
                result
            }
            // Capture bounds lead back to the types mentioning the capture;
            // the pending map ends those walks.
            RecursionResult::Cycle => self.substitute_inner(ty),
            denied => {
                debug!(
                    ty = ty.0,
                    depth = self.guard.depth(),
                    ?denied,
                    "inference substitution limit reached"
                );
                ty
            }
        }
    }

    fn substitute_inner(&mut self, ty: TypeId) -> TypeId {
        let entry = self.interner.entry(ty);
        let rebuilt = match &entry.data {
            TypeData::InferenceVariable(_) => {
                if entry.unannotated != self.var {
                    return ty;
                }
                return self.replace_variable(&entry.annotations);
            }
            TypeData::Wildcard(shape) => return self.substitute_wildcard(ty, shape, &entry.annotations),
            TypeData::Capture(_) => return self.substitute_capture(ty),
            TypeData::Parameterized(shape) => {
                let args = self.substitute_list(&shape.args);
                let enclosing = shape.enclosing.map(|enclosing| self.substitute(enclosing));
                if args.is_none() && enclosing == shape.enclosing {
                    return ty;
                }
                let args = args.unwrap_or_else(|| shape.args.clone());
                self.interner.parameterized_in(shape.generic, &args, enclosing)
            }
            TypeData::Array { leaf, dims } => {
                let new_leaf = self.substitute(*leaf);
                if new_leaf == *leaf {
                    return ty;
                }
                self.interner.array(new_leaf, *dims)
            }
            TypeData::Intersection(members) => {
                let Some(members) = self.substitute_list(members) else {
                    return ty;
                };
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

    /// Substitute every member; `None` when nothing changed. The new list is
    /// only allocated once a first member changes.
    fn substitute_list(&mut self, types: &[TypeId]) -> Option<TypeList> {
        let mut changed: Option<TypeList> = None;
        for (i, &ty) in types.iter().enumerate() {
            let new = self.substitute(ty);
            match &mut changed {
                Some(list) => list.push(new),
                None if new != ty => {
                    let mut list = TypeList::with_capacity(types.len());
                    list.extend_from_slice(&types[..i]);
                    list.push(new);
                    changed = Some(list);
                }
                None => {}
            }
        }
        changed
    }

    fn replace_variable(&self, annotations: &TypeAnnotations) -> TypeId {
        let tag = annotations.iter().find_map(|annotation| annotation.null_tag());
        let replacement_has_null = self
            .interner
            .annotations(self.replacement)
            .iter()
            .any(|annotation| annotation.null_tag().is_some());
        match tag {
            Some(tag) if !replacement_has_null => self.interner.with_null_tag(self.replacement, Some(tag)),
            _ => self.replacement,
        }
    }

    fn substitute_wildcard(
        &mut self,
        ty: TypeId,
        shape: &WildcardShape,
        annotations: &TypeAnnotations,
    ) -> TypeId {
        let bound = shape.bound.map(|bound| self.substitute(bound));
        let others = shape
            .other_bounds
            .as_ref()
            .and_then(|others| self.substitute_list(others));
        if bound == shape.bound && others.is_none() {
            return ty;
        }
        let others = match others {
            Some(list) => list,
            None => shape.other_bounds.clone().unwrap_or_default(),
        };
        let new_shape = WildcardShape::new(shape.generic, shape.rank, shape.bound_kind, bound, &others);
        trace!(wildcard = ty.0, "substituted inference variable in wildcard");
        let rebuilt = if annotations.is_empty() {
            self.interner.wildcard(new_shape)
        } else {
            self.interner
                .wildcard_annotated(new_shape, annotations.clone())
        };
        // Nullness the old wildcard derived from its bound survives unless
        // the new wildcard has nullness of its own.
        match self.interner.flags(ty).null_tag() {
            Some(tag) if self.interner.flags(rebuilt).null_tag().is_none() => {
                self.interner.with_null_tag(rebuilt, Some(tag))
            }
            _ => rebuilt,
        }
    }

    fn substitute_capture(&mut self, capture: TypeId) -> TypeId {
        if let Some(state) = self.pending.get(&capture) {
            trace!(capture = capture.0, "re-entered capture substitution");
            return state.unwrap_or(capture);
        }
        self.pending.insert(capture, None);
        let result = self.substitute_capture_bounds(capture);
        self.pending.remove(&capture);
        result
    }

    fn substitute_capture_bounds(&mut self, capture: TypeId) -> TypeId {
        let Some(shape) = self.interner.capture_shape(capture) else {
            return capture;
        };
        let wildcard = self.substitute(shape.wildcard);
        if wildcard == shape.wildcard {
            return capture;
        }

        let clone = self.interner.clone_capture(capture, wildcard);
        let annotations = self.interner.annotations(capture);
        let clone = if annotations.is_empty() {
            clone
        } else {
            self.interner.with_annotations(clone, annotations)
        };
        self.pending.insert(capture, Some(clone));

        if self.interner.has_capture_bounds(capture) {
            let bounds = self.interner.capture_bounds(capture);
            let lower_bound = bounds.lower_bound.map(|lower| self.substitute(lower));
            let first_bound = bounds.first_bound.map(|first| self.substitute(first));
            let superclass = self.substitute(bounds.superclass);
            let super_interfaces = self
                .substitute_list(&bounds.super_interfaces)
                .unwrap_or(bounds.super_interfaces);
            let substituted = CaptureBounds {
                superclass,
                super_interfaces,
                first_bound,
                lower_bound,
                null_tag: bounds.null_tag,
            };
            if !self.interner.set_capture_bounds(clone, substituted) {
                trace!(clone = clone.0, "capture clone already initialized");
            }
        }
        debug!(capture = capture.0, clone = clone.0, "cloned capture for inference substitution");
        clone
    }
}

/// Replace inference variable `var` by `replacement` throughout `ty`.
pub fn substitute_inference_variable(
    interner: &TypeInterner,
    ty: TypeId,
    var: TypeId,
    replacement: TypeId,
) -> TypeId {
    InferenceSubstitution::new(interner, var, replacement).substitute(ty)
}

#[cfg(test)]
#[path = "tests/inference_substitution_tests.rs"]
mod tests;
