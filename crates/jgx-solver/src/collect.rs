//! Constraint collection for Java 7 style inference (JLS 15.12.7).
//!
//! `collect_substitutes(formal, actual, constraint)` walks a formal type and
//! an actual argument type in parallel and reports every constraint it
//! discovers on a target variable to a [`SubstituteSink`]:
//!
//! - `Equal`: `A == F`
//! - `Extends`: `A << F`, the actual converts to the formal
//! - `Super`: `A >> F`
//!
//! Nothing is returned; the sink owns all state.

use crate::intern::TypeInterner;
use crate::types::*;
use tracing::trace;

/// Receives the constraints discovered by the collector.
pub trait SubstituteSink {
    /// Is `var` (a type parameter or inference variable) being inferred?
    fn is_target(&self, var: TypeId) -> bool;

    /// Record `var <constraint> actual`, where `Super` reads `var :> actual`.
    fn record(&mut self, var: TypeId, actual: TypeId, constraint: ConstraintKind);

    /// A raw actual type was matched against a parameterized formal.
    fn note_unchecked(&mut self) {}

    /// A raw type was met below the top level, so inference cannot succeed.
    fn note_failed(&mut self) {}
}

/// How the actual type participates in the wildcard case matrix.
enum ActualShape {
    Wildcard { kind: BoundKind, bound: Option<TypeId> },
    /// `? extends V1 & ... & Vn`, or a plain intersection type.
    Intersection(TypeList),
    Other(TypeId),
}

pub struct SubstituteCollector<'a, S: SubstituteSink + ?Sized> {
    interner: &'a TypeInterner,
    sink: &'a mut S,
    /// Parameterized nesting depth.
    depth: u32,
}

impl<'a, S: SubstituteSink + ?Sized> SubstituteCollector<'a, S> {
    pub fn new(interner: &'a TypeInterner, sink: &'a mut S) -> Self {
        SubstituteCollector {
            interner,
            sink,
            depth: 0,
        }
    }

    pub fn collect(&mut self, formal: TypeId, actual: TypeId, constraint: ConstraintKind) {
        let flags = self.interner.flags(formal);
        if !flags.intersects(TagBits::HAS_TYPE_VARIABLE | TagBits::HAS_INFERENCE_VARIABLE) {
            return;
        }
        if actual == TypeId::NULL {
            return;
        }
        let Some(data) = self.interner.lookup(formal) else {
            return;
        };
        match data {
            TypeData::TypeVariable(_) | TypeData::InferenceVariable(_) => {
                self.collect_variable(formal, actual, constraint)
            }
            TypeData::Wildcard(shape) => self.collect_wildcard(&shape, actual, constraint),
            TypeData::Parameterized(_) => self.collect_parameterized(formal, actual, constraint),
            TypeData::Array { leaf, dims } => self.collect_array(leaf, dims, actual, constraint),
            _ => {}
        }
    }

    // =========================================================================
    // Variables
    // =========================================================================

    fn collect_variable(&mut self, var: TypeId, actual: TypeId, constraint: ConstraintKind) {
        let var = self.interner.unannotated(var);
        if !self.sink.is_target(var) {
            return;
        }
        let actual = match self.interner.lookup(actual) {
            Some(TypeData::Base(kind)) => match self.boxed(kind) {
                Some(boxed) => boxed,
                None => return,
            },
            // wildcards are not type expressions
            Some(TypeData::Wildcard(_)) => return,
            Some(_) => actual,
            None => return,
        };
        // A << T reads T :> A.
        self.sink.record(var, actual, constraint.flipped());
    }

    fn boxed(&self, kind: BaseKind) -> Option<TypeId> {
        let wrapper = match kind {
            BaseKind::Void => return None,
            BaseKind::Boolean => "java/lang/Boolean",
            BaseKind::Byte => "java/lang/Byte",
            BaseKind::Char => "java/lang/Character",
            BaseKind::Short => "java/lang/Short",
            BaseKind::Int => "java/lang/Integer",
            BaseKind::Long => "java/lang/Long",
            BaseKind::Float => "java/lang/Float",
            BaseKind::Double => "java/lang/Double",
        };
        let class = self.interner.find_class(wrapper)?;
        Some(self.interner.class_type(class))
    }

    // =========================================================================
    // Wildcards
    // =========================================================================

    fn classify(&self, actual: TypeId) -> ActualShape {
        // 1.7 inference sees a capture as the wildcard it captured.
        let actual = match self.interner.capture_shape(actual) {
            Some(capture) => capture.wildcard,
            None => actual,
        };
        match self.interner.lookup(actual) {
            Some(TypeData::Wildcard(shape)) if shape.is_intersection() => {
                ActualShape::Intersection(shape.all_bound_types())
            }
            Some(TypeData::Wildcard(shape)) => ActualShape::Wildcard {
                kind: shape.bound_kind,
                bound: shape.bound,
            },
            Some(TypeData::Intersection(members)) => ActualShape::Intersection(members),
            _ => ActualShape::Other(actual),
        }
    }

    fn collect_wildcard(
        &mut self,
        formal: &WildcardShape,
        actual: TypeId,
        constraint: ConstraintKind,
    ) {
        use BoundKind::{Extends, Super, Unbound};
        use ConstraintKind as C;

        let Some(bound) = formal.bound else {
            return;
        };
        let shape = self.classify(actual);
        trace!(formal_kind = ?formal.bound_kind, ?constraint, "collecting against wildcard");

        match (constraint, formal.bound_kind, shape) {
            // `?` constrains nothing.
            (_, Unbound, _) => {}

            // A << ? extends U
            (C::Extends, Extends, ActualShape::Wildcard { kind: Extends, bound: Some(v) }) => {
                self.collect(bound, v, C::Extends)
            }
            (C::Extends, Extends, ActualShape::Wildcard { .. }) => {}
            (C::Extends, Extends, ActualShape::Intersection(members)) => {
                self.collect_all(bound, &members, C::Extends)
            }
            (C::Extends, Extends, ActualShape::Other(v)) => self.collect(bound, v, C::Extends),

            // A << ? super U
            (C::Extends, Super, ActualShape::Wildcard { kind: Super, bound: Some(v) }) => {
                self.collect(bound, v, C::Super)
            }
            (C::Extends, Super, ActualShape::Wildcard { .. }) => {}
            (C::Extends, Super, ActualShape::Intersection(_)) => {}
            (C::Extends, Super, ActualShape::Other(v)) => self.collect(bound, v, C::Super),

            // A == ? extends U
            (C::Equal, Extends, ActualShape::Wildcard { kind: Extends, bound: Some(v) }) => {
                self.collect(bound, v, C::Equal)
            }
            (C::Equal, Extends, ActualShape::Wildcard { .. }) => {}
            (C::Equal, Extends, ActualShape::Intersection(members)) => {
                self.collect_all(bound, &members, C::Equal)
            }
            (C::Equal, Extends, ActualShape::Other(_)) => {}

            // A == ? super U
            (C::Equal, Super, ActualShape::Wildcard { kind: Super, bound: Some(v) }) => {
                self.collect(bound, v, C::Equal)
            }
            (C::Equal, Super, ActualShape::Wildcard { .. }) => {}
            (C::Equal, Super, ActualShape::Intersection(_)) => {}
            (C::Equal, Super, ActualShape::Other(_)) => {}

            // A >> ? extends U
            (C::Super, Extends, ActualShape::Wildcard { kind: Extends, bound: Some(v) }) => {
                self.collect(bound, v, C::Super)
            }
            (C::Super, Extends, ActualShape::Wildcard { .. }) => {}
            (C::Super, Extends, ActualShape::Intersection(members)) => {
                self.collect_all(bound, &members, C::Super)
            }
            (C::Super, Extends, ActualShape::Other(_)) => {}

            // A >> ? super U
            (C::Super, Super, ActualShape::Wildcard { kind: Super, bound: Some(v) }) => {
                self.collect(bound, v, C::Super)
            }
            (C::Super, Super, ActualShape::Wildcard { .. }) => {}
            (C::Super, Super, ActualShape::Intersection(_)) => {}
            (C::Super, Super, ActualShape::Other(_)) => {}
        }
    }

    fn collect_all(&mut self, formal: TypeId, actuals: &[TypeId], constraint: ConstraintKind) {
        for &actual in actuals {
            self.collect(formal, actual, constraint);
        }
    }

    // =========================================================================
    // Parameterized types and arrays
    // =========================================================================

    fn collect_parameterized(&mut self, formal: TypeId, actual: TypeId, constraint: ConstraintKind) {
        use crate::hierarchy::find_super_type_originating_from;

        if !self.interner.is_reference_type(actual) {
            return;
        }
        let (formal_equivalent, actual_equivalent) = match constraint {
            ConstraintKind::Equal | ConstraintKind::Extends => {
                let Some(class) = self.interner.class_of(formal) else {
                    return;
                };
                let Some(sup) = find_super_type_originating_from(self.interner, actual, class) else {
                    return;
                };
                (formal, sup)
            }
            ConstraintKind::Super => {
                let Some(class) = self.interner.class_of(actual) else {
                    return;
                };
                let Some(sup) = find_super_type_originating_from(self.interner, formal, class) else {
                    return;
                };
                (sup, actual)
            }
        };

        let formal_shape = self.interner.parameterized_shape(formal_equivalent);
        let actual_shape = self.interner.parameterized_shape(actual_equivalent);

        if let (Some(formal_enclosing), Some(actual_enclosing)) = (
            formal_shape.as_ref().and_then(|shape| shape.enclosing),
            actual_shape.as_ref().and_then(|shape| shape.enclosing),
        ) {
            self.collect(formal_enclosing, actual_enclosing, constraint);
        }

        let formal_args = match (self.interner.lookup(formal_equivalent), formal_shape) {
            (_, Some(shape)) => shape.args,
            (Some(TypeData::Class(class)), None) => self.interner.type_param_types(class),
            (Some(TypeData::Raw(_)), None) => {
                if self.depth > 0 {
                    self.sink.note_failed();
                }
                return;
            }
            _ => return,
        };
        let actual_args = match (self.interner.lookup(actual_equivalent), actual_shape) {
            (_, Some(shape)) => shape.args,
            (Some(TypeData::Class(class)), None) => self.interner.type_param_types(class),
            (Some(TypeData::Raw(_)), None) => {
                if self.depth > 0 {
                    self.sink.note_failed();
                } else {
                    self.sink.note_unchecked();
                }
                return;
            }
            _ => return,
        };

        self.depth += 1;
        for (&formal_arg, &actual_arg) in formal_args.iter().zip(actual_args.iter()) {
            if self.interner.is_wildcard(formal_arg) {
                self.collect(formal_arg, actual_arg, constraint);
                continue;
            }
            if let Some(wildcard) = self.interner.wildcard_shape(actual_arg)
                && !wildcard.is_intersection()
            {
                // JLS 15.12.7: only `>>` sees through a wildcard actual.
                if constraint == ConstraintKind::Super {
                    match (wildcard.bound_kind, wildcard.bound) {
                        (BoundKind::Extends, Some(bound)) => {
                            self.collect(formal_arg, bound, ConstraintKind::Super)
                        }
                        (BoundKind::Super, Some(bound)) => {
                            self.collect(formal_arg, bound, ConstraintKind::Extends)
                        }
                        _ => {}
                    }
                }
                continue;
            }
            self.collect(formal_arg, actual_arg, ConstraintKind::Equal);
        }
        self.depth -= 1;
    }

    fn collect_array(&mut self, leaf: TypeId, dims: u8, actual: TypeId, constraint: ConstraintKind) {
        let Some(TypeData::Array {
            leaf: actual_leaf,
            dims: actual_dims,
        }) = self.interner.lookup(actual)
        else {
            return;
        };
        if actual_dims == dims {
            // `int[]` is no `T[]`
            if actual_leaf.is_base_type() {
                return;
            }
            self.collect(leaf, actual_leaf, constraint);
        } else if actual_dims > dims {
            let reduced = self.interner.array(actual_leaf, actual_dims - dims);
            self.collect(leaf, reduced, constraint);
        }
    }
}

/// Collect the constraints `actual <constraint> formal` imposes on the
/// sink's targets.
pub fn collect_substitutes<S: SubstituteSink + ?Sized>(
    interner: &TypeInterner,
    formal: TypeId,
    actual: TypeId,
    constraint: ConstraintKind,
    sink: &mut S,
) {
    SubstituteCollector::new(interner, sink).collect(formal, actual, constraint);
}

#[cfg(test)]
#[path = "tests/collect_tests.rs"]
mod tests;
