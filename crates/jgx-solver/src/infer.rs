//! Inference context for the constraint collector.
//!
//! Target variables (the type parameters of a generic method, or inference
//! variables) are slots in an `ena` union-find table. Constraints collected
//! against a target accumulate in its [`ConstraintSet`]; an `Equal`
//! constraint between two targets unifies their slots and merges their sets.

use crate::collect::SubstituteSink;
use crate::types::{ConstraintKind, TypeId};
use ena::unify::{InPlaceUnificationTable, NoError, UnifyKey, UnifyValue};
use indexmap::{IndexMap, IndexSet};
use tracing::trace;

/// A slot in the unification table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct InferenceSlot(pub u32);

/// Wrapper for TypeId to implement UnifyValue (avoiding orphan rule)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct InferenceValue(pub Option<TypeId>);

impl UnifyKey for InferenceSlot {
    type Value = InferenceValue;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        InferenceSlot(u)
    }

    fn tag() -> &'static str {
        "InferenceSlot"
    }
}

impl UnifyValue for InferenceValue {
    type Error = NoError;

    fn unify_values(a: &Self, b: &Self) -> Result<Self, Self::Error> {
        match (a.0, b.0) {
            (None, None) => Ok(InferenceValue(None)),
            (Some(t), None) | (None, Some(t)) => Ok(InferenceValue(Some(t))),
            // conflicting equalities stay visible in the constraint set
            (Some(a), Some(_)) => Ok(InferenceValue(Some(a))),
        }
    }
}

/// Constraints collected for one target, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    /// `T == A`
    pub equal: IndexSet<TypeId>,
    /// `T :> A`
    pub lower_bounds: IndexSet<TypeId>,
    /// `T <: A`
    pub upper_bounds: IndexSet<TypeId>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `T <constraint> actual`.
    pub fn add(&mut self, actual: TypeId, constraint: ConstraintKind) {
        match constraint {
            ConstraintKind::Equal => self.equal.insert(actual),
            ConstraintKind::Super => self.lower_bounds.insert(actual),
            ConstraintKind::Extends => self.upper_bounds.insert(actual),
        };
    }

    pub fn is_empty(&self) -> bool {
        self.equal.is_empty() && self.lower_bounds.is_empty() && self.upper_bounds.is_empty()
    }

    pub fn merge_from(&mut self, other: ConstraintSet) {
        self.equal.extend(other.equal);
        self.lower_bounds.extend(other.lower_bounds);
        self.upper_bounds.extend(other.upper_bounds);
    }
}

/// Caller-owned accumulator for one inference problem.
pub struct InferenceContext {
    table: InPlaceUnificationTable<InferenceSlot>,
    targets: IndexMap<TypeId, InferenceSlot>,
    constraints: Vec<ConstraintSet>,
    unchecked: bool,
    failed: bool,
}

impl Default for InferenceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl InferenceContext {
    pub fn new() -> Self {
        InferenceContext {
            table: InPlaceUnificationTable::new(),
            targets: IndexMap::new(),
            constraints: Vec::new(),
            unchecked: false,
            failed: false,
        }
    }

    /// A context whose targets are `vars`, in order.
    pub fn with_targets(vars: &[TypeId]) -> Self {
        let mut ctx = Self::new();
        for &var in vars {
            ctx.add_target(var);
        }
        ctx
    }

    /// Register `var` as a target; idempotent.
    pub fn add_target(&mut self, var: TypeId) -> InferenceSlot {
        if let Some(&slot) = self.targets.get(&var) {
            return slot;
        }
        let slot = self.table.new_key(InferenceValue(None));
        debug_assert_eq!(slot.0 as usize, self.constraints.len());
        self.constraints.push(ConstraintSet::new());
        self.targets.insert(var, slot);
        slot
    }

    pub fn targets(&self) -> impl Iterator<Item = TypeId> + '_ {
        self.targets.keys().copied()
    }

    /// Constraints of `var` and every target unified with it.
    pub fn constraints(&mut self, var: TypeId) -> ConstraintSet {
        let Some(&slot) = self.targets.get(&var) else {
            return ConstraintSet::new();
        };
        let root = self.table.find(slot);
        self.constraints[root.0 as usize].clone()
    }

    /// The type `var` was equated with, if any.
    pub fn resolved(&mut self, var: TypeId) -> Option<TypeId> {
        let slot = *self.targets.get(&var)?;
        self.table.probe_value(slot).0
    }

    /// Whether two targets were unified by an `Equal` constraint.
    pub fn unified(&mut self, a: TypeId, b: TypeId) -> bool {
        match (self.targets.get(&a).copied(), self.targets.get(&b).copied()) {
            (Some(a), Some(b)) => self.table.unioned(a, b),
            _ => false,
        }
    }

    /// A raw type was matched against a parameterization at top level.
    pub fn is_unchecked(&self) -> bool {
        self.unchecked
    }

    /// A raw type was matched against a nested parameterization.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    fn unify_targets(&mut self, a: InferenceSlot, b: InferenceSlot) {
        let root_a = self.table.find(a);
        let root_b = self.table.find(b);
        if root_a == root_b {
            return;
        }
        self.table.union(root_a, root_b);
        let new_root = self.table.find(root_a);

        let mut merged = ConstraintSet::new();
        merged.merge_from(std::mem::take(&mut self.constraints[root_a.0 as usize]));
        merged.merge_from(std::mem::take(&mut self.constraints[root_b.0 as usize]));
        self.constraints[new_root.0 as usize] = merged;
    }
}

impl SubstituteSink for InferenceContext {
    fn is_target(&self, var: TypeId) -> bool {
        self.targets.contains_key(&var)
    }

    fn record(&mut self, var: TypeId, actual: TypeId, constraint: ConstraintKind) {
        let Some(&slot) = self.targets.get(&var) else {
            return;
        };
        trace!(var = var.0, actual = actual.0, ?constraint, "recorded substitute");
        if constraint == ConstraintKind::Equal {
            if let Some(&other) = self.targets.get(&actual) {
                self.unify_targets(slot, other);
                return;
            }
            self.table.union_value(slot, InferenceValue(Some(actual)));
        }
        let root = self.table.find(slot);
        self.constraints[root.0 as usize].add(actual, constraint);
    }

    fn note_unchecked(&mut self) {
        self.unchecked = true;
    }

    fn note_failed(&mut self) {
        self.failed = true;
    }
}

#[cfg(test)]
#[path = "tests/infer_tests.rs"]
mod tests;
