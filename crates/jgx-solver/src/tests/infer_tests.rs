use super::*;

const T: TypeId = TypeId(100);
const U: TypeId = TypeId(101);
const V: TypeId = TypeId(102);

#[test]
fn test_constraint_set_add_and_merge() {
    let mut set = ConstraintSet::new();
    assert!(set.is_empty());
    set.add(TypeId::STRING, ConstraintKind::Equal);
    set.add(TypeId::INTEGER, ConstraintKind::Super);
    set.add(TypeId::NUMBER, ConstraintKind::Extends);
    set.add(TypeId::INTEGER, ConstraintKind::Super);
    assert_eq!(set.equal.len(), 1);
    assert_eq!(set.lower_bounds.iter().copied().collect::<Vec<_>>(), vec![TypeId::INTEGER]);
    assert_eq!(set.upper_bounds.iter().copied().collect::<Vec<_>>(), vec![TypeId::NUMBER]);

    let mut other = ConstraintSet::new();
    other.add(TypeId::OBJECT, ConstraintKind::Extends);
    other.add(TypeId::NUMBER, ConstraintKind::Extends);
    set.merge_from(other);
    assert_eq!(
        set.upper_bounds.iter().copied().collect::<Vec<_>>(),
        vec![TypeId::NUMBER, TypeId::OBJECT]
    );
}

#[test]
fn test_targets_are_registered_once() {
    let mut ctx = InferenceContext::with_targets(&[T, U]);
    let slot = ctx.add_target(T);
    assert_eq!(slot, InferenceSlot(0));
    assert_eq!(ctx.add_target(V), InferenceSlot(2));
    assert_eq!(ctx.targets().collect::<Vec<_>>(), vec![T, U, V]);
    assert!(ctx.is_target(U));
    assert!(!ctx.is_target(TypeId::STRING));
}

#[test]
fn test_records_constraints_per_target() {
    let mut ctx = InferenceContext::with_targets(&[T, U]);
    ctx.record(T, TypeId::INTEGER, ConstraintKind::Super);
    ctx.record(T, TypeId::NUMBER, ConstraintKind::Extends);
    ctx.record(U, TypeId::STRING, ConstraintKind::Equal);
    // Not a target.
    ctx.record(V, TypeId::STRING, ConstraintKind::Equal);

    let t = ctx.constraints(T);
    assert!(t.lower_bounds.contains(&TypeId::INTEGER));
    assert!(t.upper_bounds.contains(&TypeId::NUMBER));
    assert!(t.equal.is_empty());
    assert_eq!(ctx.resolved(T), None);
    assert_eq!(ctx.resolved(U), Some(TypeId::STRING));
    assert!(ctx.constraints(V).is_empty());
    assert_eq!(ctx.resolved(V), None);
}

#[test]
fn test_equal_targets_are_unified() {
    let mut ctx = InferenceContext::with_targets(&[T, U, V]);
    ctx.record(T, TypeId::INTEGER, ConstraintKind::Super);
    ctx.record(U, TypeId::NUMBER, ConstraintKind::Extends);
    assert!(!ctx.unified(T, U));

    ctx.record(T, U, ConstraintKind::Equal);
    assert!(ctx.unified(T, U));
    assert!(!ctx.unified(T, V));
    let merged = ctx.constraints(U);
    assert_eq!(merged, ctx.constraints(T));
    assert!(merged.lower_bounds.contains(&TypeId::INTEGER));
    assert!(merged.upper_bounds.contains(&TypeId::NUMBER));
    // Unification itself is not an equality constraint.
    assert!(merged.equal.is_empty());

    ctx.record(U, TypeId::INTEGER, ConstraintKind::Equal);
    assert_eq!(ctx.resolved(T), Some(TypeId::INTEGER));
    assert!(ctx.constraints(T).equal.contains(&TypeId::INTEGER));
}

#[test]
fn test_first_equality_wins_resolution() {
    let mut ctx = InferenceContext::with_targets(&[T]);
    ctx.record(T, TypeId::STRING, ConstraintKind::Equal);
    ctx.record(T, TypeId::INTEGER, ConstraintKind::Equal);
    assert_eq!(ctx.resolved(T), Some(TypeId::STRING));
    assert_eq!(ctx.constraints(T).equal.len(), 2);
}

#[test]
fn test_unchecked_and_failed_flags() {
    let mut ctx = InferenceContext::new();
    assert!(!ctx.is_unchecked());
    assert!(!ctx.has_failed());
    ctx.note_unchecked();
    assert!(ctx.is_unchecked());
    assert!(!ctx.has_failed());
    ctx.note_failed();
    assert!(ctx.has_failed());
}
