//! Problems the generics core reports while it keeps going.
//!
//! The bound and substitution algorithms never fail: structural
//! inconsistencies degrade to `Object`-shaped answers and bound mismatches
//! become the [`TypeId::BOUND_MISMATCH`] sentinel. The one thing they do
//! report is a contradiction between null type annotations, which goes to
//! the [`ProblemReporter`] injected into the interner. Formatting and
//! positions belong to the caller.

use crate::types::TypeId;
use std::sync::Mutex;
use tracing::warn;

/// A detected problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Problem {
    /// A type carries both `@NonNull` and `@Nullable`, or a wildcard's own
    /// null annotation contradicts its bound (`@NonNull ? super @Nullable X`).
    ContradictoryNullAnnotations { ty: TypeId },
    /// A capture's null annotation contradicts one of its bounds.
    ContradictoryNullAnnotationsOnBounds { ty: TypeId, bound: TypeId },
}

impl Problem {
    /// The type the problem is about.
    pub fn subject(&self) -> TypeId {
        match self {
            Problem::ContradictoryNullAnnotations { ty }
            | Problem::ContradictoryNullAnnotationsOnBounds { ty, .. } => *ty,
        }
    }
}

/// Sink for problems detected by the core.
///
/// Implementations must tolerate being called from inside an analysis; the
/// core continues right after the call.
pub trait ProblemReporter: Send + Sync {
    fn report(&self, problem: Problem);
}

/// Default reporter: problems become `warn` events.
#[derive(Debug, Default)]
pub struct TracingReporter;

impl ProblemReporter for TracingReporter {
    fn report(&self, problem: Problem) {
        warn!(?problem, "generics problem");
    }
}

/// Reporter that keeps every problem, for tests and batch drivers.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    problems: Mutex<Vec<Problem>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the problems reported so far.
    pub fn problems(&self) -> Vec<Problem> {
        match self.problems.lock() {
            Ok(problems) => problems.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn take(&self) -> Vec<Problem> {
        match self.problems.lock() {
            Ok(mut problems) => std::mem::take(&mut *problems),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl ProblemReporter for CollectingReporter {
    fn report(&self, problem: Problem) {
        match self.problems.lock() {
            Ok(mut problems) => problems.push(problem),
            Err(poisoned) => poisoned.into_inner().push(problem),
        }
    }
}
