//! Visiting-set guard for the self-referential parts of the type graph.
//!
//! F-bounded generics produce types that mention themselves: capturing
//! `X<?>` for `class X<T extends X<T>>` yields a capture whose superclass is
//! `X<capture>`. Projection, compatibility checks, substitution and signature
//! rendering all walk such graphs, and each of them threads a `RecursionGuard`
//! through its recursion instead of flipping a flag on a shared, interned
//! type. A re-entrant visit of the same key reports [`RecursionResult::Cycle`]
//! and the caller substitutes its documented fallback answer.
//!
//! The guard also carries depth and iteration budgets taken from a
//! [`RecursionProfile`]. Cycles are caught exactly by the visiting set, so
//! the budgets only matter for pathological synthetic nesting.
//!
//! In debug builds, dropping a guard with active entries panics, which
//! catches a forgotten `leave()`.

use jgx_common::limits;
use rustc_hash::FxHashSet;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named limit presets, one per recursive algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Compatibility and containment checks.
    SubtypeCheck,
    /// Upward and downward projection.
    Projection,
    /// Type-variable and inference-variable substitution.
    Substitution,
    /// Names, signatures and unique keys.
    Render,
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::SubtypeCheck => limits::MAX_SUBTYPE_DEPTH,
            Self::Projection => limits::MAX_PROJECTION_DEPTH,
            Self::Substitution => limits::MAX_SUBSTITUTION_DEPTH,
            Self::Render => limits::MAX_RENDER_DEPTH,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        limits::MAX_GUARD_ITERATIONS
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a guarded computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    Entered,
    /// The key is already being visited.
    Cycle,
    DepthExceeded,
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks the keys currently being visited by one recursive computation.
///
/// ```ignore
/// let mut guard = RecursionGuard::with_profile(RecursionProfile::Projection);
/// match guard.enter(capture) {
///     RecursionResult::Entered => {
///         let projected = project_bound(capture, &mut guard);
///         guard.leave(capture);
///         projected
///     }
///     _ => TypeId::OBJECT,
/// }
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashSet<K>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashSet::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter the computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller must call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if self.iterations > self.max_iterations {
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            return RecursionResult::DepthExceeded;
        }
        if !self.visiting.insert(key) {
            return RecursionResult::Cycle;
        }

        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave the computation for `key`. Exactly once per successful `enter`.
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key);

        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not being visited"
        );

        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still being visited",
                self.visiting.len(),
            );
        }
    }
}
