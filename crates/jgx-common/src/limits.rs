//! Centralized limits for the generics core.
//!
//! The bound and projection algorithms break cycles exactly through their
//! visiting sets, so these limits are safety valves for pathological
//! inputs (synthetic nesting thousands of levels deep), not part of the
//! typing rules. Solver guards read them through
//! `jgx_solver::recursion::RecursionProfile`.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum nesting for subtype and containment checks.
///
/// Compatibility checks walk supertypes and type arguments; an F-bounded
/// type such as `X<T extends X<T>>` revisits the same pair, which the
/// visiting set answers coinductively long before this depth.
pub const MAX_SUBTYPE_DEPTH: u32 = 100;

/// Maximum nesting for upward and downward projection.
pub const MAX_PROJECTION_DEPTH: u32 = 100;

/// Maximum nesting for type-variable substitution and inference-variable
/// substitution through wildcard and capture graphs.
pub const MAX_SUBSTITUTION_DEPTH: u32 = 200;

/// Maximum nesting for name, signature and unique-key rendering.
pub const MAX_RENDER_DEPTH: u32 = 64;

// =============================================================================
// Operation Counts
// =============================================================================

/// Total enter attempts a single guard accepts before giving up.
pub const MAX_GUARD_ITERATIONS: u32 = 100_000;

// =============================================================================
// Capacity Limits
// =============================================================================

/// Inline capacity for type argument and bound lists.
pub const TYPE_LIST_INLINE: usize = 4;
