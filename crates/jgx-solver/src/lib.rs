//! Java Generics Core
//!
//! The type-system layer a Java front end consults when it meets wildcards,
//! capture conversion and generic method inference:
//!
//! - **Interning**: every type is a [`TypeId`] in a canonicalizing
//!   [`TypeInterner`], so type identity is handle equality
//! - **Capture conversion**: fresh captures with bounds derived from the
//!   wildcard and the formal type variable
//! - **Projection**: upward and downward projection away from captures
//! - **Inference plumbing**: inference-variable substitution, the 1.7
//!   constraint collector and an `ena` backed constraint sink
//! - **Unique keys**: deterministic strings for every binding
//!
//! F-bounded declarations make the type graph cyclic. Every recursive
//! algorithm threads its own [`RecursionGuard`](recursion::RecursionGuard)
//! and treats a re-entered node coinductively.
pub mod capture;
pub mod collect;
mod diagnostics;
pub mod format;
pub mod hierarchy;
pub mod inference_substitution;
mod infer;
pub mod instantiate;
mod intern;
pub mod nullness;
pub mod projection;
pub mod recursion;
pub mod types;
pub mod unique_key;
pub mod wildcard;

pub use capture::{capture, initialize_bounds};
pub use collect::{SubstituteCollector, SubstituteSink, collect_substitutes};
pub use diagnostics::{CollectingReporter, Problem, ProblemReporter, TracingReporter};
pub use format::{debug_name, generic_signature, readable_name, short_readable_name, signature};
pub use hierarchy::{
    CompatibilityChecker, erasure, find_super_type_originating_from, greatest_lower_bound,
    is_compatible_with, is_equivalent_to, is_superclass_of, super_interfaces, superclass,
};
pub use inference_substitution::{InferenceSubstitution, substitute_inference_variable};
pub use infer::*;
pub use instantiate::{TypeInstantiator, TypeSubstitution, instantiate_type, substitute};
pub use intern::{TypeEntry, TypeInterner};
pub use projection::{
    Projector, downwards_projection, mentions_any, upper_bound_for_projection,
    upwards_projection,
};
pub use types::*;
pub use unique_key::compute_unique_key;

// Test modules: unit tests are loaded by their source files via
// #[path = "tests/..."] declarations.
#[cfg(test)]
#[path = "../tests/integration_tests.rs"]
mod integration_tests;
#[cfg(test)]
#[path = "../tests/concurrency_tests.rs"]
mod concurrency_tests;
#[cfg(test)]
#[path = "../tests/self_capture_tests.rs"]
mod self_capture_tests;
