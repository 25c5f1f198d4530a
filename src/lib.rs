//! jgx: the generics core of a Java front end.
//!
//! This crate is the facade over the workspace:
//!
//! - [`jgx_common`]: name interning, compiler options and limits
//! - [`jgx_solver`]: the type interner, capture conversion, projection,
//!   inference-variable substitution, the constraint collector and unique keys
//!
//! A front end typically loads its options once, builds one
//! [`TypeInterner`] per compilation and shares it across worker threads:
//!
//! ```no_run
//! use std::path::Path;
//!
//! jgx::tracing_config::init_tracing();
//! let interner = jgx::interner_from_options_file(Path::new("jgx.json"))?;
//! let list = interner.declare_class("java/util/List", jgx::ClassKind::Interface, &["E"]);
//! # let _ = list;
//! # Ok::<(), jgx_common::OptionsError>(())
//! ```

use jgx_common::{CompilerOptions, OptionsError};
use std::path::Path;
use std::sync::Arc;

pub use jgx_common;
pub use jgx_solver::*;

pub mod tracing_config;

/// A [`TypeInterner`] configured from an options file, reporting problems as
/// tracing events.
pub fn interner_from_options_file(path: &Path) -> Result<TypeInterner, OptionsError> {
    let options = CompilerOptions::load(path)?;
    tracing::debug!(release = options.release.0, path = %path.display(), "loaded compiler options");
    Ok(TypeInterner::with_options(options, Arc::new(TracingReporter)))
}
