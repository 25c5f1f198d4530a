//! Common types and utilities for the jgx Java generics core.
//!
//! This crate provides the pieces shared by every jgx crate:
//! - Name interning (`Atom`, `ShardedInterner`)
//! - Compiler options (`CompilerOptions`, `JavaRelease`)
//! - Recursion limits and capacity constants

// Name interning for qualified names and type-parameter names
pub mod interner;
pub use interner::{Atom, ShardedInterner};

// Options that change capture conversion and the null overlay
pub mod options;
pub use options::{CompilerOptions, JavaRelease, OptionsError, RawCompilerOptions};

// Centralized limits and thresholds
pub mod limits;
