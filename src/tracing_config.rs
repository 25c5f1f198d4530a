//! Tracing configuration for embedding front ends and debugging sessions.
//!
//! Three output formats are selected by `JGX_LOG_FORMAT`:
//!
//! - `text` (default): flat `tracing-subscriber` lines
//! - `tree`: hierarchical indented output via `tracing-tree`
//! - `json`: one JSON object per span or event
//!
//! ## Quick start
//!
//! ```bash
//! # Follow capture conversion and projection as a tree
//! JGX_LOG="jgx_solver::capture=trace,jgx_solver::projection=debug" JGX_LOG_FORMAT=tree my-frontend
//!
//! # Everything the solver logs, as JSON
//! JGX_LOG=jgx_solver=trace JGX_LOG_FORMAT=json my-frontend
//! ```
//!
//! Nothing is installed unless `JGX_LOG` (or `RUST_LOG`) is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Flat text lines (default).
    Text,
    /// Hierarchical indented tree via `tracing-tree`.
    Tree,
    /// Newline-delimited JSON objects.
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to [`LogFormat::Text`].
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "tree" => Self::Tree,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }

    fn from_env() -> Self {
        Self::parse(&std::env::var("JGX_LOG_FORMAT").unwrap_or_default())
    }
}

/// `JGX_LOG` takes precedence over `RUST_LOG`; both use `RUST_LOG` syntax.
fn build_filter() -> EnvFilter {
    if let Ok(val) = std::env::var("JGX_LOG") {
        EnvFilter::builder().parse_lossy(val)
    } else {
        EnvFilter::from_default_env()
    }
}

/// Initialise the global tracing subscriber.
///
/// Does nothing when neither `JGX_LOG` nor `RUST_LOG` is set. Output goes to
/// stderr. Calling this twice, or after the host installed its own
/// subscriber, leaves the existing subscriber in place.
pub fn init_tracing() {
    let has_jgx_log = std::env::var("JGX_LOG").is_ok();
    let has_rust_log = std::env::var("RUST_LOG").is_ok();
    if !has_jgx_log && !has_rust_log {
        return;
    }

    let filter = build_filter();
    let installed = match LogFormat::from_env() {
        LogFormat::Tree => {
            let tree_layer = tracing_tree::HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_indent_lines(true)
                .with_deferred_spans(true)
                .with_span_retrace(true)
                .with_targets(true);

            Registry::default()
                .with(filter)
                .with(tree_layer)
                .try_init()
                .is_ok()
        }
        LogFormat::Json => {
            let json_layer = fmt::layer().json().with_writer(std::io::stderr);

            Registry::default()
                .with(filter)
                .with(json_layer)
                .try_init()
                .is_ok()
        }
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };
    if !installed {
        tracing::debug!("global tracing subscriber already installed");
    }
}
