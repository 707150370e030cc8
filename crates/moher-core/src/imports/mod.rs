//! Import specifier discovery for JavaScript sources.
//!
//! Provides a span-producing scanner used by the rewrite stage.

mod scan;

pub use scan::{scan_import_spans, ImportSpan};
