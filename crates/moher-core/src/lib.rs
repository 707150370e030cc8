#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod error;
pub mod imports;
pub mod resolve;
pub mod rewrite;
pub mod sfc;
pub mod splice;

pub use error::Error;
pub use imports::{scan_import_spans, ImportSpan};
pub use resolve::ModuleMap;
pub use rewrite::{is_bare, rewrite_imports, MODULE_PREFIX};
pub use sfc::{parse_sfc, SfcBlock, SfcDescriptor};
pub use splice::Splicer;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
