//! Single-file-component support.
//!
//! A component source combines an optional `<script>` block and an
//! optional `<template>` block. One physical file is served as two
//! virtual modules: the wired logic module (default request) and the
//! compiled-template module (`?type=template`).

mod parse;
pub mod split;
pub mod template;

pub use parse::{parse_sfc, SfcBlock, SfcDescriptor};
