//! `text-remove-gap` CSS transform (with WASM bindings in a sibling crate).
//!
//! This crate rewrites a custom `text-remove-gap` declaration into margins (or `::before` /
//! `::after` rules) that cancel the vertical space line-height and font metrics add around a
//! text block.
//!
//! Entry points:
//!
//! - [`transform`] contains the configuration and the public transform APIs.
//!
//! Internals:
//!
//! - [`alloc`] contains the tree-sitter allocator override for WASM targets.
//! - [`sheet`] parses CSS with tree-sitter and snapshots rules/declarations.
//! - [`directive`] parses the `text-remove-gap` value grammar.
//! - [`font`] resolves ambient `font`/`font-family`/`line-height` declarations.
//! - [`metrics`] holds the font metrics table and line-height resolution.
//! - [`offset`] turns metrics into CSS length expressions.
//! - [`selector`] appends pseudo-elements to selector lists.
//! - [`emit`] turns a resolved directive into source edits.
//! - [`edit`] holds the edit model and sourcemap creation/rewriting helpers.
//! - [`utf16`] provides UTF-16 column indexing support for sourcemaps.

use std::fmt;

pub mod alloc;
pub mod directive;
pub mod edit;
pub mod emit;
pub mod font;
pub mod metrics;
pub mod offset;
pub mod selector;
pub mod sheet;
pub mod transform;
pub mod utf16;

pub use metrics::SpaceValues;
pub use transform::{
    CodeAndSourcemap, GapConfig, TextRemoveGap, coerce_line_height, remove_text_gap,
    remove_text_gap_no_sourcemap,
};

/// 1-based line/column of a node in the input CSS.
///
/// Columns count Unicode scalar values, the way editors report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors that can occur during the transform.
#[derive(thiserror::Error, Debug)]
pub enum GapError {
    #[error("tree-sitter failed to parse input")]
    ParseFailed,

    #[error("{position}: incorrect `{property}` value: {value:?}")]
    MalformedDirective {
        property: String,
        value: String,
        position: SourcePosition,
    },

    #[error("{position}: unknown mode: {mode}")]
    UnknownScope {
        mode: String,
        position: SourcePosition,
    },

    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    #[error("overlapping edits: [{a_start},{a_end}) overlaps [{b_start},{b_end})")]
    OverlappingEdits {
        a_start: usize,
        a_end: usize,
        b_start: usize,
        b_end: usize,
    },

    #[error("invalid sourcemap: {0}")]
    SourceMap(#[from] sourcemap::Error),

    #[error("invalid font metrics table: {0}")]
    FontTable(#[from] serde_json::Error),
}
