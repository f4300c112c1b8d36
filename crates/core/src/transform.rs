//! Public transform APIs.
//!
//! A [`TextRemoveGap`] is built once from a [`GapConfig`] and then applied to any number of
//! style sheets. Each run:
//!
//! 1. parses the sheet and snapshots every style rule ([`crate::sheet`]),
//! 2. for every declaration named `text-remove-gap` (or `-<prefix>-text-remove-gap`), parses
//!    the value, resolves font metrics and line-height, and computes the margin expressions,
//! 3. turns each directive into byte-range edits against the original source,
//! 4. validates and applies all edits in one pass, optionally producing a sourcemap.
//!
//! The first malformed directive aborts the run with a positioned [`GapError`]; nothing is
//! returned for that sheet.

use std::{cmp::Reverse, collections::BTreeMap};

use crate::{
    GapError,
    directive::parse_directive,
    edit::{Edit, apply_edits, create_sourcemap, rewrite_sourcemap, validate_edits},
    emit::emit,
    font::ambient_font,
    metrics::{FontTable, SpaceValues, resolve_metrics},
    offset::compute_offsets,
    sheet::{collect_rules, parse},
};

/// Property name recognized when no prefix is configured.
pub const PROPERTY: &str = "text-remove-gap";

/// Configuration options for the transform.
#[derive(Debug, Clone, PartialEq)]
pub struct GapConfig {
    /// Vendor-style prefix; `Some("x")` makes the property `-x-text-remove-gap`.
    ///
    /// An empty prefix is the same as no prefix.
    pub prefix: Option<String>,
    /// Extra font metrics, merged over the bundled table (these win).
    pub fonts: BTreeMap<String, SpaceValues>,
    /// Family tried after every family the rule or directive names.
    pub default_font_family: String,
    /// Line-height used when neither the directive nor the rule sets one.
    pub default_line_height: f64,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            prefix: None,
            fonts: BTreeMap::new(),
            default_font_family: "serif".to_string(),
            default_line_height: 1.0,
        }
    }
}

impl GapConfig {
    /// Set the default line-height; zero and non-finite values become `1`.
    pub fn with_default_line_height(mut self, line_height: f64) -> Self {
        self.default_line_height = sanitize_line_height(line_height);
        self
    }

    /// The declaration property this configuration recognizes.
    pub fn property_name(&self) -> String {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("-{prefix}-{PROPERTY}"),
            _ => PROPERTY.to_string(),
        }
    }
}

/// Parse a default line-height given as text.
///
/// Anything that isn't a finite, non-zero number becomes `1`.
pub fn coerce_line_height(raw: &str) -> f64 {
    sanitize_line_height(raw.trim().parse().unwrap_or(0.0))
}

fn sanitize_line_height(value: f64) -> f64 {
    if value.is_finite() && value != 0.0 {
        value
    } else {
        1.0
    }
}

/// Output code and its corresponding sourcemap JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAndSourcemap {
    /// The rewritten CSS.
    pub code: String,
    /// The generated/re-written sourcemap JSON.
    pub sourcemap: String,
}

/// A configured transform. Immutable once built, so one instance can serve many threads.
#[derive(Debug, Clone)]
pub struct TextRemoveGap {
    property: String,
    table: FontTable,
    default_font_family: String,
    default_line_height: f64,
}

impl TextRemoveGap {
    /// Merge the bundled metrics with `config.fonts` and freeze the configuration.
    pub fn new(config: &GapConfig) -> Result<Self, GapError> {
        let table = FontTable::bundled()?.with_overrides(&config.fonts);
        log::debug!(
            "font table ready: {} families ({} overrides)",
            table.len(),
            config.fonts.len()
        );
        Ok(Self {
            property: config.property_name(),
            table,
            default_font_family: config.default_font_family.clone(),
            default_line_height: sanitize_line_height(config.default_line_height),
        })
    }

    /// The declaration property this transform rewrites.
    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn font_table(&self) -> &FontTable {
        &self.table
    }

    /// Rewrite `source` and create a brand-new sourcemap pointing back at it.
    pub fn transform(
        &self,
        source: &str,
        source_filename: &str,
    ) -> Result<CodeAndSourcemap, GapError> {
        let (code, edits) = self.rewrite(source)?;
        let sourcemap = create_sourcemap(source, &code, source_filename, &edits)?;
        Ok(CodeAndSourcemap { code, sourcemap })
    }

    /// Rewrite `source` without producing a sourcemap.
    pub fn transform_no_sourcemap(&self, source: &str) -> Result<String, GapError> {
        let (code, _) = self.rewrite(source)?;
        Ok(code)
    }

    /// Rewrite `source` and carry `input_sourcemap_json` (which maps `source` to its own
    /// originals) through the edits.
    pub fn transform_rewrite_sourcemap(
        &self,
        source: &str,
        input_sourcemap_json: &str,
    ) -> Result<CodeAndSourcemap, GapError> {
        let (code, edits) = self.rewrite(source)?;
        let sourcemap = rewrite_sourcemap(source, &code, input_sourcemap_json, &edits)?;
        Ok(CodeAndSourcemap { code, sourcemap })
    }

    /// Parse `source`, collect edits for every directive, apply them, and return
    /// `(output, edits)`.
    fn rewrite(&self, source: &str) -> Result<(String, Vec<Edit>), GapError> {
        let tree = parse(source)?;
        let mut tagged = self.collect_edits(source, &tree)?;

        // Every directive's rules go right after the owning rule, ahead of the ones added by
        // earlier directives; edits of a single directive keep their own order.
        tagged.sort_by_key(|(ordinal, e)| (e.start, e.end, Reverse(*ordinal)));
        let edits: Vec<Edit> = tagged.into_iter().map(|(_, e)| e).collect();
        validate_edits(source.len(), &edits)?;

        let code = apply_edits(source, &edits);
        Ok((code, edits))
    }

    /// Edits tagged with the document-order index of the directive that produced them.
    fn collect_edits(
        &self,
        source: &str,
        tree: &tree_sitter::Tree,
    ) -> Result<Vec<(usize, Edit)>, GapError> {
        let mut edits = Vec::new();
        let mut ordinal = 0;

        for rule in collect_rules(source, tree) {
            let mut ambient = None;
            for decl in rule
                .declarations
                .iter()
                .filter(|d| d.property == self.property)
            {
                let directive = parse_directive(&decl.value, &decl.property, decl.position)?;
                let ambient = ambient.get_or_insert_with(|| ambient_font(&rule));

                let metrics = resolve_metrics(
                    &directive,
                    ambient,
                    &self.table,
                    &self.default_font_family,
                    self.default_line_height,
                );
                log::trace!(
                    "{}: space {:?}, line-height {}{}",
                    decl.position,
                    metrics.space,
                    metrics.line_height,
                    metrics.unit
                );

                let offsets = compute_offsets(metrics.space, metrics.line_height, &metrics.unit);
                log::debug!(
                    "{}: `{}: {}` on `{}` -> before {:?}, after {:?}",
                    decl.position,
                    decl.property,
                    decl.value,
                    rule.selector,
                    offsets.before,
                    offsets.after
                );

                edits.extend(
                    emit(
                        source,
                        &rule,
                        decl,
                        directive.scope,
                        directive.placement,
                        &offsets,
                    )
                    .into_iter()
                    .map(|edit| (ordinal, edit)),
                );
                ordinal += 1;
            }
        }

        Ok(edits)
    }
}

/// Build a transform from `config` and rewrite `source`, creating a new sourcemap.
pub fn remove_text_gap(
    source: &str,
    source_filename: &str,
    config: &GapConfig,
) -> Result<CodeAndSourcemap, GapError> {
    TextRemoveGap::new(config)?.transform(source, source_filename)
}

/// Build a transform from `config` and rewrite `source` without a sourcemap.
pub fn remove_text_gap_no_sourcemap(source: &str, config: &GapConfig) -> Result<String, GapError> {
    TextRemoveGap::new(config)?.transform_no_sourcemap(source)
}
