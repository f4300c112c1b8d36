//! Font metrics table and line-height resolution.
//!
//! The table maps a font-family name, exactly as written in CSS, to the fraction of an em that
//! the font leaves above its cap height and below its baseline at `line-height: 1`. A bundled
//! table (`fonts.json`) is merged with caller overrides once per configuration and is read-only
//! afterwards.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    GapError,
    directive::{Directive, LineHeight, parse_line_height},
    font::AmbientFont,
    offset::round2,
};

/// Bundled metrics; other families come in through `GapConfig::fonts`.
const BUNDLED_FONTS: &str = include_str!("../fonts.json");

/// Space a font leaves above (`before`) and below (`after`) its glyphs, in em.
///
/// Serialized as a `[before, after]` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct SpaceValues {
    pub before: f64,
    pub after: f64,
}

impl SpaceValues {
    pub const ZERO: SpaceValues = SpaceValues {
        before: 0.0,
        after: 0.0,
    };

    pub fn new(before: f64, after: f64) -> Self {
        Self { before, after }
    }
}

impl From<[f64; 2]> for SpaceValues {
    fn from([before, after]: [f64; 2]) -> Self {
        Self { before, after }
    }
}

impl From<SpaceValues> for [f64; 2] {
    fn from(val: SpaceValues) -> Self {
        [val.before, val.after]
    }
}

/// Font-family name to [`SpaceValues`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontTable {
    fonts: BTreeMap<String, SpaceValues>,
}

impl FontTable {
    /// Load the bundled table.
    pub fn bundled() -> Result<Self, GapError> {
        Ok(serde_json::from_str(BUNDLED_FONTS)?)
    }

    /// Shallow merge: every override replaces the entry with the same name.
    pub fn with_overrides(mut self, overrides: &BTreeMap<String, SpaceValues>) -> Self {
        self.fonts
            .extend(overrides.iter().map(|(name, space)| (name.clone(), *space)));
        self
    }

    pub fn get(&self, family: &str) -> Option<SpaceValues> {
        self.fonts.get(family).copied()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    /// Returns the entry of the first family that has one, or zero space.
    pub fn lookup<'a>(&self, families: impl IntoIterator<Item = &'a str>) -> SpaceValues {
        families
            .into_iter()
            .find_map(|family| self.get(family))
            .unwrap_or(SpaceValues::ZERO)
    }
}

/// Everything the offset calculation needs for one directive.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMetrics {
    pub space: SpaceValues,
    /// Effective line-height; unitless unless `unit` is non-empty.
    pub line_height: f64,
    pub unit: String,
}

/// Resolve glyph space and effective line-height for `directive` inside a rule whose own font
/// settings are `ambient`.
///
/// Families come from the directive if it names any, else from the rule; `default_family` is
/// always tried last. The line-height comes from the directive, else the rule, else
/// `default_line_height`.
pub fn resolve_metrics(
    directive: &Directive,
    ambient: &AmbientFont,
    table: &FontTable,
    default_family: &str,
    default_line_height: f64,
) -> ResolvedMetrics {
    let families = directive
        .font_family
        .as_deref()
        .unwrap_or(&ambient.family)
        .iter()
        .map(String::as_str)
        .chain([default_family]);
    let space = table.lookup(families);

    let LineHeight { value, unit } = resolve_line_height(
        directive.line_height.as_ref(),
        ambient.line_height.as_deref(),
        default_line_height,
    );

    ResolvedMetrics {
        space,
        line_height: value,
        unit,
    }
}

/// Pick the line-height source and normalize it.
///
/// An explicit line-height of `0` counts as not given.
pub fn resolve_line_height(
    explicit: Option<&LineHeight>,
    ambient: Option<&str>,
    default: f64,
) -> LineHeight {
    let chosen = explicit
        .filter(|lh| lh.value != 0.0)
        .cloned()
        .or_else(|| ambient.and_then(|raw| parse_line_height(raw.trim())))
        .unwrap_or(LineHeight {
            value: default,
            unit: String::new(),
        });
    normalize_line_height(chosen)
}

/// `em` is already relative to the font size, and `%` converts to a unitless factor (rounded
/// to two decimals). Other units stay as they are.
pub fn normalize_line_height(lh: LineHeight) -> LineHeight {
    match lh.unit.as_str() {
        "em" => LineHeight {
            value: lh.value,
            unit: String::new(),
        },
        "%" => LineHeight {
            value: round2(lh.value / 100.0),
            unit: String::new(),
        },
        _ => lh,
    }
}
