//! wasm-bindgen exports.
//!
//! This module exposes the `text-remove-gap` transform to JavaScript via `wasm-bindgen`.
//! The underlying logic lives in the core crate's `transform.rs`.

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

use text_remove_gap::{
    GapConfig, GapError, SpaceValues, TextRemoveGap, coerce_line_height, metrics::FontTable,
};

/// A line-height given either as a number or as numeric text.
#[derive(Debug, Clone, serde::Deserialize, tsify::Tsify)]
#[serde(untagged)]
pub enum LineHeightOption {
    Number(f64),
    Text(String),
}

/// Options for the transform. Every field is optional.
#[derive(Debug, Clone, Default, serde::Deserialize, tsify::Tsify)]
#[serde(default, rename_all = "camelCase")]
#[tsify(from_wasm_abi)]
pub struct GapOptions {
    /// Recognize `-<prefix>-text-remove-gap` instead of `text-remove-gap`
    #[tsify(optional)]
    pub prefix: Option<String>,
    /// Extra `[spaceBefore, spaceAfter]` metrics per font family; these win over the bundled ones
    #[tsify(optional)]
    pub fonts: Option<BTreeMap<String, [f64; 2]>>,
    /// Family used when nothing else resolves (default `"serif"`)
    #[tsify(optional)]
    pub default_font_family: Option<String>,
    /// Line-height used when none is found (default `1`)
    #[tsify(optional)]
    pub default_line_height: Option<LineHeightOption>,
}

impl From<GapOptions> for GapConfig {
    fn from(val: GapOptions) -> Self {
        let defaults = GapConfig::default();
        let default_line_height = match val.default_line_height {
            Some(LineHeightOption::Number(n)) => n,
            Some(LineHeightOption::Text(s)) => coerce_line_height(&s),
            None => defaults.default_line_height,
        };
        GapConfig {
            prefix: val.prefix,
            fonts: val
                .fonts
                .unwrap_or_default()
                .into_iter()
                .map(|(name, pair)| (name, SpaceValues::from(pair)))
                .collect(),
            default_font_family: val
                .default_font_family
                .unwrap_or(defaults.default_font_family),
            default_line_height,
        }
        .with_default_line_height(default_line_height)
    }
}

/// Output from the wasm API when a sourcemap is requested.
#[derive(Debug, Clone, serde::Serialize, tsify::Tsify)]
#[tsify(into_wasm_abi)]
pub struct GapOutput {
    /// The rewritten CSS.
    pub code: String,
    /// The generated/re-written sourcemap JSON.
    pub sourcemap: String,
}

fn to_js_error(err: GapError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn build(options: GapOptions) -> Result<TextRemoveGap, JsValue> {
    console_error_panic_hook::set_once();
    TextRemoveGap::new(&options.into()).map_err(to_js_error)
}

/// Rewrite `text-remove-gap` declarations and create a brand-new sourcemap.
///
/// `source_name` is recorded as the sourcemap's source filename.
#[wasm_bindgen(js_name = removeTextGap)]
pub fn remove_text_gap(
    code: String,
    source_name: String,
    options: GapOptions,
) -> Result<GapOutput, JsValue> {
    let res = build(options)?
        .transform(&code, &source_name)
        .map_err(to_js_error)?;
    Ok(GapOutput {
        code: res.code,
        sourcemap: res.sourcemap,
    })
}

/// Rewrite `text-remove-gap` declarations without producing a sourcemap.
#[wasm_bindgen(js_name = removeTextGapNoSourcemap)]
pub fn remove_text_gap_no_sourcemap(code: String, options: GapOptions) -> Result<String, JsValue> {
    build(options)?
        .transform_no_sourcemap(&code)
        .map_err(to_js_error)
}

/// Rewrite `text-remove-gap` declarations and carry `sourcemap` (the input's own map) through.
#[wasm_bindgen(js_name = removeTextGapRewriteSourcemap)]
pub fn remove_text_gap_rewrite_sourcemap(
    code: String,
    sourcemap: String,
    options: GapOptions,
) -> Result<GapOutput, JsValue> {
    let res = build(options)?
        .transform_rewrite_sourcemap(&code, &sourcemap)
        .map_err(to_js_error)?;
    Ok(GapOutput {
        code: res.code,
        sourcemap: res.sourcemap,
    })
}

/// The bundled font metrics as a `{ [family]: [before, after] }` object.
#[wasm_bindgen(js_name = bundledFonts)]
pub fn bundled_fonts() -> Result<JsValue, JsValue> {
    let table = FontTable::bundled().map_err(to_js_error)?;
    serde_wasm_bindgen::to_value(&table).map_err(Into::into)
}
