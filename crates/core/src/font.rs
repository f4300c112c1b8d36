//! Ambient font resolution for a rule.
//!
//! Reads a rule's `font`, `font-family` and `line-height` declarations (later ones win) and
//! reports the font-family list and raw line-height they imply, expanding the `font` shorthand:
//!
//! ```text
//! font: [<style> || <variant> || <weight> || <stretch>] <size>[/<line-height>] <family>#
//! ```

use crate::{directive::unquote, sheet::Rule};

/// Font settings a rule declares for itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmbientFont {
    /// Family names in preference order, quotes stripped. Empty when unknown.
    pub family: Vec<String>,
    /// Raw line-height value (`2`, `24px`, `normal`, ...), if any.
    pub line_height: Option<String>,
}

/// Resolve the font settings declared directly on `rule`.
pub fn ambient_font(rule: &Rule) -> AmbientFont {
    let mut font = AmbientFont::default();

    for decl in &rule.declarations {
        let value = strip_important(&decl.value);
        match decl.property.to_ascii_lowercase().as_str() {
            "font-family" => font.family = parse_family_list(value),
            "line-height" => font.line_height = Some(value.to_string()),
            "font" => {
                if let Some(shorthand) = parse_font_shorthand(value) {
                    font = shorthand;
                }
            }
            _ => {}
        }
    }

    font
}

/// Expand a `font` shorthand value.
///
/// System fonts and CSS-wide keywords reset both family and line-height. Returns `None` when the
/// value isn't a shorthand we understand, in which case callers keep what they had.
pub fn parse_font_shorthand(value: &str) -> Option<AmbientFont> {
    let value = value.trim();
    if RESET_KEYWORDS
        .iter()
        .any(|k| value.eq_ignore_ascii_case(k))
    {
        return Some(AmbientFont::default());
    }

    let tokens = tokenize(value);
    let size_idx = tokens
        .iter()
        .position(|&(start, end)| !is_prefix_keyword(&value[start..end]))?;

    let (size_start, size_end) = tokens[size_idx];
    let size_token = &value[size_start..size_end];
    let mut consumed_end = size_end;
    let mut next = size_idx + 1;

    let (size, mut line_height) = match size_token.split_once('/') {
        Some((size, lh)) => (size, (!lh.is_empty()).then_some(lh)),
        None => (size_token, None),
    };
    if !is_font_size(size) {
        return None;
    }

    // `16px/2` is handled above; also accept `16px/ 2`, `16px /2` and `16px / 2`.
    let slash_pending = size_token.ends_with('/');
    if line_height.is_none() {
        let slash_here = if slash_pending {
            true
        } else if let Some(&(s, e)) = tokens.get(next)
            && value[s..e].starts_with('/')
        {
            let attached = &value[s + 1..e];
            next += 1;
            consumed_end = e;
            if !attached.is_empty() {
                line_height = Some(attached);
                false
            } else {
                true
            }
        } else {
            false
        };

        if slash_here {
            let &(s, e) = tokens.get(next)?;
            line_height = Some(&value[s..e]);
            consumed_end = e;
        }
    }

    let family_text = value[consumed_end..].trim();
    if family_text.is_empty() {
        return None;
    }

    Some(AmbientFont {
        family: parse_family_list(family_text),
        line_height: Some(line_height.unwrap_or("normal").to_string()),
    })
}

/// Split a `font-family` value on top-level commas and unquote each name.
///
/// Unquoted names have internal whitespace runs collapsed to one space.
pub fn parse_family_list(value: &str) -> Vec<String> {
    split_top_level(value, |c| c == ',')
        .into_iter()
        .map(|(start, end)| value[start..end].trim())
        .filter(|name| !name.is_empty())
        .map(|name| {
            let unquoted = unquote(name);
            if unquoted.len() == name.len() {
                name.split_whitespace().collect::<Vec<_>>().join(" ")
            } else {
                unquoted.to_string()
            }
        })
        .collect()
}

/// System fonts and CSS-wide keywords.
const RESET_KEYWORDS: [&str; 11] = [
    "caption",
    "icon",
    "menu",
    "message-box",
    "small-caption",
    "status-bar",
    "inherit",
    "initial",
    "unset",
    "revert",
    "revert-layer",
];

const PREFIX_KEYWORDS: [&str; 15] = [
    "normal",
    "italic",
    "oblique",
    "small-caps",
    "bold",
    "bolder",
    "lighter",
    "ultra-condensed",
    "extra-condensed",
    "condensed",
    "semi-condensed",
    "semi-expanded",
    "expanded",
    "extra-expanded",
    "ultra-expanded",
];

const SIZE_KEYWORDS: [&str; 10] = [
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large",
    "larger", "smaller",
];

/// Style, variant, weight and stretch tokens that may precede the size.
fn is_prefix_keyword(token: &str) -> bool {
    if PREFIX_KEYWORDS
        .iter()
        .any(|k| token.eq_ignore_ascii_case(k))
    {
        return true;
    }
    // Numeric weights (`700`) and oblique angles (`oblique 10deg`).
    let is_weight = token != "0" && token.bytes().all(|b| b.is_ascii_digit());
    let is_angle = token
        .strip_suffix("deg")
        .is_some_and(|n| n.parse::<f64>().is_ok());
    is_weight || is_angle
}

fn is_font_size(token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    if SIZE_KEYWORDS.iter().any(|k| token.eq_ignore_ascii_case(k)) {
        return true;
    }
    let lower = token.to_ascii_lowercase();
    if ["calc(", "var(", "min(", "max(", "clamp("]
        .iter()
        .any(|f| lower.starts_with(f))
    {
        return true;
    }
    let numeric_len = token
        .bytes()
        .take_while(|b| b.is_ascii_digit() || *b == b'.')
        .count();
    numeric_len > 0 && (token == "0" || numeric_len < token.len())
}

fn strip_important(value: &str) -> &str {
    let trimmed = value.trim_end();
    let lower = trimmed.to_ascii_lowercase();
    match lower.rfind('!') {
        Some(bang) if lower[bang + 1..].trim_start() == "important" => trimmed[..bang].trim_end(),
        _ => trimmed,
    }
}

/// Whitespace-separated tokens, keeping quoted strings and parenthesized groups whole.
fn tokenize(value: &str) -> Vec<(usize, usize)> {
    split_top_level(value, char::is_whitespace)
        .into_iter()
        .filter(|&(start, end)| start < end)
        .collect()
}

/// Split `value` on `is_sep` characters that are outside quotes and parentheses.
///
/// Returns byte ranges of the pieces (possibly empty).
fn split_top_level(value: &str, is_sep: impl Fn(char) -> bool) -> Vec<(usize, usize)> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in value.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && is_sep(c) => {
                pieces.push((start, i));
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    pieces.push((start, value.len()));
    pieces
}
