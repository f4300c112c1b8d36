//! `text-remove-gap` value grammar.
//!
//! ```text
//! [outside] (before|after|both) [<number>[<unit>]] [<family>[, <family>...]]
//! ```
//!
//! Keywords are case-sensitive and must end on an ASCII word boundary. The line-height number
//! and its unit must be adjacent. Anything after the line-height (or after the placement when
//! there is no line-height) must start with whitespace and is read as a font-family list.

use crate::{GapError, SourcePosition};

/// Where the correction is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scope {
    /// Synthesized `::before`/`::after` rules absorb the gap inside the box.
    #[default]
    Inside,
    /// Margins on the element itself.
    Outside,
}

impl Scope {
    /// Maps the optional mode keyword to a scope. `None` means the default mode.
    pub fn from_keyword(keyword: Option<&str>) -> Option<Self> {
        match keyword {
            None | Some("inside") => Some(Scope::Inside),
            Some("outside") => Some(Scope::Outside),
            Some(_) => None,
        }
    }
}

/// Which edge(s) of the text block get corrected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
    Both,
}

impl Placement {
    const KEYWORDS: [(&'static str, Placement); 3] = [
        ("before", Placement::Before),
        ("after", Placement::After),
        ("both", Placement::Both),
    ];

    /// Returns whether the placement covers the top edge.
    pub fn has_before(self) -> bool {
        matches!(self, Placement::Before | Placement::Both)
    }

    /// Returns whether the placement covers the bottom edge.
    pub fn has_after(self) -> bool {
        matches!(self, Placement::After | Placement::Both)
    }
}

/// A line-height as written: number plus unit (`""`, `"em"`, `"%"`, `"px"`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct LineHeight {
    pub value: f64,
    pub unit: String,
}

/// Parsed form of one `text-remove-gap` value.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub scope: Scope,
    pub placement: Placement,
    pub line_height: Option<LineHeight>,
    /// Font families to use instead of the rule's own, quotes stripped.
    pub font_family: Option<Vec<String>>,
}

/// Parse a declaration value into a [`Directive`].
///
/// `property` and `position` only feed the error.
pub fn parse_directive(
    value: &str,
    property: &str,
    position: SourcePosition,
) -> Result<Directive, GapError> {
    let malformed = || GapError::MalformedDirective {
        property: property.to_string(),
        value: value.to_string(),
        position,
    };

    let rest = value.trim();
    let (mode, rest) = match keyword(rest, "outside") {
        Some(after) => (Some("outside"), after.trim_start()),
        None => (None, rest),
    };

    let (placement, rest) = Placement::KEYWORDS
        .iter()
        .find_map(|&(word, placement)| keyword(rest, word).map(|after| (placement, after)))
        .ok_or_else(malformed)?;

    let (line_height, family) = parse_tail(rest).ok_or_else(malformed)?;

    let scope = Scope::from_keyword(mode).ok_or_else(|| GapError::UnknownScope {
        mode: mode.unwrap_or_default().to_string(),
        position,
    })?;

    let font_family = family
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(split_family_list);

    Ok(Directive {
        scope,
        placement,
        line_height,
        font_family,
    })
}

/// Parse a bare line-height such as `2`, `1.5em`, `150%` or `24px`.
///
/// The whole string must match; `normal` and friends yield `None`.
pub fn parse_line_height(s: &str) -> Option<LineHeight> {
    match scan_line_height(s)? {
        (lh, "") => Some(lh),
        _ => None,
    }
}

/// Remove one pair of matching `'` or `"` quotes around `s`.
pub fn unquote(s: &str) -> &str {
    let bytes = s.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(&open), Some(&close))
            if s.len() >= 2 && open == close && (open == b'"' || open == b'\'') =>
        {
            &s[1..s.len() - 1]
        }
        _ => s,
    }
}

/// Split a family list on commas (with surrounding whitespace) and unquote each entry.
pub fn split_family_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|family| unquote(family.trim()).to_string())
        .collect()
}

/// Everything after the placement keyword: optional line-height, optional family text.
///
/// Returns `None` when the tail doesn't fit the grammar.
fn parse_tail(rest: &str) -> Option<(Option<LineHeight>, Option<&str>)> {
    if let Some((lh, after)) = scan_line_height(rest.trim_start()) {
        if after.is_empty() {
            return Some((Some(lh), None));
        }
        if is_family_tail(after) {
            return Some((Some(lh), Some(after)));
        }
    }

    // Whitespace right after the keyword may span lines; the family text itself may not.
    let text = rest.trim_start();
    if text.is_empty() {
        Some((None, None))
    } else if text.len() < rest.len() && is_single_line(text) {
        Some((None, Some(rest)))
    } else {
        None
    }
}

/// A family tail directly after a line-height: one whitespace character, then text that stays
/// on that line.
fn is_family_tail(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().is_some_and(char::is_whitespace)
        && !chars.as_str().is_empty()
        && is_single_line(chars.as_str())
}

fn is_single_line(s: &str) -> bool {
    !s.contains(['\n', '\r', '\u{2028}', '\u{2029}'])
}

/// Scan `digits[.digits]` or `.digits`, then an optional `%` or ASCII-letter unit.
///
/// Returns the line-height and the unconsumed rest.
fn scan_line_height(s: &str) -> Option<(LineHeight, &str)> {
    let bytes = s.as_bytes();
    let int_len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    let mut len = int_len;
    if bytes.get(len) == Some(&b'.') {
        let frac_len = bytes[len + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if frac_len > 0 {
            len += 1 + frac_len;
        }
    }
    if len == 0 {
        return None;
    }

    let value: f64 = s[..len].parse().ok()?;
    let rest = &s[len..];
    let unit_len = if rest.starts_with('%') {
        1
    } else {
        rest.bytes().take_while(u8::is_ascii_alphabetic).count()
    };

    Some((
        LineHeight {
            value,
            unit: rest[..unit_len].to_string(),
        },
        &rest[unit_len..],
    ))
}

/// If `s` starts with `word` followed by an ASCII word boundary, returns the rest.
fn keyword<'a>(s: &'a str, word: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(word)?;
    match rest.bytes().next() {
        Some(b) if b.is_ascii_alphanumeric() || b == b'_' => None,
        _ => Some(rest),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(value: &str) -> Result<Directive, GapError> {
        parse_directive(value, "text-remove-gap", SourcePosition { line: 1, column: 1 })
    }

    fn lh(value: f64, unit: &str) -> Option<LineHeight> {
        Some(LineHeight {
            value,
            unit: unit.to_string(),
        })
    }

    #[test]
    fn placement_only_defaults_to_inside() {
        let d = parse("both").unwrap();
        assert_eq!(d.scope, Scope::Inside);
        assert_eq!(d.placement, Placement::Both);
        assert_eq!(d.line_height, None);
        assert_eq!(d.font_family, None);
    }

    #[test]
    fn outside_keyword() {
        let d = parse("  outside   after ").unwrap();
        assert_eq!(d.scope, Scope::Outside);
        assert_eq!(d.placement, Placement::After);
    }

    #[test]
    fn all_settings() {
        let d = parse("outside both 1.5 \"Times New Roman\", serif").unwrap();
        assert_eq!(d.scope, Scope::Outside);
        assert_eq!(d.placement, Placement::Both);
        assert_eq!(d.line_height, lh(1.5, ""));
        assert_eq!(
            d.font_family,
            Some(vec!["Times New Roman".to_string(), "serif".to_string()])
        );
    }

    #[test]
    fn line_height_units() {
        assert_eq!(parse("before 24px").unwrap().line_height, lh(24.0, "px"));
        assert_eq!(parse("before 150%").unwrap().line_height, lh(150.0, "%"));
        assert_eq!(parse("before .5em").unwrap().line_height, lh(0.5, "em"));
    }

    #[test]
    fn family_without_line_height() {
        let d = parse("after 'Open Sans' ,Arial").unwrap();
        assert_eq!(d.line_height, None);
        assert_eq!(
            d.font_family,
            Some(vec!["Open Sans".to_string(), "Arial".to_string()])
        );
    }

    #[test]
    fn number_that_is_not_a_line_height_becomes_family_text() {
        let d = parse("both 1.").unwrap();
        assert_eq!(d.line_height, None);
        assert_eq!(d.font_family, Some(vec!["1.".to_string()]));
    }

    #[test]
    fn rejects_missing_or_unknown_placement() {
        assert!(matches!(
            parse(""),
            Err(GapError::MalformedDirective { .. })
        ));
        assert!(matches!(
            parse("outside"),
            Err(GapError::MalformedDirective { .. })
        ));
        assert!(matches!(
            parse("top"),
            Err(GapError::MalformedDirective { .. })
        ));
    }

    #[test]
    fn keywords_need_word_boundaries() {
        assert!(parse("bother").is_err());
        assert!(parse("both1.5").is_err());
        assert!(parse("outsideboth").is_err());
        assert!(parse("Both").is_err());
    }

    #[test]
    fn family_text_must_be_separated_by_whitespace() {
        assert!(parse("both\"Arial\"").is_err());
        assert!(parse("both,Arial").is_err());
    }

    #[test]
    fn family_text_stays_on_one_line() {
        assert!(parse("both Times\nArial").is_err());
        assert!(parse("both 1.5 \n Arial").is_err());
        assert!(parse("after \"Times New Roman\",\r\nserif").is_err());
        // The separating whitespace itself may be a line break.
        let d = parse("both\n  \"Times New Roman\"").unwrap();
        assert_eq!(d.font_family, Some(vec!["Times New Roman".to_string()]));
        let d = parse("both 1.5\nArial").unwrap();
        assert_eq!(d.line_height, lh(1.5, ""));
        assert_eq!(d.font_family, Some(vec!["Arial".to_string()]));
    }

    #[test]
    fn malformed_error_carries_position_and_value() {
        let err = parse_directive("sideways", "-x-text-remove-gap", SourcePosition {
            line: 4,
            column: 7,
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "4:7: incorrect `-x-text-remove-gap` value: \"sideways\""
        );
    }

    #[test]
    fn unknown_scope_keyword_is_rejected() {
        assert_eq!(Scope::from_keyword(Some("outside")), Some(Scope::Outside));
        assert_eq!(Scope::from_keyword(None), Some(Scope::Inside));
        assert_eq!(Scope::from_keyword(Some("sideways")), None);
    }

    #[test]
    fn unquote_strips_matching_quotes_only() {
        assert_eq!(unquote("\"Times New Roman\""), "Times New Roman");
        assert_eq!(unquote("'Arial'"), "Arial");
        assert_eq!(unquote("Times New Roman"), "Times New Roman");
        assert_eq!(unquote("\"Arial'"), "\"Arial'");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn bare_line_heights() {
        assert_eq!(parse_line_height("2"), lh(2.0, ""));
        assert_eq!(parse_line_height("1.5em"), lh(1.5, "em"));
        assert_eq!(parse_line_height("normal"), None);
        assert_eq!(parse_line_height("2 "), None);
    }
}
