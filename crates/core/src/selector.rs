//! Appending pseudo-elements to selector lists.

use std::ops::Range;

/// Append `pseudo` (e.g. `::before`) to every selector in a selector list.
///
/// `branches` are the byte ranges of the individual selectors within `selector`, as produced by
/// the CSS parser. Text between branches (commas, whitespace, comments) is kept verbatim. When
/// `branches` is empty the list is split on top-level commas instead.
pub fn append_pseudo(selector: &str, branches: &[Range<usize>], pseudo: &str) -> String {
    if branches.is_empty() {
        return append_pseudo_str(selector, pseudo);
    }

    let mut out = String::with_capacity(selector.len() + branches.len() * pseudo.len());
    let mut cursor = 0;
    for branch in branches {
        out.push_str(&selector[cursor..branch.end]);
        out.push_str(pseudo);
        cursor = branch.end;
    }
    out.push_str(&selector[cursor..]);
    out
}

/// String-only variant of [`append_pseudo`].
///
/// Commas inside `()`, `[]` or quotes don't split the list, and trailing whitespace of each
/// selector stays after the inserted pseudo-element.
pub fn append_pseudo_str(selector: &str, pseudo: &str) -> String {
    let mut out = String::with_capacity(selector.len() + pseudo.len() * 2);
    for (i, part) in split_selector_list(selector).into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let body = part.trim_end();
        out.push_str(body);
        out.push_str(pseudo);
        out.push_str(&part[body.len()..]);
    }
    out
}

fn split_selector_list(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in selector.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&selector[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&selector[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::{collect_rules, parse};

    fn with_parsed_branches(selector: &str, pseudo: &str) -> String {
        let src = format!("{selector} {{}}");
        let tree = parse(&src).unwrap();
        let rule = &collect_rules(&src, &tree)[0];
        append_pseudo(&rule.selector, &rule.branches, pseudo)
    }

    #[test]
    fn single_selector() {
        assert_eq!(with_parsed_branches("p", "::before"), "p::before");
        assert_eq!(
            with_parsed_branches(".a .b:hover", "::after"),
            ".a .b:hover::after"
        );
    }

    #[test]
    fn every_branch_of_a_list() {
        assert_eq!(
            with_parsed_branches("ul > li, ol > li", "::before"),
            "ul > li::before, ol > li::before"
        );
        assert_eq!(
            with_parsed_branches("h1,h2 , h3", "::after"),
            "h1::after,h2::after , h3::after"
        );
    }

    #[test]
    fn string_fallback_respects_nesting() {
        assert_eq!(
            append_pseudo_str("a[title=\"x,y\"], b:is(.c, .d)", "::before"),
            "a[title=\"x,y\"]::before, b:is(.c, .d)::before"
        );
        assert_eq!(
            append_pseudo_str("ul > li, ol > li", "::after"),
            "ul > li::after, ol > li::after"
        );
        assert_eq!(append_pseudo_str("p ", "::after"), "p::after ");
    }

    #[test]
    fn empty_branches_fall_back_to_string_split() {
        assert_eq!(append_pseudo("a, b", &[], "::before"), "a::before, b::before");
    }
}
