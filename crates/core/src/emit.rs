//! Emitting resolved directives as source edits.
//!
//! | scope   | placement | result                                                        |
//! |---------|-----------|---------------------------------------------------------------|
//! | outside | before    | declaration becomes `margin-top: <before>`                    |
//! | outside | after     | declaration becomes `margin-bottom: <after>`                  |
//! | outside | both      | `margin-top: <before>` followed by `margin-bottom: <after>`   |
//! | inside  | before    | `<sel>::before {display: table;content: "";margin-bottom: <before>;}` after the rule |
//! | inside  | after     | `<sel>::after {display: table;content: "";margin-top: <after>;}` after the rule      |
//! | inside  | both      | both pseudo rules, `::before` first                           |
//!
//! Inside mode removes the declaration. An edge whose offset is empty is dropped from the
//! placement; when nothing is left the declaration is just removed.
//!
//! Every synthesized byte maps back to the start of the originating declaration.

use crate::{
    directive::{Placement, Scope},
    edit::Edit,
    offset::Offsets,
    selector::append_pseudo,
    sheet::{Declaration, Rule},
};

/// Narrow `placement` to the edges that actually have an offset.
pub fn effective_placement(placement: Placement, offsets: &Offsets) -> Option<Placement> {
    let before = placement.has_before() && !offsets.before.is_empty();
    let after = placement.has_after() && !offsets.after.is_empty();
    match (before, after) {
        (true, true) => Some(Placement::Both),
        (true, false) => Some(Placement::Before),
        (false, true) => Some(Placement::After),
        (false, false) => None,
    }
}

/// Build the edits for one directive declaration.
///
/// Returned edits are relative to `source`, non-overlapping, and sorted by start offset.
pub fn emit(
    source: &str,
    rule: &Rule,
    declaration: &Declaration,
    scope: Scope,
    placement: Placement,
    offsets: &Offsets,
) -> Vec<Edit> {
    let Some(placement) = effective_placement(placement, offsets) else {
        log::debug!(
            "{}: no correction needed, dropping `{}`",
            declaration.position,
            declaration.property
        );
        return vec![remove_declaration(declaration)];
    };

    match scope {
        Scope::Outside => vec![outside(source, declaration, placement, offsets)],
        Scope::Inside => vec![
            remove_declaration(declaration),
            inside(source, rule, declaration, placement, offsets),
        ],
    }
}

/// Delete the declaration together with the whitespace in front of it.
fn remove_declaration(declaration: &Declaration) -> Edit {
    Edit::delete(declaration.leading_start..declaration.end)
}

fn outside(
    source: &str,
    declaration: &Declaration,
    placement: Placement,
    offsets: &Offsets,
) -> Edit {
    let sep = &declaration.separator;
    let mut text = match placement {
        Placement::Before => format!("margin-top{sep}{}", offsets.before),
        Placement::After => format!("margin-bottom{sep}{}", offsets.after),
        Placement::Both => format!(
            "margin-top{sep}{};{}margin-bottom{sep}{}",
            offsets.before,
            declaration.leading_whitespace(source),
            offsets.after,
        ),
    };
    if declaration.terminated {
        text.push(';');
    }
    Edit::synthesize(declaration.start..declaration.end, text, declaration.start)
}

fn inside(
    source: &str,
    rule: &Rule,
    declaration: &Declaration,
    placement: Placement,
    offsets: &Offsets,
) -> Edit {
    let newline = line_break(source);
    let mut text = String::new();
    if placement.has_before() {
        push_pseudo_rule(&mut text, newline, rule, "::before", "margin-bottom", &offsets.before);
    }
    if placement.has_after() {
        push_pseudo_rule(&mut text, newline, rule, "::after", "margin-top", &offsets.after);
    }
    Edit::synthesize(rule.end..rule.end, text, declaration.start)
}

/// The sheet's line terminator: `\r\n` when its first line ends that way, `\n` otherwise.
fn line_break(source: &str) -> &'static str {
    match source.find('\n') {
        Some(at) if source[..at].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

fn push_pseudo_rule(
    out: &mut String,
    newline: &str,
    rule: &Rule,
    pseudo: &str,
    margin: &str,
    offset: &str,
) {
    let selector = append_pseudo(&rule.selector, &rule.branches, pseudo);
    out.push_str(newline);
    out.push_str(&rule.indent);
    out.push_str(&selector);
    out.push_str(" {display: table;content: \"\";");
    out.push_str(margin);
    out.push_str(": ");
    out.push_str(offset);
    out.push_str(";}");
}
