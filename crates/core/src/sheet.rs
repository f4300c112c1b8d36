//! CSS parsing and style-tree snapshots.
//!
//! The transform never mutates a tree while walking it. Instead, [`collect_rules`] takes a
//! document-order snapshot of every style rule and its direct declarations, the emitter turns
//! that snapshot into byte-range edits against the original source, and the edits are applied
//! in a single pass at the end. Rules synthesized by the transform therefore never show up in
//! the walk.
//!
//! All offsets here are byte offsets (tree-sitter's model).

use std::{cell::RefCell, ops::Range};

use tree_sitter::{Node, Parser, Tree};

use crate::{GapError, SourcePosition, alloc::ensure_tree_sitter_allocator};

thread_local! {
    /// Shared Tree-sitter parser instance. We reuse it to avoid reloading the language for each call.
    static CSS_PARSER: RefCell<Parser> = {
        ensure_tree_sitter_allocator();

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_css::LANGUAGE.into())
            .expect("tree-sitter-css language load failed");
        RefCell::new(parser)
    };
}

/// Parse a CSS style sheet.
pub fn parse(source: &str) -> Result<Tree, GapError> {
    ensure_tree_sitter_allocator();

    CSS_PARSER
        .with(|p| p.borrow_mut().parse(source, None))
        .ok_or(GapError::ParseFailed)
}

/// A style rule (`selectors { ... }`) as it appears in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Start byte offset (inclusive) of the rule.
    pub start: usize,
    /// End byte offset (exclusive) of the rule, right after its closing `}`.
    pub end: usize,
    /// Selector list text, verbatim.
    pub selector: String,
    /// Byte ranges of each comma-separated selector, relative to `selector`.
    pub branches: Vec<Range<usize>>,
    /// Whitespace between the start of the rule's line and the rule itself.
    pub indent: String,
    /// Declarations that are direct children of this rule's block, in order.
    pub declarations: Vec<Declaration>,
}

/// A single `property: value` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    /// Raw value text between `:` and `;` (or the end of the declaration), trimmed.
    pub value: String,
    /// Start byte offset (inclusive) of the property name.
    pub start: usize,
    /// End byte offset (exclusive), including the trailing `;` if there is one.
    pub end: usize,
    /// Start of the whitespace that precedes the declaration (end of the previous sibling).
    pub leading_start: usize,
    /// Text between the property name and the value, usually `": "`.
    pub separator: String,
    /// Whether the declaration ends with `;`.
    pub terminated: bool,
    pub position: SourcePosition,
}

impl Declaration {
    /// Returns the whitespace in front of the declaration.
    pub fn leading_whitespace<'a>(&self, source: &'a str) -> &'a str {
        &source[self.leading_start..self.start]
    }
}

/// Snapshot every style rule of `tree`, depth-first in document order.
///
/// Rules nested in at-rule blocks or in other rules are included. Declarations nested deeper
/// than the rule's own block belong to the nested rule only.
pub fn collect_rules(source: &str, tree: &Tree) -> Vec<Rule> {
    let root = tree.root_node();
    if root.has_error() {
        log::warn!("style sheet contains syntax errors; declarations inside them are skipped");
    }

    let mut rules = Vec::new();
    let mut cursor = root.walk();
    'walk: loop {
        let current = cursor.node();
        if current.kind() == "rule_set"
            && let Some(rule) = snapshot_rule(source, current)
        {
            rules.push(rule);
        }

        if cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }
    rules
}

fn snapshot_rule(source: &str, node: Node<'_>) -> Option<Rule> {
    let mut cursor = node.walk();
    let selectors = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "selectors")?;
    let block = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "block")?;

    let sel_start = selectors.start_byte();
    let selector = source[sel_start..selectors.end_byte()].to_string();
    let branches = selectors
        .named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .map(|c| c.start_byte() - sel_start..c.end_byte() - sel_start)
        .collect();

    let declarations = block
        .named_children(&mut cursor)
        .filter(|c| c.kind() == "declaration")
        .filter_map(|c| snapshot_declaration(source, c))
        .collect();

    Some(Rule {
        start: node.start_byte(),
        end: node.end_byte(),
        selector,
        branches,
        indent: line_indent(source, node.start_byte()).to_string(),
        declarations,
    })
}

fn snapshot_declaration(source: &str, node: Node<'_>) -> Option<Declaration> {
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();

    let name = children.iter().find(|c| c.kind() == "property_name")?;
    let colon = children.iter().find(|c| c.kind() == ":")?;
    let semicolon = children.last().filter(|c| c.kind() == ";");

    let value_end = semicolon.map_or(node.end_byte(), |s| s.start_byte());
    let raw_value = source.get(colon.end_byte()..value_end)?;
    let value = strip_comments(raw_value);
    let value_start = value_end - raw_value.trim_start().len();

    let start = node.start_byte();
    let leading_start = node.prev_sibling().map_or(start, |prev| prev.end_byte());

    Some(Declaration {
        property: source[name.start_byte()..name.end_byte()].to_string(),
        value: value.trim().to_string(),
        start,
        end: node.end_byte(),
        leading_start,
        separator: source[name.end_byte()..value_start].to_string(),
        terminated: semicolon.is_some(),
        position: position_of(source, node),
    })
}

/// Drop `/* */` comments from a raw declaration value.
///
/// A comment next to whitespace or either end of the value goes; one wedged between two
/// tokens (`a/**/b`) stays, since removing it would merge them. Quoted text is left alone.
fn strip_comments(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = String::with_capacity(raw.len());
    let mut copied = 0;
    let mut quote = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(_) if b == b'\\' => {
                i += 2;
                continue;
            }
            Some(q) if b == q => quote = None,
            Some(_) => {}
            None if b == b'"' || b == b'\'' => quote = Some(b),
            None if bytes[i..].starts_with(b"/*") => {
                let end = raw[i + 2..].find("*/").map_or(raw.len(), |at| i + 2 + at + 2);
                let before_safe = raw[..i].chars().next_back().is_none_or(char::is_whitespace);
                let after_safe = raw[end..].chars().next().is_none_or(char::is_whitespace);
                if before_safe || after_safe {
                    out.push_str(&raw[copied..i]);
                    copied = end;
                }
                i = end;
                continue;
            }
            None => {}
        }
        i += 1;
    }
    out.push_str(&raw[copied..]);
    out
}

/// Returns the whitespace run between the start of `byte`'s line and `byte`.
///
/// Empty when anything other than spaces/tabs precedes `byte` on its line.
fn line_indent(source: &str, byte: usize) -> &str {
    let line_start = source[..byte].rfind('\n').map_or(0, |i| i + 1);
    let prefix = &source[line_start..byte];
    if prefix.bytes().all(|b| b == b' ' || b == b'\t') {
        prefix
    } else {
        ""
    }
}

fn position_of(source: &str, node: Node<'_>) -> SourcePosition {
    let point = node.start_position();
    let start = node.start_byte();
    let line_start = start - point.column;
    SourcePosition {
        line: point.row + 1,
        column: source[line_start..start].chars().count() + 1,
    }
}
