use std::{fs, path::PathBuf};

use clap::Parser;
use text_remove_gap::sheet::{collect_rules, parse};

#[derive(Parser, Debug)]
#[command(name = "parse")]
#[command(about = "Parse a CSS file with tree-sitter and print the CST", long_about = None)]
struct Args {
    /// Path to the CSS file to parse
    input: PathBuf,

    /// Print the tree in S-expression format instead of the default dump format
    #[arg(long, short)]
    sexp: bool,

    /// Print the rule snapshot the transform works on instead of the CST
    #[arg(long, conflicts_with = "sexp")]
    rules: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let args = Args::parse();

    let source = fs::read_to_string(&args.input)?;
    let tree = parse(&source)?;
    let root = tree.root_node();

    if args.sexp {
        println!("{}", root.to_sexp());
    } else if args.rules {
        for rule in collect_rules(&source, &tree) {
            println!("{:?} [{}..{}]", rule.selector, rule.start, rule.end);
            for decl in &rule.declarations {
                println!(
                    "  {} {}: {:?} [{}..{}]",
                    decl.position, decl.property, decl.value, decl.start, decl.end
                );
            }
        }
    } else {
        dump_tree(&source, root, 0);
    }

    Ok(())
}

fn dump_tree(source: &str, node: tree_sitter::Node<'_>, depth: usize) {
    let indent = "  ".repeat(depth);

    let start = node.start_position();
    let end = node.end_position();

    let text_preview = node
        .utf8_text(source.as_bytes())
        .map(|t| t.replace('\n', "\\n"))
        .unwrap_or_else(|_| "<non-utf8>".to_string());

    println!(
        "{indent}{kind}{missing} [{sb}..{eb}] ({sl}:{sc})..({el}:{ec}) \"{text}\"",
        kind = node.kind(),
        missing = if node.is_missing() { " (missing)" } else { "" },
        sb = node.start_byte(),
        eb = node.end_byte(),
        sl = start.row,
        sc = start.column,
        el = end.row,
        ec = end.column,
        text = truncate(&text_preview, 80),
    );

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        dump_tree(source, child, depth + 1);
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((end, _)) => format!("{}…", &s[..end]),
        None => s.to_string(),
    }
}
