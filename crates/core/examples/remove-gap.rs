use std::{collections::BTreeMap, fs, path::PathBuf};

use clap::Parser;
use text_remove_gap::{GapConfig, SpaceValues, TextRemoveGap, coerce_line_height};

#[derive(Parser, Debug)]
#[command(name = "remove-gap")]
#[command(about = "Rewrite `text-remove-gap` declarations into margins that cancel line-height gaps", long_about = None)]
struct Args {
    /// Path to the CSS file to transform
    input: PathBuf,

    /// Output path for transformed CSS (defaults to stdout)
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Output path for the sourcemap (defaults to <out>.map if --out is provided)
    #[arg(long)]
    out_sourcemap: Option<PathBuf>,

    /// Recognize `-<PREFIX>-text-remove-gap` instead of `text-remove-gap`
    #[arg(long)]
    prefix: Option<String>,

    /// Extra font metrics as NAME=BEFORE,AFTER (repeatable)
    #[arg(long = "font", value_name = "NAME=BEFORE,AFTER", value_parser = parse_font)]
    fonts: Vec<(String, SpaceValues)>,

    /// Family used when no other family has metrics
    #[arg(long, default_value = "serif")]
    default_font_family: String,

    /// Line-height used when neither the directive nor the rule sets one
    #[arg(long, default_value = "1")]
    default_line_height: String,
}

fn parse_font(arg: &str) -> Result<(String, SpaceValues), String> {
    let (name, values) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=BEFORE,AFTER, got {arg:?}"))?;
    let (before, after) = values
        .split_once(',')
        .ok_or_else(|| format!("expected BEFORE,AFTER, got {values:?}"))?;
    let number = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid metric {s:?}: {e}"))
    };
    Ok((
        name.trim().to_string(),
        SpaceValues::new(number(before)?, number(after)?),
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let args = Args::parse();

    let source = fs::read_to_string(&args.input)?;

    let config = GapConfig {
        prefix: args.prefix.clone(),
        fonts: args.fonts.iter().cloned().collect::<BTreeMap<_, _>>(),
        default_font_family: args.default_font_family.clone(),
        default_line_height: coerce_line_height(&args.default_line_height),
    };
    let gap = TextRemoveGap::new(&config)?;

    let out_map_path = args.out_sourcemap.clone().or_else(|| {
        args.out
            .as_ref()
            .map(|out| PathBuf::from(format!("{}.map", out.display())))
    });

    let out_code = if let Some(out_map_path) = out_map_path {
        let filename = args
            .input
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or("input file must have a valid filename")?;
        let res = gap.transform(&source, filename)?;
        fs::write(out_map_path, res.sourcemap)?;

        res.code
    } else {
        gap.transform_no_sourcemap(&source)?
    };

    match &args.out {
        None => {
            print!("{out_code}");
        }
        Some(out) => {
            fs::write(out, out_code)?;
        }
    }

    Ok(())
}
