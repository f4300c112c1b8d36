use std::{fs, path::PathBuf};

use clap::Parser;
use text_remove_gap::{GapConfig, TextRemoveGap};

#[derive(Parser, Debug)]
#[command(name = "fixtures")]
#[command(about = "Create or validate fixture files", long_about = None)]
struct Args {
    /// Write fixtures instead of validating them
    #[arg(long, short)]
    write: bool,

    /// Path to the fixtures directory (defaults to "./fixtures")
    #[arg(long, default_value = "fixtures")]
    dir: PathBuf,
}

/// `name.css` -> (`name.out.css`, `name.out.css.map`).
fn output_paths(dir: &std::path::Path, filename: &str) -> Option<(PathBuf, PathBuf)> {
    let basename = filename.strip_suffix(".css")?;
    Some((
        dir.join(format!("{basename}.out.css")),
        dir.join(format!("{basename}.out.css.map")),
    ))
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::init();

    let args = Args::parse();

    let gap = TextRemoveGap::new(&GapConfig::default())?;

    let mut input_files = Vec::new();
    for entry in fs::read_dir(&args.dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or("invalid filename")?;

        // Skip .out. files and anything that isn't CSS
        if filename.contains(".out.") || !filename.ends_with(".css") {
            continue;
        }
        input_files.push(path);
    }

    input_files.sort();

    let mut mismatches = Vec::new();
    println!(
        "{} fixtures...",
        if args.write { "Creating" } else { "Validating" }
    );

    for input_path in &input_files {
        let filename = input_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or("invalid filename")?;
        let (out_path, out_map_path) =
            output_paths(&args.dir, filename).ok_or("filename missing .css extension")?;

        let source = fs::read_to_string(input_path)?;
        let res = gap.transform(&source, filename)?;

        if args.write {
            fs::write(&out_path, &res.code)?;
            fs::write(&out_map_path, &res.sourcemap)?;
            println!(
                "  Created {} and {}",
                out_path.display(),
                out_map_path.display()
            );
            continue;
        }

        let before = mismatches.len();
        for (path, actual, what) in [
            (&out_path, &res.code, "code"),
            (&out_map_path, &res.sourcemap, "sourcemap"),
        ] {
            match fs::read(path) {
                Ok(expected) if expected == actual.as_bytes() => {}
                Ok(_) => mismatches.push(format!("{filename}: {what} mismatch")),
                // Sourcemaps are optional in the fixture set.
                Err(_) if what == "sourcemap" => {}
                Err(_) => mismatches.push(format!(
                    "{filename}: missing {what} file {}",
                    path.display()
                )),
            }
        }
        if mismatches.len() == before {
            println!("  ✓ {filename}");
        }
    }

    if !mismatches.is_empty() {
        eprintln!("\nValidation failed:");
        for mismatch in &mismatches {
            eprintln!("  ✗ {mismatch}");
        }
        return Err(format!("{} validation error(s)", mismatches.len()).into());
    }

    println!("Done: {} fixtures.", input_files.len());
    Ok(())
}
