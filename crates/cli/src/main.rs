//! CLI tool for generating corrective-action decks from feedback JSON.

use anyhow::{Context, Result};
use clap::Parser;
use deck_core::FeedbackPayload;
use deck_pptx::ReportBuilder;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

/// Generate corrective-action report decks from feedback payload files.
#[derive(Parser, Debug)]
#[command(name = "deck-gen")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input feedback payload file(s) (JSON)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Template document (.pptx)
    #[arg(short, long, default_value = "template.pptx")]
    template: PathBuf,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print each written file path to stdout
    #[arg(short, long)]
    print_filename: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let builder = ReportBuilder::new(&args.template);

    let mut failures = 0usize;
    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &builder) {
            Ok(output_path) => {
                if args.print_filename {
                    println!("{}", output_path.display());
                } else if args.verbose {
                    eprintln!("Written to: {}", output_path.display());
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input_path.display(), e);
                failures += 1;
            }
        }
    }

    if failures == args.input.len() {
        anyhow::bail!("no deck could be generated");
    }

    Ok(())
}

/// Generate one deck from one payload file.
fn process_file(input_path: &Path, args: &Args, builder: &ReportBuilder) -> Result<PathBuf> {
    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not valid JSON", input_path.display()))?;

    let payload = FeedbackPayload::from_value(value)?;
    let report = builder.build(&payload)?;

    log::debug!(
        "{}: {} slide(s), {} bytes",
        input_path.display(),
        report.slide_count,
        report.bytes.len()
    );

    let output_path = get_output_path(input_path, args.output.as_ref(), &report.filename)?;
    write_output(&output_path, &report.bytes)?;

    Ok(output_path)
}

/// Determine the output path, keeping the report's suggested filename.
fn get_output_path(
    input_path: &Path,
    output_dir: Option<&PathBuf>,
    filename: &str,
) -> Result<PathBuf> {
    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(filename)
            } else {
                PathBuf::from(filename)
            }
        }
    };

    Ok(output_path)
}

/// Write the finished deck to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
