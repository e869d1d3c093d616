//! PDF Merge CLI - Command line tool for concatenating PDF documents.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_merge_core::{ColorMode, Density, FileSetMerger, MergeOptions, util};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Rgb,
    Gray,
}

impl From<ColorOption> for ColorMode {
    fn from(opt: ColorOption) -> Self {
        match opt {
            ColorOption::Rgb => Self::Rgb,
            ColorOption::Gray => Self::Gray,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pdf-merge")]
#[command(author, version, about = "Concatenate PDF files into one document", long_about = None)]
struct Args {
    /// Input PDF files, merged in the given order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output PDF file (default: <first-input>-merged.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Rendering density in DPI
    #[arg(short, long, env = "PDF_MERGE_DENSITY")]
    density: Option<Density>,

    /// JPEG quality (1-100); pages are embedded losslessly when omitted
    #[arg(short, long, env = "PDF_MERGE_QUALITY", value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,

    /// Color model of the merged pages
    #[arg(long, value_enum)]
    colorspace: Option<ColorOption>,

    /// Config file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Skip inputs that were already given earlier on the command line
    #[arg(long)]
    skip_duplicates: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load options, then let CLI arguments override them
    let mut options = if let Some(config_path) = &args.config {
        MergeOptions::from_file(config_path).context("Failed to load config file")?
    } else {
        MergeOptions::load()
    };

    if let Some(density) = args.density {
        options.density = Some(density);
    }
    if let Some(quality) = args.quality {
        options.quality = Some(quality);
    }
    if let Some(colorspace) = args.colorspace {
        options.colorspace = colorspace.into();
    }

    let mut merger = FileSetMerger::new(options);
    for input in &args.inputs {
        if args.skip_duplicates && merger.contains(input) {
            warn!("Skipping duplicate input {}", input.display());
            continue;
        }
        merger
            .add(input)
            .context(format!("Failed to add input: {}", input.display()))?;
    }

    let output_path = args
        .output
        .unwrap_or_else(|| util::default_output_path(&args.inputs[0]));

    info!("Merging {} files", merger.len());

    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(merger.len() as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let on_progress: &dyn Fn(usize, usize) = &|done, _total| {
        pb.set_position(u64::try_from(done).unwrap_or(u64::MAX));
    };
    let report = merger
        .generate_with_progress(&output_path, Some(on_progress))
        .context(format!("Failed to write output: {}", output_path.display()))?;

    pb.finish_with_message("Merge complete");

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!(
            "Merged {} files ({} pages) into: {}",
            report.files,
            report.pages,
            report.output.display()
        );
    }

    Ok(())
}
