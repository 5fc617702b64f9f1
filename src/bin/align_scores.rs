//! Align every recording listed in a dataset manifest to its score.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use score_align::manifest::{self, DatasetLayout};
use score_align::pipeline::{BatchOptions, ItemOutcome};
use score_align::{AlignConfig, Aligner};

#[derive(Debug, Parser)]
#[command(name = "align-scores")]
#[command(about = "Align score notes to recordings using CQT features and DTW")]
struct Args {
    /// Manifest CSV with `collection` and `filename` columns
    #[arg(short = 'c', long)]
    csv_filename: PathBuf,

    /// Input data directory (holds wav/, synth/ and notes/)
    #[arg(short = 'i', long)]
    input_dir: PathBuf,

    /// Output directory
    #[arg(short = 'o', long)]
    out_dir: PathBuf,

    /// Hop length for the CQT
    #[arg(short = 'l', long, default_value_t = 512)]
    hop_length: usize,

    /// Number of CQT bins per semitone
    #[arg(short = 'b', long, default_value_t = 3)]
    bins_per_note: usize,

    /// Skip rows whose output CSV already exists
    #[arg(short = 's', long)]
    skip_existing: bool,

    /// Only log errors
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Worker threads (0 uses every core)
    #[arg(short = 'j', long, default_value_t = 0)]
    jobs: usize,

    /// DTW band radius as a fraction of the synthesized length
    #[arg(long)]
    band: Option<f32>,

    /// Resample both audio files to this rate before analysis
    #[arg(long)]
    sample_rate: Option<u32>,
}

impl Args {
    fn config(&self) -> AlignConfig {
        let mut config = AlignConfig::new()
            .with_hop_length(self.hop_length)
            .with_bins_per_semitone(self.bins_per_note);
        if let Some(radius) = self.band {
            config = config.with_band_radius(radius);
        }
        if let Some(sr) = self.sample_rate {
            config = config.with_sample_rate(sr);
        }
        config
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.quiet { "error" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

/// Returns whether every row was aligned or skipped.
fn run(args: &Args) -> score_align::Result<bool> {
    let aligner = Aligner::new(args.config())?;

    #[cfg(feature = "parallel")]
    if let Err(err) = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build_global()
    {
        log::warn!("could not configure {} worker threads: {err}", args.jobs);
    }

    std::fs::create_dir_all(args.out_dir.join("alignment"))?;

    info!("Reading the CSV file...");
    let items = manifest::read_manifest(&args.csv_filename)?;
    let layout = DatasetLayout::new(&args.input_dir, &args.out_dir);
    let options = BatchOptions::new().with_skip_existing(args.skip_existing);

    info!("Iterating over rows...");
    let progress = ProgressBar::new(items.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    if args.quiet {
        progress.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let report = aligner.run_batch(&items, &layout, options, |outcome: &ItemOutcome| {
        progress.set_message(outcome.item.filename.clone());
        progress.inc(1);
    });
    progress.finish_with_message("done");

    for failure in report.failures() {
        if let Err(err) = &failure.result {
            error!("{}: {err}", failure.item);
        }
    }
    Ok(report.is_success())
}
