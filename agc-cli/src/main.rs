#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use agc::align::MatrixAligner;
use agc::pipeline::{Pipeline, PipelineParams};
use anyhow::Context;
use clap::Parser;
use cli::Cli;
use human_panic::setup_panic;
use lazy_static::lazy_static;

use crate::logging::init_logging;
use crate::opts::load_matrix;
use crate::progress_bar::AgcProgressBar;

mod cli;
mod logging;
mod opts;
mod progress_bar;

lazy_static! {
    pub(crate) static ref PROGRESS_BAR: AgcProgressBar = AgcProgressBar::new();
}

fn main() -> anyhow::Result<()> {
    setup_panic!();

    let cli: Cli = Cli::parse();

    if !cli.no_progress {
        PROGRESS_BAR.show();
    }

    init_logging(cli.verbose.log_level_filter()).expect("Could not initialize logging");

    let matrix = load_matrix(cli.matrix.as_deref())?;

    let params = PipelineParams::builder()
        .min_sequence_length(cli.min_seq_len)
        .min_count(cli.min_count)
        .chunk_size(cli.chunk_size)
        .kmer_size(cli.kmer_size)
        .identity_threshold(cli.identity)
        .mode(cli.mode.into())
        .progress_notifier(Arc::new(PROGRESS_BAR.clone()))
        .build();
    let mut pipeline = Pipeline::with_params(MatrixAligner::new(matrix), params);

    pipeline
        .run_files(cli.amplicon_file.path(), &cli.output_file)
        .with_context(|| format!("Failed to cluster {}", cli.amplicon_file))?;

    PROGRESS_BAR.finish();
    Ok(())
}
