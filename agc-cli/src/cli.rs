use std::path::PathBuf;

use agc::chimera::{DEFAULT_CHUNK_SIZE, DEFAULT_KMER_SIZE};
use agc::clustering::ClusteringMode;
use agc::pipeline::DEFAULT_MIN_COUNT;
use agc::source::DEFAULT_MIN_SEQUENCE_LENGTH;
use clap::{Parser, PossibleValue, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use lazy_static::lazy_static;

use crate::opts::{amplicon_file, identity_threshold, AmpliconFile};

/// Abundance greedy clustering of amplicon reads into OTUs
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: Verbosity<InfoLevel>,

    /// Don't display a progress bar/spinner
    #[clap(long, value_parser)]
    pub no_progress: bool,

    /// Amplicon file in FASTA format, optionally compressed with gzip
    #[clap(short = 'i', long = "amplicon_file", value_parser = amplicon_file)]
    pub amplicon_file: AmpliconFile,

    /// Minimum sequence length for dereplication
    #[clap(short = 's', long = "minseqlen", default_value_t = DEFAULT_MIN_SEQUENCE_LENGTH, value_parser)]
    pub min_seq_len: usize,

    /// Minimum count for dereplication; only sequences occurring more often
    /// are clustered
    #[clap(short = 'm', long = "mincount", default_value_t = DEFAULT_MIN_COUNT, value_parser)]
    pub min_count: usize,

    /// Chunk size for chimera detection
    #[clap(short = 'c', long = "chunk_size", default_value_t = DEFAULT_CHUNK_SIZE, value_parser)]
    pub chunk_size: usize,

    /// K-mer size for chimera detection
    #[clap(short = 'k', long = "kmer_size", default_value_t = DEFAULT_KMER_SIZE, value_parser)]
    pub kmer_size: usize,

    /// Output file with the OTUs in FASTA format
    #[clap(short = 'o', long = "output_file", default_value = "OTU.fasta", value_parser)]
    pub output_file: PathBuf,

    /// Identity threshold (in percent) used to decide whether two sequences
    /// belong to the same OTU
    #[clap(long, default_value_t = agc::clustering::DEFAULT_IDENTITY_THRESHOLD, value_parser = identity_threshold)]
    pub identity: f64,

    /// Clustering rule
    #[clap(long, arg_enum, default_value = "legacy")]
    pub mode: ClusteringModeCli,

    /// Substitution matrix file in NCBI format [default: bundled NUC.4.4]
    #[clap(long, value_parser)]
    pub matrix: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug)]
pub struct ClusteringModeCli {
    pub inner: ClusteringMode,
}

impl ClusteringModeCli {
    #[must_use]
    pub fn new(inner: ClusteringMode) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn variants() -> Vec<Self> {
        ClusteringMode::VALUES
            .iter()
            .map(|&inner| ClusteringModeCli::new(inner))
            .collect()
    }
}

lazy_static! {
    static ref CLUSTERING_MODE_CLI_VARIANTS: Vec<ClusteringModeCli> = ClusteringModeCli::variants();
}

impl ValueEnum for ClusteringModeCli {
    fn value_variants<'a>() -> &'a [Self] {
        &CLUSTERING_MODE_CLI_VARIANTS
    }

    fn to_possible_value<'a>(&self) -> Option<PossibleValue<'a>> {
        let value = PossibleValue::new(self.inner.name());
        Some(value)
    }
}

impl From<ClusteringModeCli> for ClusteringMode {
    fn from(mode: ClusteringModeCli) -> Self {
        mode.inner
    }
}
