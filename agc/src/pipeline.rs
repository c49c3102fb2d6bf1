use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use log::info;
use tempfile::NamedTempFile;

use crate::align::{AlignmentError, GlobalAligner};
use crate::chimera::{ChimeraFilter, ChimeraParams, NoChimeraFilter};
use crate::clustering::{
    Clustering, ClusteringMode, ClusteringParams, Otu, DEFAULT_IDENTITY_THRESHOLD,
};
use crate::dereplication::{DereplicatedRecord, Dereplicator};
use crate::fasta::reader::FastaReaderError;
use crate::fasta::writer::{FastaWriter, FastaWriterError};
use crate::progress::{DummyProgressNotifier, ProgressNotifier, ProgressStage};
use crate::source::{self, AmpliconSource, DEFAULT_MIN_SEQUENCE_LENGTH};

pub const DEFAULT_MIN_COUNT: usize = 10;

/// Error aborting a clustering run.
#[derive(Debug)]
pub enum PipelineError {
    /// The input file does not exist.
    InputNotFound(PathBuf),
    /// The input path points to a directory.
    InputIsDirectory(PathBuf),
    /// The input could not be read or decoded.
    ReadError(FastaReaderError),
    /// Sequences could not be aligned.
    AlignmentError(AlignmentError),
    /// The output could not be written.
    WriteError(FastaWriterError),
}

impl From<FastaReaderError> for PipelineError {
    fn from(e: FastaReaderError) -> Self {
        Self::ReadError(e)
    }
}

impl From<AlignmentError> for PipelineError {
    fn from(e: AlignmentError) -> Self {
        Self::AlignmentError(e)
    }
}

impl From<FastaWriterError> for PipelineError {
    fn from(e: FastaWriterError) -> Self {
        Self::WriteError(e)
    }
}

impl Display for PipelineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::InputNotFound(path) => {
                write!(f, "{} does not exist", path.display())
            }
            PipelineError::InputIsDirectory(path) => {
                write!(f, "{} is a directory", path.display())
            }
            PipelineError::ReadError(e) => write!(f, "Could not read the sequences: {}", e),
            PipelineError::AlignmentError(e) => write!(f, "Could not cluster the sequences: {}", e),
            PipelineError::WriteError(e) => write!(f, "Could not write the OTUs: {}", e),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::ReadError(e) => Some(e),
            PipelineError::AlignmentError(e) => Some(e),
            PipelineError::WriteError(e) => Some(e),
            _ => None,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone)]
pub struct PipelineParams {
    min_sequence_length: usize,
    min_count: usize,
    chimera: ChimeraParams,
    identity_threshold: f64,
    mode: ClusteringMode,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl PipelineParams {
    #[must_use]
    pub fn builder() -> PipelineParamsBuilder {
        PipelineParamsBuilder::new()
    }

    #[must_use]
    pub fn min_sequence_length(&self) -> usize {
        self.min_sequence_length
    }

    #[must_use]
    pub fn min_count(&self) -> usize {
        self.min_count
    }

    fn clustering_params(&self) -> ClusteringParams {
        ClusteringParams::builder()
            .identity_threshold(self.identity_threshold)
            .mode(self.mode)
            .progress_notifier(self.progress_notifier.clone())
            .build()
    }
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineParamsBuilder {
    min_sequence_length: usize,
    min_count: usize,
    chimera: ChimeraParams,
    identity_threshold: f64,
    mode: ClusteringMode,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl PipelineParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_sequence_length: DEFAULT_MIN_SEQUENCE_LENGTH,
            min_count: DEFAULT_MIN_COUNT,
            chimera: ChimeraParams::default(),
            identity_threshold: DEFAULT_IDENTITY_THRESHOLD,
            mode: ClusteringMode::default(),
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Sets the minimum length of a sequence to be taken into account.
    pub fn min_sequence_length(&mut self, min_sequence_length: usize) -> &mut Self {
        let mut new = self;
        new.min_sequence_length = min_sequence_length;
        new
    }

    /// Sets the count a sequence has to exceed to be clustered.
    pub fn min_count(&mut self, min_count: usize) -> &mut Self {
        let mut new = self;
        new.min_count = min_count;
        new
    }

    pub fn chunk_size(&mut self, chunk_size: usize) -> &mut Self {
        let mut new = self;
        new.chimera.chunk_size = chunk_size;
        new
    }

    pub fn kmer_size(&mut self, kmer_size: usize) -> &mut Self {
        let mut new = self;
        new.chimera.kmer_size = kmer_size;
        new
    }

    /// Sets the identity threshold of the clustering, in percent.
    ///
    /// # Panics
    /// This function panics if the threshold is not within `0..=100`.
    pub fn identity_threshold(&mut self, identity_threshold: f64) -> &mut Self {
        assert!(
            (0.0..=100.0).contains(&identity_threshold),
            "Identity threshold must be within 0..=100"
        );

        let mut new = self;
        new.identity_threshold = identity_threshold;
        new
    }

    pub fn mode(&mut self, mode: ClusteringMode) -> &mut Self {
        let mut new = self;
        new.mode = mode;
        new
    }

    pub fn progress_notifier(&mut self, progress_notifier: Arc<dyn ProgressNotifier>) -> &mut Self {
        let mut new = self;
        new.progress_notifier = progress_notifier;
        new
    }

    #[must_use]
    pub fn build(&self) -> PipelineParams {
        PipelineParams {
            min_sequence_length: self.min_sequence_length,
            min_count: self.min_count,
            chimera: self.chimera,
            identity_threshold: self.identity_threshold,
            mode: self.mode,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for PipelineParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Whole clustering run: source, dereplication, chimera removal, clustering
/// and writing the OTUs.
#[derive(Debug)]
pub struct Pipeline<A, F = NoChimeraFilter> {
    clustering: Clustering<A>,
    chimera_filter: F,
    params: PipelineParams,
}

impl<A: GlobalAligner> Pipeline<A> {
    #[must_use]
    pub fn new(aligner: A) -> Self {
        Self::with_params(aligner, PipelineParams::default())
    }

    #[must_use]
    pub fn with_params(aligner: A, params: PipelineParams) -> Self {
        Self {
            clustering: Clustering::with_params(aligner, params.clustering_params()),
            chimera_filter: NoChimeraFilter,
            params,
        }
    }
}

impl<A: GlobalAligner, F: ChimeraFilter> Pipeline<A, F> {
    /// Replaces the chimera removal stage.
    #[must_use]
    pub fn with_chimera_filter<G: ChimeraFilter>(self, chimera_filter: G) -> Pipeline<A, G> {
        Pipeline {
            clustering: self.clustering,
            chimera_filter,
            params: self.params,
        }
    }

    /// Reads the (decompressed) FASTA stream and returns the dereplicated
    /// records that pass the length and count filters.
    pub fn dereplicate<R: BufRead>(&self, reader: R) -> PipelineResult<Vec<DereplicatedRecord>> {
        let progress_notifier = &self.params.progress_notifier;
        progress_notifier.start_stage(ProgressStage::Reading, None);

        let mut dereplicator = Dereplicator::new();
        for sequence in AmpliconSource::new(reader, self.params.min_sequence_length) {
            dereplicator.add_sequence(sequence?);
            progress_notifier.inc_iter();
        }

        info!(
            "Read {} sequences of length >= {} ({} unique)",
            dereplicator.total(),
            self.params.min_sequence_length,
            dereplicator.unique()
        );
        let records = dereplicator.finish(self.params.min_count);
        info!(
            "{} unique sequences occur more than {} times",
            records.len(),
            self.params.min_count
        );

        Ok(records)
    }

    /// Computes the OTUs of given (decompressed) FASTA stream.
    pub fn otus<R: BufRead>(&mut self, reader: R) -> PipelineResult<Vec<Otu>> {
        let records = self.dereplicate(reader)?;
        let records = self
            .chimera_filter
            .filter_chimeras(records, &self.params.chimera);
        let otus = self.clustering.cluster(&records)?;

        Ok(otus)
    }

    /// Computes the OTUs of given (decompressed) FASTA stream and writes them
    /// to `writer`. Returns the number of OTUs written.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, writer: W) -> PipelineResult<usize> {
        let otus = self.otus(reader)?;

        let mut fasta_writer = FastaWriter::new(BufWriter::new(writer));
        fasta_writer.write_otus(&otus)?;
        fasta_writer.flush()?;

        Ok(otus.len())
    }

    /// Clusters the amplicon file at `input` (gzip-compressed or not) and
    /// writes the OTUs to `output`.
    ///
    /// The output file is created only once all the OTUs have been computed
    /// and written; a failed run leaves any existing file at `output`
    /// untouched. Returns the number of OTUs written.
    pub fn run_files(&mut self, input: &Path, output: &Path) -> PipelineResult<usize> {
        let start_time = Instant::now();
        check_input_path(input)?;
        info!("Input file: {}", input.display());

        let reader = source::open(input).map_err(FastaReaderError::from)?;
        let otus = self.otus(reader)?;

        info!("Output file: {}", output.display());
        write_otus_atomically(&otus, output)?;

        info!(
            "Wrote {} OTUs in {:.2}s",
            otus.len(),
            start_time.elapsed().as_secs_f32()
        );
        Ok(otus.len())
    }
}

fn check_input_path(path: &Path) -> PipelineResult<()> {
    if path.is_dir() {
        return Err(PipelineError::InputIsDirectory(path.to_owned()));
    }
    if !path.is_file() {
        return Err(PipelineError::InputNotFound(path.to_owned()));
    }

    Ok(())
}

/// Creates the temporary output file in `directory`, readable by everyone
/// (subject to the umask) like a file created directly would be.
fn output_tempfile(directory: &Path) -> std::io::Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".OTU").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    builder.tempfile_in(directory)
}

fn write_otus_atomically(otus: &[Otu], output: &Path) -> PipelineResult<()> {
    let directory = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let file = output_tempfile(directory).map_err(FastaWriterError::from)?;
    let mut fasta_writer = FastaWriter::new(BufWriter::new(file));
    fasta_writer.write_otus(otus)?;
    fasta_writer.flush()?;

    let file = fasta_writer
        .into_inner()
        .into_inner()
        .map_err(|e| FastaWriterError::from(e.into_error()))?;
    file.persist(output)
        .map_err(|e| FastaWriterError::from(e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Arc;

    use crate::_internal_test_data::MATCH_MATRIX;
    use crate::align::{AlignmentError, MatrixAligner};
    use crate::chimera::ChimeraParams;
    use crate::clustering::ClusteringMode;
    use crate::dereplication::DereplicatedRecord;
    use crate::pipeline::{Pipeline, PipelineError, PipelineParams};
    use crate::progress::tests::RecordingNotifier;
    use crate::progress::ProgressStage;

    const READS: &str = ">r1\nAAAA\n>r2\nAAAA\n>r3\nAAAT\n>r4\nAAAA\n>r5\nAAAT\n>r6\nCCCC\n>r7\nAC\n";

    fn pipeline(mode: ClusteringMode) -> Pipeline<MatrixAligner> {
        let params = PipelineParams::builder()
            .min_sequence_length(4)
            .min_count(1)
            .mode(mode)
            .build();
        Pipeline::with_params(MatrixAligner::new(MATCH_MATRIX.clone()), params)
    }

    #[test_log::test]
    fn test_dereplicate() {
        let records = pipeline(ClusteringMode::Legacy)
            .dereplicate(READS.as_bytes())
            .unwrap();

        assert_eq!(
            records,
            [
                DereplicatedRecord::new("AAAA", 3),
                DereplicatedRecord::new("AAAT", 2)
            ]
        );
    }

    #[test_log::test]
    fn test_run_legacy() {
        let mut output = Vec::new();
        let num = pipeline(ClusteringMode::Legacy)
            .run(READS.as_bytes(), &mut output)
            .unwrap();

        assert_eq!(num, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            ">OTU_1 occurrence:3\nAAAA\n>OTU_2 occurrence:2\nAAAT\n"
        );
    }

    #[test_log::test]
    fn test_run_empty_input() {
        let mut output = Vec::new();
        let num = pipeline(ClusteringMode::Greedy)
            .run("".as_bytes(), &mut output)
            .unwrap();

        assert_eq!(num, 0);
        assert!(output.is_empty());
    }

    #[test_log::test]
    fn test_chimera_filter_is_applied() {
        let filter = |records: Vec<DereplicatedRecord>, _: &ChimeraParams| {
            records.into_iter().take(1).collect::<Vec<_>>()
        };
        let otus = pipeline(ClusteringMode::Greedy)
            .with_chimera_filter(filter)
            .otus(READS.as_bytes())
            .unwrap();

        assert_eq!(otus.len(), 1);
        assert_eq!(otus[0].sequence().as_str(), "AAAA");
    }

    #[test_log::test]
    fn test_alignment_failure_aborts() {
        let params = PipelineParams::builder()
            .min_sequence_length(1)
            .min_count(0)
            .build();
        let mut pipeline = Pipeline::with_params(MatrixAligner::new(MATCH_MATRIX.clone()), params);

        let error = pipeline.otus(">a\nAXA\n".as_bytes()).unwrap_err();

        assert!(matches!(
            error,
            PipelineError::AlignmentError(AlignmentError::AlignmentFailure(_))
        ));
    }

    #[test_log::test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.fasta.gz");
        let output = dir.path().join("OTU.fasta");

        let error = pipeline(ClusteringMode::Legacy)
            .run_files(&input, &output)
            .unwrap_err();

        assert!(matches!(error, PipelineError::InputNotFound(ref path) if *path == input));
        assert!(!output.exists());
    }

    #[test_log::test]
    fn test_input_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("OTU.fasta");

        let error = pipeline(ClusteringMode::Legacy)
            .run_files(dir.path(), &output)
            .unwrap_err();

        assert!(matches!(error, PipelineError::InputIsDirectory(_)));
        assert_eq!(
            format!("{}", error),
            format!("{} is a directory", dir.path().display())
        );
    }

    #[test_log::test]
    fn test_failed_run_keeps_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fasta");
        let output = dir.path().join("OTU.fasta");
        fs::write(&input, ">a\nAXAA\n>b\nAXAA\n").unwrap();
        fs::write(&output, "previous").unwrap();

        let result = pipeline(ClusteringMode::Legacy).run_files(&input, &output);

        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test_log::test]
    fn test_progress_stages() {
        let notifier = Arc::new(RecordingNotifier::default());
        let params = PipelineParams::builder()
            .min_sequence_length(4)
            .min_count(1)
            .mode(ClusteringMode::Greedy)
            .progress_notifier(notifier.clone())
            .build();
        let mut pipeline = Pipeline::with_params(MatrixAligner::new(MATCH_MATRIX.clone()), params);

        pipeline.otus(READS.as_bytes()).unwrap();

        assert_eq!(
            notifier.stages(),
            [
                (ProgressStage::Reading, None, 6),
                (ProgressStage::Clustering, Some(2), 2),
            ]
        );
    }

    #[cfg(unix)]
    #[test_log::test]
    fn test_output_file_mode_matches_regular_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fasta");
        let output = dir.path().join("OTU.fasta");
        let regular = dir.path().join("regular.fasta");
        fs::write(&input, READS).unwrap();
        fs::write(&regular, "").unwrap();

        pipeline(ClusteringMode::Greedy)
            .run_files(&input, &output)
            .unwrap();

        let mode = |path: &std::path::Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(output.as_path()), mode(regular.as_path()));
    }
}
