use std::fmt::{Display, Formatter};
use std::sync::Arc;

use log::{debug, info, trace};

use crate::align::{AlignmentResult, GlobalAligner};
use crate::dereplication::DereplicatedRecord;
use crate::identity::percent_identity;
use crate::progress::{DummyProgressNotifier, ProgressNotifier, ProgressStage};
use crate::sequence::Sequence;

/// Default identity threshold, in percent.
pub const DEFAULT_IDENTITY_THRESHOLD: f64 = 97.0;

/// Operational Taxonomic Unit: representative sequence of a cluster along
/// with the dereplicated count of that sequence.
///
/// The occurrence is never the sum of the cluster member counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Otu {
    sequence: Sequence,
    occurrence: usize,
}

impl Otu {
    #[must_use]
    pub fn new<T: Into<Sequence>>(sequence: T, occurrence: usize) -> Self {
        Self {
            sequence: sequence.into(),
            occurrence,
        }
    }

    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub fn occurrence(&self) -> usize {
        self.occurrence
    }
}

impl From<&DereplicatedRecord> for Otu {
    fn from(record: &DereplicatedRecord) -> Self {
        Self::new(record.sequence().clone(), record.count())
    }
}

/// Rule used to decide which records become OTUs.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ClusteringMode {
    /// Every record is aligned against every record of the run (itself
    /// included); one OTU carrying the outer record is emitted for each pair
    /// with identity lower than or equal to the threshold. The same record can
    /// therefore be emitted many times, or not at all.
    #[default]
    Legacy,
    /// Greedy abundance clustering: each record is compared against the
    /// representatives accepted so far and absorbed by the first one it is
    /// more than threshold-identical to; otherwise it becomes a new
    /// representative.
    Greedy,
}

impl ClusteringMode {
    pub const VALUES: [ClusteringMode; 2] = [ClusteringMode::Legacy, ClusteringMode::Greedy];

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            ClusteringMode::Legacy => "legacy",
            ClusteringMode::Greedy => "greedy",
        }
    }
}

impl Display for ClusteringMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone)]
pub struct ClusteringParams {
    identity_threshold: f64,
    mode: ClusteringMode,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl ClusteringParams {
    #[must_use]
    pub fn builder() -> ClusteringParamsBuilder {
        ClusteringParamsBuilder::new()
    }

    #[must_use]
    pub fn identity_threshold(&self) -> f64 {
        self.identity_threshold
    }

    #[must_use]
    pub fn mode(&self) -> ClusteringMode {
        self.mode
    }
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Debug, Clone)]
pub struct ClusteringParamsBuilder {
    identity_threshold: f64,
    mode: ClusteringMode,
    progress_notifier: Arc<dyn ProgressNotifier>,
}

impl ClusteringParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            identity_threshold: DEFAULT_IDENTITY_THRESHOLD,
            mode: ClusteringMode::default(),
            progress_notifier: Arc::new(DummyProgressNotifier),
        }
    }

    /// Sets the identity threshold, in percent.
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
    pub fn build(&self) -> ClusteringParams {
        ClusteringParams {
            identity_threshold: self.identity_threshold,
            mode: self.mode,
            progress_notifier: self.progress_notifier.clone(),
        }
    }
}

impl Default for ClusteringParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Abundance-ordered clustering of dereplicated records into OTUs.
#[derive(Debug)]
pub struct Clustering<A> {
    aligner: A,
    params: ClusteringParams,
}

impl<A: GlobalAligner> Clustering<A> {
    #[must_use]
    pub fn new(aligner: A) -> Self {
        Self::with_params(aligner, ClusteringParams::default())
    }

    #[must_use]
    pub fn with_params(aligner: A, params: ClusteringParams) -> Self {
        Self { aligner, params }
    }

    /// Clusters `records`, which are expected to be sorted by abundance (as
    /// returned by [`dereplicate`](crate::dereplication::dereplicate)).
    ///
    /// # Errors
    /// Any alignment error aborts the clustering.
    pub fn cluster(&mut self, records: &[DereplicatedRecord]) -> AlignmentResult<Vec<Otu>> {
        info!(
            "Clustering {} records (mode: {}, identity threshold: {}%)",
            records.len(),
            self.params.mode,
            self.params.identity_threshold
        );
        self.params
            .progress_notifier
            .start_stage(ProgressStage::Clustering, Some(records.len() as u64));

        let otus = match self.params.mode {
            ClusteringMode::Legacy => self.cluster_legacy(records)?,
            ClusteringMode::Greedy => self.cluster_greedy(records)?,
        };

        info!("Clustering done: {} OTUs", otus.len());
        Ok(otus)
    }

    fn cluster_legacy(&mut self, records: &[DereplicatedRecord]) -> AlignmentResult<Vec<Otu>> {
        let mut otus = Vec::new();

        for record in records {
            for other in records {
                let identity = self.identity(record.sequence(), other.sequence())?;
                if identity <= self.params.identity_threshold {
                    otus.push(Otu::from(record));
                }
            }

            self.params.progress_notifier.inc_iter();
        }

        Ok(otus)
    }

    fn cluster_greedy(&mut self, records: &[DereplicatedRecord]) -> AlignmentResult<Vec<Otu>> {
        let mut otus: Vec<Otu> = Vec::new();

        for record in records {
            let mut absorbed = false;
            for (index, otu) in otus.iter().enumerate() {
                let identity = self.identity(otu.sequence(), record.sequence())?;
                if identity > self.params.identity_threshold {
                    debug!(
                        "Record (count {}) absorbed into OTU #{} ({:.2}% identity)",
                        record.count(),
                        index + 1,
                        identity
                    );
                    absorbed = true;
                    break;
                }
            }

            if !absorbed {
                otus.push(Otu::from(record));
            }
            self.params.progress_notifier.inc_iter();
        }

        Ok(otus)
    }

    fn identity(&mut self, first: &Sequence, second: &Sequence) -> AlignmentResult<f64> {
        let alignment = self.aligner.align(first, second)?;
        let identity = percent_identity(&alignment)?;
        trace!("Identity {:.2}% for pair:\n{}\n{}", identity, first, second);

        Ok(identity)
    }
}

/// Clusters `records` into OTUs using given aligner.
pub fn cluster<A: GlobalAligner>(
    records: &[DereplicatedRecord],
    aligner: A,
    params: ClusteringParams,
) -> AlignmentResult<Vec<Otu>> {
    Clustering::with_params(aligner, params).cluster(records)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use crate::_internal_test_data::MATCH_MATRIX;
    use crate::align::{Alignment, AlignmentError, AlignmentResult, MatrixAligner};
    use crate::clustering::{cluster, Clustering, ClusteringMode, ClusteringParams, Otu};
    use crate::dereplication::DereplicatedRecord;
    use crate::progress::tests::RecordingNotifier;
    use crate::progress::ProgressStage;
    use crate::sequence::Sequence;

    /// Aligner returning a fixed identity for each unordered pair of sequences
    /// (100% for a sequence against itself).
    fn fixed_aligner(
        identities: &[(&str, &str, usize)],
    ) -> impl FnMut(&Sequence, &Sequence) -> AlignmentResult<Alignment> {
        let identities: HashMap<(String, String), usize> = identities
            .iter()
            .flat_map(|&(a, b, identity)| {
                [
                    ((a.to_owned(), b.to_owned()), identity),
                    ((b.to_owned(), a.to_owned()), identity),
                ]
            })
            .collect();

        move |first: &Sequence, second: &Sequence| {
            let identity = if first == second {
                100
            } else {
                identities[&(first.to_string(), second.to_string())]
            };

            // Alignment of length 100 with `identity` matching columns
            let first_row = "A".repeat(100);
            let second_row = "A".repeat(identity) + &"-".repeat(100 - identity);
            Ok(Alignment::new(first_row, second_row))
        }
    }

    fn records() -> Vec<DereplicatedRecord> {
        vec![
            DereplicatedRecord::new("AAAA", 12),
            DereplicatedRecord::new("AAAT", 11),
        ]
    }

    #[test_log::test]
    fn test_legacy_keeps_distinct_pairs() {
        let aligner = fixed_aligner(&[("AAAA", "AAAT", 60)]);
        let otus = cluster(&records(), aligner, ClusteringParams::default()).unwrap();

        assert_eq!(otus, [Otu::new("AAAA", 12), Otu::new("AAAT", 11)]);
    }

    #[test_log::test]
    fn test_legacy_identical_pair_is_not_emitted() {
        let aligner = fixed_aligner(&[("AAAA", "AAAT", 100)]);
        let otus = cluster(&records(), aligner, ClusteringParams::default()).unwrap();

        assert!(otus.is_empty());
    }

    #[test_log::test]
    fn test_legacy_emits_once_per_qualifying_pair() {
        let records = vec![
            DereplicatedRecord::new("A", 30),
            DereplicatedRecord::new("C", 20),
            DereplicatedRecord::new("G", 10),
        ];
        let aligner = fixed_aligner(&[("A", "C", 50), ("A", "G", 97), ("C", "G", 98)]);
        let otus = cluster(&records, aligner, ClusteringParams::default()).unwrap();

        assert_eq!(
            otus,
            [
                Otu::new("A", 30),
                Otu::new("A", 30),
                Otu::new("C", 20),
                Otu::new("G", 10),
            ]
        );
    }

    #[test_log::test]
    fn test_legacy_threshold_is_inclusive() {
        let params = ClusteringParams::builder().identity_threshold(60.0).build();
        let aligner = fixed_aligner(&[("AAAA", "AAAT", 60)]);
        let otus = cluster(&records(), aligner, params).unwrap();

        assert_eq!(otus.len(), 2);
    }

    #[test_log::test]
    fn test_greedy_absorbs_identical_pair() {
        let params = ClusteringParams::builder()
            .mode(ClusteringMode::Greedy)
            .build();
        let aligner = fixed_aligner(&[("AAAA", "AAAT", 100)]);
        let otus = cluster(&records(), aligner, params).unwrap();

        assert_eq!(otus, [Otu::new("AAAA", 12)]);
    }

    #[test_log::test]
    fn test_greedy_keeps_distinct_pair() {
        let params = ClusteringParams::builder()
            .mode(ClusteringMode::Greedy)
            .build();
        let aligner = fixed_aligner(&[("AAAA", "AAAT", 97)]);
        let otus = cluster(&records(), aligner, params).unwrap();

        assert_eq!(otus, [Otu::new("AAAA", 12), Otu::new("AAAT", 11)]);
    }

    #[test_log::test]
    fn test_greedy_compares_against_representatives_only() {
        let records = vec![
            DereplicatedRecord::new("A", 30),
            DereplicatedRecord::new("C", 20),
            DereplicatedRecord::new("G", 10),
        ];
        // G is close to C, but C has already been absorbed into A
        let aligner = fixed_aligner(&[("A", "C", 99), ("A", "G", 90), ("C", "G", 99)]);
        let params = ClusteringParams::builder()
            .mode(ClusteringMode::Greedy)
            .build();
        let otus = cluster(&records, aligner, params).unwrap();

        assert_eq!(otus, [Otu::new("A", 30), Otu::new("G", 10)]);
    }

    #[test_log::test]
    fn test_empty_records() {
        for mode in ClusteringMode::VALUES {
            let params = ClusteringParams::builder().mode(mode).build();
            let aligner = fixed_aligner(&[]);
            let otus = cluster(&[], aligner, params).unwrap();

            assert!(otus.is_empty());
        }
    }

    #[test_log::test]
    fn test_alignment_failure_is_propagated() {
        let aligner = |_: &Sequence, _: &Sequence| -> AlignmentResult<Alignment> {
            Err(AlignmentError::AlignmentFailure("failure".to_owned()))
        };
        let error = cluster(&records(), aligner, ClusteringParams::default()).unwrap_err();

        assert_eq!(error, AlignmentError::AlignmentFailure("failure".to_owned()));
    }

    #[test_log::test]
    fn test_invalid_alignment_is_propagated() {
        let aligner = |_: &Sequence, _: &Sequence| -> AlignmentResult<Alignment> {
            Ok(Alignment::new("AAA", "AA"))
        };
        let error = cluster(&records(), aligner, ClusteringParams::default()).unwrap_err();

        assert_eq!(error, AlignmentError::InvalidAlignment(3, 2));
    }

    #[test_log::test]
    fn test_legacy_with_matrix_aligner() {
        let mut clustering = Clustering::new(MatrixAligner::new(MATCH_MATRIX.clone()));
        let otus = clustering.cluster(&records()).unwrap();

        assert_eq!(otus, [Otu::new("AAAA", 12), Otu::new("AAAT", 11)]);
    }

    #[test_log::test]
    fn test_greedy_with_matrix_aligner() {
        let sequence = "ACGT".repeat(25);
        let mut variant = sequence.clone();
        variant.replace_range(50..51, "T");
        let distinct = "TTGCA".repeat(20);

        let records = vec![
            DereplicatedRecord::new(sequence.as_str(), 12),
            DereplicatedRecord::new(variant, 11),
            DereplicatedRecord::new(distinct.as_str(), 10),
        ];
        let params = ClusteringParams::builder()
            .mode(ClusteringMode::Greedy)
            .build();
        let mut clustering =
            Clustering::with_params(MatrixAligner::new(MATCH_MATRIX.clone()), params);
        let otus = clustering.cluster(&records).unwrap();

        assert_eq!(
            otus,
            [Otu::new(sequence, 12), Otu::new(distinct, 10)]
        );
    }

    #[test_log::test]
    fn test_progress_one_iteration_per_record() {
        let notifier = Arc::new(RecordingNotifier::default());
        let records = vec![
            DereplicatedRecord::new("A", 30),
            DereplicatedRecord::new("C", 20),
            DereplicatedRecord::new("G", 10),
        ];
        let aligner = fixed_aligner(&[("A", "C", 99), ("A", "G", 90), ("C", "G", 99)]);
        let params = ClusteringParams::builder()
            .mode(ClusteringMode::Greedy)
            .progress_notifier(notifier.clone())
            .build();

        cluster(&records, aligner, params).unwrap();

        assert_eq!(
            notifier.stages(),
            [(ProgressStage::Clustering, Some(3), 3)]
        );
    }
}
