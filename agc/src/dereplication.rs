use std::collections::HashMap;

use crate::sequence::Sequence;

/// Unique sequence along with the number of times it occurred in the input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DereplicatedRecord {
    sequence: Sequence,
    count: usize,
}

impl DereplicatedRecord {
    #[must_use]
    pub fn new<T: Into<Sequence>>(sequence: T, count: usize) -> Self {
        Self {
            sequence: sequence.into(),
            count,
        }
    }

    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Counts exact duplicates in a stream of sequences.
///
/// # Examples
/// ```
/// use agc::dereplication::{DereplicatedRecord, Dereplicator};
/// use agc::sequence::Sequence;
///
/// let mut dereplicator = Dereplicator::new();
/// dereplicator.add_sequence(Sequence::new("ACGT"));
/// dereplicator.add_sequence(Sequence::new("TTTT"));
/// dereplicator.add_sequence(Sequence::new("ACGT"));
///
/// assert_eq!(
///     dereplicator.finish(1),
///     [DereplicatedRecord::new("ACGT", 2)]
/// );
/// ```
#[derive(Debug, Default)]
pub struct Dereplicator {
    indices: HashMap<Sequence, usize>,
    records: Vec<DereplicatedRecord>,
    total: usize,
}

impl Dereplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sequence(&mut self, sequence: Sequence) {
        self.total += 1;

        if let Some(&index) = self.indices.get(&sequence) {
            self.records[index].count += 1;
        } else {
            self.indices.insert(sequence.clone(), self.records.len());
            self.records.push(DereplicatedRecord::new(sequence, 1));
        }
    }

    /// Number of sequences added so far.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct sequences added so far.
    #[must_use]
    pub fn unique(&self) -> usize {
        self.records.len()
    }

    /// Returns the records seen strictly more than `min_count` times, sorted
    /// by count in descending order. Records with equal counts keep the order
    /// in which their sequences were first seen.
    #[must_use]
    pub fn finish(self, min_count: usize) -> Vec<DereplicatedRecord> {
        let mut records: Vec<_> = self
            .records
            .into_iter()
            .filter(|record| record.count > min_count)
            .collect();
        records.sort_by(|a, b| b.count.cmp(&a.count));

        records
    }
}

/// Counts exact duplicates in `sequences` and returns the ones occurring
/// strictly more than `min_count` times, most abundant first.
#[must_use]
pub fn dereplicate<I>(sequences: I, min_count: usize) -> Vec<DereplicatedRecord>
where
    I: IntoIterator<Item = Sequence>,
{
    let mut dereplicator = Dereplicator::new();
    for sequence in sequences {
        dereplicator.add_sequence(sequence);
    }

    dereplicator.finish(min_count)
}
