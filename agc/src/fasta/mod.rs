//! FASTA format reading and writing.

use crate::sequence::Sequence;

pub mod reader;
pub mod writer;

/// Character starting every FASTA title line.
pub const FASTA_TITLE_PREFIX: char = '>';
/// Default maximum number of sequence characters per output line.
pub const FASTA_LINE_WIDTH: usize = 80;

/// Prefix of the OTU identifiers in the output titles.
pub const OTU_TITLE_PREFIX: &str = "OTU_";
/// Key of the occurrence count in the output titles.
pub const OTU_OCCURRENCE_KEY: &str = "occurrence:";

/// Single FASTA record: title line (without the `>` prefix) and the sequence
/// assembled from all the lines following it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FastaRecord {
    title: String,
    sequence: Sequence,
}

impl FastaRecord {
    #[must_use]
    pub fn new<T, U>(title: T, sequence: U) -> Self
    where
        T: Into<String>,
        U: Into<Sequence>,
    {
        Self {
            title: title.into(),
            sequence: sequence.into(),
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    #[must_use]
    pub fn into_sequence(self) -> Sequence {
        self.sequence
    }
}

/// Returns the title of the OTU with given 1-based index.
///
/// # Examples
/// ```
/// use agc::fasta::otu_title;
///
/// assert_eq!(otu_title(1, 12), "OTU_1 occurrence:12");
/// ```
#[must_use]
pub fn otu_title(index: usize, occurrence: usize) -> String {
    format!(
        "{}{} {}{}",
        OTU_TITLE_PREFIX, index, OTU_OCCURRENCE_KEY, occurrence
    )
}

/// Parses a title written by [`otu_title`] back into the OTU index and its
/// occurrence count.
///
/// # Examples
/// ```
/// use agc::fasta::parse_otu_title;
///
/// assert_eq!(parse_otu_title("OTU_3 occurrence:42"), Some((3, 42)));
/// assert_eq!(parse_otu_title("read_1"), None);
/// ```
#[must_use]
pub fn parse_otu_title(title: &str) -> Option<(usize, usize)> {
    let (id, occurrence) = title.trim().split_once(' ')?;
    let index = id.strip_prefix(OTU_TITLE_PREFIX)?.parse().ok()?;
    let occurrence = occurrence
        .trim()
        .strip_prefix(OTU_OCCURRENCE_KEY)?
        .parse()
        .ok()?;

    Some((index, occurrence))
}
