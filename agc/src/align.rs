//! Global pairwise alignment of two sequences.

use std::error::Error;
use std::fmt::{Display, Formatter};

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;

use crate::matrix::SubstitutionMatrix;
use crate::sequence::Sequence;

/// Character used to represent a gap in an [`Alignment`].
pub const GAP: char = '-';

/// Error occurring when aligning sequences or processing an alignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    /// Both rows of an alignment must have the same, non-zero length.
    InvalidAlignment(usize, usize),
    /// The aligner could not align given pair of sequences.
    AlignmentFailure(String),
}

impl AlignmentError {
    pub(crate) fn failure<T: Into<String>>(reason: T) -> Self {
        Self::AlignmentFailure(reason.into())
    }
}

impl Display for AlignmentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AlignmentError::InvalidAlignment(first_len, second_len) => write!(
                f,
                "Invalid alignment (row lengths: {} and {})",
                first_len, second_len
            ),
            AlignmentError::AlignmentFailure(reason) => {
                write!(f, "Could not align sequences: {}", reason)
            }
        }
    }
}

impl Error for AlignmentError {}

pub type AlignmentResult<T> = Result<T, AlignmentError>;

/// Pair of gapped sequences.
///
/// The rows are not required to have equal length when constructed; the
/// consumers (such as [`percent_identity`](crate::identity::percent_identity))
/// reject malformed alignments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Alignment {
    first: String,
    second: String,
}

impl Alignment {
    #[must_use]
    pub fn new<T, U>(first: T, second: U) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Self {
            first: first.into(),
            second: second.into(),
        }
    }

    #[must_use]
    pub fn first(&self) -> &str {
        &self.first
    }

    #[must_use]
    pub fn second(&self) -> &str {
        &self.second
    }

    /// Returns the same alignment with the rows swapped.
    #[must_use]
    pub fn swapped(self) -> Self {
        Self::new(self.second, self.first)
    }
}

/// Gap penalties, expressed as the score of the first gap position (`open`)
/// and of every subsequent position of the same gap (`extend`).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GapPenalties {
    pub open: i32,
    pub extend: i32,
}

impl GapPenalties {
    #[must_use]
    pub const fn new(open: i32, extend: i32) -> Self {
        Self { open, extend }
    }
}

impl Default for GapPenalties {
    fn default() -> Self {
        Self::new(-1, -1)
    }
}

/// Something able to globally align two sequences.
///
/// Any `FnMut(&Sequence, &Sequence) -> AlignmentResult<Alignment>` closure is
/// a `GlobalAligner` as well.
pub trait GlobalAligner {
    fn align(&mut self, first: &Sequence, second: &Sequence) -> AlignmentResult<Alignment>;
}

impl<F> GlobalAligner for F
where
    F: FnMut(&Sequence, &Sequence) -> AlignmentResult<Alignment>,
{
    fn align(&mut self, first: &Sequence, second: &Sequence) -> AlignmentResult<Alignment> {
        self(first, second)
    }
}

/// Needleman-Wunsch global aligner scoring substitutions with a
/// [`SubstitutionMatrix`].
#[derive(Debug, Clone)]
pub struct MatrixAligner {
    matrix: SubstitutionMatrix,
    gap_penalties: GapPenalties,
}

impl MatrixAligner {
    #[must_use]
    pub fn new(matrix: SubstitutionMatrix) -> Self {
        Self::with_gap_penalties(matrix, GapPenalties::default())
    }

    /// # Panics
    /// This function panics if any of the penalties is positive or if
    /// `open` is greater than `extend`.
    #[must_use]
    pub fn with_gap_penalties(matrix: SubstitutionMatrix, gap_penalties: GapPenalties) -> Self {
        assert!(gap_penalties.extend <= 0, "Gap extend penalty must not be positive");
        assert!(
            gap_penalties.open <= gap_penalties.extend,
            "Gap open penalty must not be greater than the extend penalty"
        );

        Self {
            matrix,
            gap_penalties,
        }
    }

    fn check_sequence(&self, sequence: &Sequence) -> AlignmentResult<()> {
        if sequence.is_empty() {
            return Err(AlignmentError::failure("empty sequence"));
        }
        if let Some(&symbol) = sequence
            .as_bytes()
            .iter()
            .find(|&&symbol| !self.matrix.contains(symbol))
        {
            return Err(AlignmentError::failure(format!(
                "symbol `{}` is not present in the substitution matrix",
                symbol as char
            )));
        }

        Ok(())
    }
}

impl GlobalAligner for MatrixAligner {
    fn align(&mut self, first: &Sequence, second: &Sequence) -> AlignmentResult<Alignment> {
        self.check_sequence(first)?;
        self.check_sequence(second)?;

        let x = first.as_bytes();
        let y = second.as_bytes();
        let matrix = &self.matrix;

        // A gap of length `k` costs `gap_open + k * gap_extend` here.
        let mut aligner = Aligner::with_capacity(
            x.len(),
            y.len(),
            self.gap_penalties.open - self.gap_penalties.extend,
            self.gap_penalties.extend,
            |a: u8, b: u8| matrix.score_unchecked(a, b),
        );
        let alignment = aligner.global(x, y);

        let mut first_row = String::with_capacity(x.len() + y.len());
        let mut second_row = String::with_capacity(x.len() + y.len());
        let (mut x_i, mut y_i) = (0, 0);
        for operation in &alignment.operations {
            match operation {
                AlignmentOperation::Match | AlignmentOperation::Subst => {
                    first_row.push(x[x_i] as char);
                    second_row.push(y[y_i] as char);
                    x_i += 1;
                    y_i += 1;
                }
                AlignmentOperation::Ins => {
                    first_row.push(x[x_i] as char);
                    second_row.push(GAP);
                    x_i += 1;
                }
                AlignmentOperation::Del => {
                    first_row.push(GAP);
                    second_row.push(y[y_i] as char);
                    y_i += 1;
                }
                AlignmentOperation::Xclip(_) | AlignmentOperation::Yclip(_) => {
                    return Err(AlignmentError::failure("unexpected clipping in global mode"));
                }
            }
        }

        Ok(Alignment::new(first_row, second_row))
    }
}

#[cfg(test)]
mod tests {
    use crate::_internal_test_data::MATCH_MATRIX;
    use crate::align::{
        Alignment, AlignmentError, AlignmentResult, GlobalAligner, MatrixAligner, GAP,
    };
    use crate::matrix::SubstitutionMatrix;
    use crate::sequence::Sequence;

    fn align(first: &str, second: &str) -> Alignment {
        let mut aligner = MatrixAligner::new(MATCH_MATRIX.clone());
        aligner
            .align(&Sequence::new(first), &Sequence::new(second))
            .unwrap()
    }

    fn strip_gaps(row: &str) -> String {
        row.chars().filter(|&ch| ch != GAP).collect()
    }

    #[test]
    fn test_align_identical() {
        let alignment = align("ACGTTGCA", "ACGTTGCA");

        assert_eq!(alignment, Alignment::new("ACGTTGCA", "ACGTTGCA"));
    }

    #[test]
    fn test_align_insertion() {
        let alignment = align("ACGTACGT", "ACGTCGT");

        assert_eq!(alignment.first(), "ACGTACGT");
        assert_eq!(strip_gaps(alignment.second()), "ACGTCGT");
        assert_eq!(alignment.second().len(), 8);
    }

    #[test]
    fn test_align_rows_have_equal_length() {
        let alignment = align("AAAA", "AAAT");

        assert_eq!(alignment.first().len(), alignment.second().len());
        assert_eq!(strip_gaps(alignment.first()), "AAAA");
        assert_eq!(strip_gaps(alignment.second()), "AAAT");
    }

    #[test]
    fn test_align_lowercase() {
        let alignment = align("acgt", "ACGT");

        assert_eq!(alignment, Alignment::new("acgt", "ACGT"));
    }

    #[test]
    fn test_align_empty_sequence() {
        let mut aligner = MatrixAligner::new(MATCH_MATRIX.clone());
        let error = aligner
            .align(&Sequence::EMPTY, &Sequence::new("ACGT"))
            .unwrap_err();

        assert!(matches!(error, AlignmentError::AlignmentFailure(_)));
    }

    #[test]
    fn test_align_unknown_symbol() {
        let mut aligner = MatrixAligner::new(SubstitutionMatrix::simple(b"ACGT", 1, -1));
        let error = aligner
            .align(&Sequence::new("ACGN"), &Sequence::new("ACGT"))
            .unwrap_err();

        assert_eq!(
            error,
            AlignmentError::AlignmentFailure(
                "symbol `N` is not present in the substitution matrix".to_owned()
            )
        );
    }

    #[test]
    fn test_closure_aligner() {
        let mut aligner = |first: &Sequence, second: &Sequence| -> AlignmentResult<Alignment> {
            Ok(Alignment::new(first.as_str(), second.as_str()))
        };
        let alignment = aligner
            .align(&Sequence::new("AC"), &Sequence::new("AG"))
            .unwrap();

        assert_eq!(alignment, Alignment::new("AC", "AG"));
    }

    #[test]
    fn test_alignment_swapped() {
        let alignment = Alignment::new("AC-", "A-G").swapped();

        assert_eq!(alignment, Alignment::new("A-G", "AC-"));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            format!("{}", AlignmentError::InvalidAlignment(3, 4)),
            "Invalid alignment (row lengths: 3 and 4)"
        );
        assert_eq!(
            format!("{}", AlignmentError::failure("empty sequence")),
            "Could not align sequences: empty sequence"
        );
    }
}
