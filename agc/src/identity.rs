use crate::align::{Alignment, AlignmentError, AlignmentResult};

/// Returns the percentage (0 to 100) of alignment columns where both rows
/// contain the same character.
///
/// Characters are compared literally, gap symbols included.
///
/// # Errors
/// Returns [`AlignmentError::InvalidAlignment`] if the rows have different
/// lengths or are empty.
///
/// # Examples
/// ```
/// use agc::align::Alignment;
/// use agc::identity::percent_identity;
///
/// let identity = percent_identity(&Alignment::new("AC-T", "ACGT")).unwrap();
/// assert_eq!(identity, 75.0);
/// ```
pub fn percent_identity(alignment: &Alignment) -> AlignmentResult<f64> {
    let first = alignment.first().as_bytes();
    let second = alignment.second().as_bytes();

    if first.len() != second.len() || first.is_empty() {
        return Err(AlignmentError::InvalidAlignment(first.len(), second.len()));
    }

    let matching = first.iter().zip(second).filter(|(a, b)| a == b).count();
    Ok(100.0 * matching as f64 / first.len() as f64)
}
