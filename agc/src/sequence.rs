use std::borrow::Borrow;

use derive_more::{Deref, Display, From};

/// Nucleotide sequence, stored as the raw characters read from the input.
///
/// Two sequences are equal if and only if their character content is
/// identical; no normalization (e.g. case folding) is performed.
#[derive(
    Debug, Display, Deref, From, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[repr(transparent)]
pub struct Sequence(String);

impl Sequence {
    /// Empty sequence.
    pub const EMPTY: Sequence = Sequence(String::new());

    /// Creates a new instance of `Sequence`.
    ///
    /// # Examples
    /// ```
    /// use agc::sequence::Sequence;
    ///
    /// let seq = Sequence::new("ACGT");
    /// assert_eq!(seq.len(), 4);
    /// assert_eq!(seq.as_str(), "ACGT");
    /// ```
    #[must_use]
    pub fn new<T: Into<String>>(value: T) -> Self {
        Self(value.into())
    }

    /// Returns this sequence as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes this sequence and returns the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Sequence {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl Borrow<str> for Sequence {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<[u8]> for Sequence {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
