//! Substitution score matrices in the NCBI text layout.
//!
//! ```text
//! # comment
//!    A  T  G  C
//! A  5 -4 -4 -4
//! T -4  5 -4 -4
//! G -4 -4  5 -4
//! C -4 -4 -4  5
//! ```

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use itertools::Itertools;
use lazy_static::lazy_static;
use log::debug;

const SYMBOL_NUM: usize = 256;

/// NUC.4.4 nucleotide matrix (IUPAC ambiguity codes included) bundled with
/// the crate.
pub const NUC_4_4_STR: &str = include_str!("../matrices/MATCH");

lazy_static! {
    static ref NUC_4_4: SubstitutionMatrix = SubstitutionMatrix::from_reader(NUC_4_4_STR.as_bytes())
        .expect("Invalid bundled NUC.4.4 matrix");
}

/// Error occurring when loading a substitution matrix.
#[derive(Debug)]
pub enum MatrixError {
    /// The matrix file does not exist.
    ResourceMissing(PathBuf),
    /// I/O error occurred when reading the matrix.
    IoError(std::io::Error),
    /// The matrix file is not in the expected format.
    InvalidFormat(String),
}

impl From<std::io::Error> for MatrixError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for MatrixError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixError::ResourceMissing(path) => {
                write!(f, "Substitution matrix not found: {}", path.display())
            }
            MatrixError::IoError(e) => write!(f, "IO error: {}", e),
            MatrixError::InvalidFormat(msg) => write!(f, "Invalid matrix format: {}", msg),
        }
    }
}

impl Error for MatrixError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MatrixError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

pub type MatrixResult<T> = Result<T, MatrixError>;

/// Symmetric-or-not table of scores for aligning one symbol against another.
///
/// Symbol lookup is case-insensitive.
#[derive(Clone)]
pub struct SubstitutionMatrix {
    scores: Box<[i32]>,
    known: [bool; SYMBOL_NUM],
    symbols: Vec<u8>,
}

impl SubstitutionMatrix {
    /// Returns a matrix scoring `match_score` for identical symbols of
    /// `alphabet` and `mismatch_score` for any other pair.
    ///
    /// # Examples
    /// ```
    /// use agc::matrix::SubstitutionMatrix;
    ///
    /// let matrix = SubstitutionMatrix::simple(b"ACGT", 2, -1);
    /// assert_eq!(matrix.score(b'A', b'A'), Some(2));
    /// assert_eq!(matrix.score(b'a', b'C'), Some(-1));
    /// assert_eq!(matrix.score(b'A', b'N'), None);
    /// ```
    #[must_use]
    pub fn simple(alphabet: &[u8], match_score: i32, mismatch_score: i32) -> Self {
        let mut matrix = Self::empty();
        for (&a, &b) in alphabet.iter().cartesian_product(alphabet) {
            let score = if a == b {
                match_score
            } else {
                mismatch_score
            };
            matrix.set(a, b, score);
        }

        matrix
    }

    /// Returns the bundled NUC.4.4 nucleotide matrix.
    ///
    /// # Examples
    /// ```
    /// use agc::matrix::SubstitutionMatrix;
    ///
    /// let matrix = SubstitutionMatrix::nuc_4_4();
    /// assert_eq!(matrix.score(b'A', b'A'), Some(5));
    /// assert_eq!(matrix.score(b'A', b'T'), Some(-4));
    /// ```
    #[must_use]
    pub fn nuc_4_4() -> Self {
        NUC_4_4.clone()
    }

    /// Loads a matrix from given file.
    pub fn from_path(path: &Path) -> MatrixResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MatrixError::ResourceMissing(path.to_owned()),
            _ => MatrixError::IoError(e),
        })?;
        let matrix = Self::from_reader(BufReader::new(file))?;

        debug!(
            "Loaded substitution matrix from `{}` with symbols: {}",
            path.display(),
            String::from_utf8_lossy(matrix.symbols())
        );

        Ok(matrix)
    }

    /// Parses a matrix in the NCBI text layout.
    pub fn from_reader<R: BufRead>(reader: R) -> MatrixResult<Self> {
        let mut matrix = Self::empty();
        let mut columns: Option<Vec<u8>> = None;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();
            match &columns {
                None => columns = Some(Self::parse_symbols(&tokens)?),
                Some(columns) => {
                    let Some((row, values)) = tokens.split_first() else {
                        continue;
                    };
                    let row = Self::parse_symbol(row)?;

                    if values.len() != columns.len() {
                        return Err(MatrixError::InvalidFormat(format!(
                            "row `{}` has {} values, expected {}",
                            row as char,
                            values.len(),
                            columns.len()
                        )));
                    }

                    for (&column, value) in columns.iter().zip(values) {
                        let score = value.parse::<i32>().map_err(|_| {
                            MatrixError::InvalidFormat(format!("invalid score `{}`", value))
                        })?;
                        matrix.set(row, column, score);
                    }
                }
            }
        }

        if columns.is_none() {
            return Err(MatrixError::InvalidFormat("missing header row".to_owned()));
        }

        Ok(matrix)
    }

    fn empty() -> Self {
        Self {
            scores: vec![0; SYMBOL_NUM * SYMBOL_NUM].into_boxed_slice(),
            known: [false; SYMBOL_NUM],
            symbols: Vec::new(),
        }
    }

    fn parse_symbols(tokens: &[&str]) -> MatrixResult<Vec<u8>> {
        tokens.iter().map(|token| Self::parse_symbol(token)).collect()
    }

    fn parse_symbol(token: &str) -> MatrixResult<u8> {
        match token.as_bytes() {
            &[symbol] if symbol.is_ascii_graphic() => Ok(symbol.to_ascii_uppercase()),
            _ => Err(MatrixError::InvalidFormat(format!(
                "invalid symbol `{}`",
                token
            ))),
        }
    }

    fn set(&mut self, a: u8, b: u8, score: i32) {
        let (a, b) = (a.to_ascii_uppercase(), b.to_ascii_uppercase());
        for symbol in [a, b] {
            if !self.known[symbol as usize] {
                self.known[symbol as usize] = true;
                self.symbols.push(symbol);
            }
        }

        for a in [a, a.to_ascii_lowercase()] {
            for b in [b, b.to_ascii_lowercase()] {
                self.scores[Self::index(a, b)] = score;
            }
        }
    }

    #[inline]
    fn index(a: u8, b: u8) -> usize {
        a as usize * SYMBOL_NUM + b as usize
    }

    /// Returns `true` if the matrix defines scores for given symbol.
    #[inline]
    #[must_use]
    pub fn contains(&self, symbol: u8) -> bool {
        self.known[symbol.to_ascii_uppercase() as usize]
    }

    /// Returns the score of aligning `a` against `b`, or `None` if any of the
    /// symbols is not a part of the matrix.
    #[inline]
    #[must_use]
    pub fn score(&self, a: u8, b: u8) -> Option<i32> {
        if self.contains(a) && self.contains(b) {
            Some(self.score_unchecked(a, b))
        } else {
            None
        }
    }

    /// Returns the score of aligning `a` against `b`. Scores of symbols not
    /// contained in the matrix are 0.
    #[inline]
    #[must_use]
    pub fn score_unchecked(&self, a: u8, b: u8) -> i32 {
        self.scores[Self::index(a, b)]
    }

    /// Returns the (uppercase) symbols of this matrix, in the order they were
    /// defined.
    #[must_use]
    pub fn symbols(&self) -> &[u8] {
        &self.symbols
    }
}

impl std::fmt::Debug for SubstitutionMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionMatrix")
            .field("symbols", &String::from_utf8_lossy(&self.symbols))
            .finish()
    }
}
