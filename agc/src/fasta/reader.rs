use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::io::{BufRead, ErrorKind};

use crate::fasta::{FastaRecord, FASTA_TITLE_PREFIX};

/// Error occurring during parsing a FASTA file.
#[derive(Debug)]
pub enum FastaReaderError {
    /// I/O error occurred when reading the FASTA file.
    IoError(std::io::Error),
    /// The (compressed) stream could not be decoded.
    DecodeError(std::io::Error),
    /// Invalid character in a sequence line.
    InvalidSymbol(char),
}

impl From<std::io::Error> for FastaReaderError {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidData | ErrorKind::InvalidInput | ErrorKind::UnexpectedEof => {
                Self::DecodeError(e)
            }
            _ => Self::IoError(e),
        }
    }
}

impl Display for FastaReaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaReaderError::IoError(e) => write!(f, "IO error: {}", e),
            FastaReaderError::DecodeError(e) => write!(f, "Decode error: {}", e),
            FastaReaderError::InvalidSymbol(ch) => write!(f, "Invalid symbol: `{}`", ch),
        }
    }
}

impl Error for FastaReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaReaderError::IoError(e) => Some(e),
            FastaReaderError::DecodeError(e) => Some(e),
            FastaReaderError::InvalidSymbol(_) => None,
        }
    }
}

/// The result of a FASTA reading operation.
pub type FastaResult<T> = Result<T, FastaReaderError>;

/// FASTA format reader capable of deserializing the records into
/// [`FastaRecord`] objects.
///
/// A record starts at a line beginning with `>`; all the following lines up to
/// the next title are trimmed and concatenated into a single sequence. Lines
/// preceding the first title form a record with an empty title. The last
/// record is returned even if the stream does not end with a newline.
#[derive(Debug)]
pub struct FastaReader<R> {
    reader: R,
    buffer: Vec<u8>,
    pending_title: Option<String>,
    finished: bool,
}

impl<R: BufRead> FastaReader<R> {
    /// Creates new `FastaReader` instance.
    ///
    /// # Examples
    /// ```
    /// use agc::fasta::reader::FastaReader;
    ///
    /// let buf = Vec::new();
    /// let _reader = FastaReader::new(buf.as_slice());
    /// ```
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(4096),
            pending_title: None,
            finished: false,
        }
    }

    /// Reads a single FASTA record from given reader. Returns `None` when
    /// there are no records left.
    pub fn read_record(&mut self) -> FastaResult<Option<FastaRecord>> {
        if self.finished {
            return Ok(None);
        }

        let mut sequence = String::new();
        loop {
            let line = match Self::read_line(&mut self.reader, &mut self.buffer)? {
                Some(line) => line,
                None => {
                    self.finished = true;
                    let title = self.pending_title.take();
                    if title.is_none() && sequence.is_empty() {
                        return Ok(None);
                    }

                    return Ok(Some(FastaRecord::new(title.unwrap_or_default(), sequence)));
                }
            };

            if line.first().copied() == Some(FASTA_TITLE_PREFIX as u8) {
                let title = String::from_utf8_lossy(&line[1..]).trim().to_owned();
                let previous_title = self.pending_title.replace(title);

                if previous_title.is_some() || !sequence.is_empty() {
                    let record = FastaRecord::new(previous_title.unwrap_or_default(), sequence);
                    return Ok(Some(record));
                }
            } else {
                Self::parse_sequence_line(line, &mut sequence)?;
            }
        }
    }

    fn parse_sequence_line(line: &[u8], sequence: &mut String) -> FastaResult<()> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim();

        if let Some(ch) = line.chars().find(|ch| !ch.is_ascii_graphic()) {
            return Err(FastaReaderError::InvalidSymbol(ch));
        }
        sequence.push_str(line);

        Ok(())
    }

    fn read_line<'a, T: BufRead>(
        mut buf_reader: T,
        buffer: &'a mut Vec<u8>,
    ) -> FastaResult<Option<&'a [u8]>> {
        buffer.clear();
        let bytes_read = buf_reader.read_until(b'\n', buffer)?;
        if bytes_read == 0 {
            return Ok(None);
        }

        let mut buffer = buffer.as_slice();
        while matches!(buffer.last(), Some(b'\n' | b'\r')) {
            buffer = &buffer[..buffer.len() - 1];
        }

        Ok(Some(buffer))
    }
}

impl<R: BufRead> IntoIterator for FastaReader<R> {
    type Item = FastaResult<FastaRecord>;
    type IntoIter = FastaReaderIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        Self::IntoIter {
            reader: self,
            no_errors: true,
        }
    }
}

/// Iterator implementation for [`FastaReader`] which iterates over all
/// records in a file.
#[derive(Debug)]
pub struct FastaReaderIterator<R> {
    reader: FastaReader<R>,
    no_errors: bool,
}

impl<R: BufRead> Iterator for FastaReaderIterator<R> {
    type Item = FastaResult<FastaRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if !self.no_errors {
            return None;
        }

        match self.reader.read_record() {
            Ok(record) => record.map(Ok),
            Err(e) => {
                self.no_errors = false;
                Some(Err(e))
            }
        }
    }
}
