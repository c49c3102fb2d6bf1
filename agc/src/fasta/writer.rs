use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;

use crate::clustering::Otu;
use crate::fasta::{otu_title, FASTA_LINE_WIDTH, FASTA_TITLE_PREFIX};

#[derive(Debug)]
pub enum FastaWriterError {
    IoError(std::io::Error),
}

impl From<std::io::Error> for FastaWriterError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl Display for FastaWriterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FastaWriterError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl Error for FastaWriterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FastaWriterError::IoError(e) => Some(e),
        }
    }
}

pub type FastaWriteResult<T> = Result<T, FastaWriterError>;

#[derive(Debug, Clone)]
pub struct FastaWriterParams {
    line_width: usize,
}

impl FastaWriterParams {
    #[must_use]
    pub fn builder() -> FastaWriterParamsBuilder {
        FastaWriterParamsBuilder::new()
    }
}

impl Default for FastaWriterParams {
    fn default() -> Self {
        FastaWriterParamsBuilder::default().build()
    }
}

#[derive(Debug, Clone)]
pub struct FastaWriterParamsBuilder {
    line_width: usize,
}

impl FastaWriterParamsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            line_width: FASTA_LINE_WIDTH,
        }
    }

    /// Sets the maximum number of sequence characters per line.
    ///
    /// # Panics
    /// This function panics if `line_width` is zero.
    pub fn line_width(&mut self, line_width: usize) -> &mut Self {
        assert!(line_width > 0, "Line width must be positive");

        let mut new = self;
        new.line_width = line_width;
        new
    }

    #[must_use]
    pub fn build(&self) -> FastaWriterParams {
        FastaWriterParams {
            line_width: self.line_width,
        }
    }
}

impl Default for FastaWriterParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// FASTA format writer, wrapping the sequences to a fixed line width.
#[derive(Debug)]
pub struct FastaWriter<W> {
    writer: W,
    params: FastaWriterParams,
}

impl<W: Write> FastaWriter<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self::with_params(writer, FastaWriterParams::default())
    }

    #[must_use]
    pub fn with_params(writer: W, params: FastaWriterParams) -> Self {
        Self { writer, params }
    }

    pub fn write_record(&mut self, title: &str, sequence: &str) -> FastaWriteResult<()> {
        self.output_title(title)?;
        self.output_sequence(sequence)?;

        Ok(())
    }

    /// Writes given OTUs, numbering them from 1 in the order given.
    pub fn write_otus(&mut self, otus: &[Otu]) -> FastaWriteResult<()> {
        for (index, otu) in otus.iter().enumerate() {
            let title = otu_title(index + 1, otu.occurrence());
            self.write_record(&title, otu.sequence())?;
        }

        Ok(())
    }

    fn output_title(&mut self, title: &str) -> FastaWriteResult<()> {
        writeln!(&mut self.writer, "{}{}", FASTA_TITLE_PREFIX, title)?;

        Ok(())
    }

    fn output_sequence(&mut self, sequence: &str) -> FastaWriteResult<()> {
        if sequence.is_empty() {
            writeln!(&mut self.writer)?;
            return Ok(());
        }

        for line in sequence.as_bytes().chunks(self.params.line_width) {
            self.writer.write_all(line)?;
            writeln!(&mut self.writer)?;
        }

        Ok(())
    }

    pub fn flush(&mut self) -> FastaWriteResult<()> {
        self.writer.flush()?;

        Ok(())
    }

    /// Consumes this writer and returns the underlying one.
    #[must_use]
    pub fn into_inner(self) -> W {
        self.writer
    }
}
