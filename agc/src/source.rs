//! Amplicon sequence source: reads (possibly gzip-compressed) FASTA input
//! and yields the sequences long enough to be clustered.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;
use log::debug;

use crate::fasta::reader::{FastaReader, FastaReaderIterator, FastaResult};
use crate::sequence::Sequence;

pub const DEFAULT_MIN_SEQUENCE_LENGTH: usize = 400;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Wraps `reader` in a gzip decoder if the data starts with the gzip magic
/// bytes; returns it unchanged otherwise.
pub fn decode<'a, R: BufRead + Send + 'a>(
    mut reader: R,
) -> std::io::Result<Box<dyn BufRead + Send + 'a>> {
    let is_gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);

    let reader: Box<dyn BufRead + Send + 'a> = if is_gzipped {
        debug!("Input is gzip-compressed");
        Box::new(BufReader::new(MultiGzDecoder::new(reader)))
    } else {
        Box::new(reader)
    };
    Ok(reader)
}

/// Opens given file, transparently decompressing it.
pub fn open(path: &Path) -> std::io::Result<Box<dyn BufRead + Send>> {
    let file = File::open(path)?;
    decode(BufReader::new(file))
}

/// Iterator over the sequences of a FASTA stream with at least `min_length`
/// characters. Empty sequences are always skipped.
#[derive(Debug)]
pub struct AmpliconSource<R> {
    records: FastaReaderIterator<R>,
    min_length: usize,
}

impl<R: BufRead> AmpliconSource<R> {
    #[must_use]
    pub fn new(reader: R, min_length: usize) -> Self {
        Self {
            records: FastaReader::new(reader).into_iter(),
            min_length,
        }
    }
}

impl<R: BufRead> Iterator for AmpliconSource<R> {
    type Item = FastaResult<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        for record in self.records.by_ref() {
            match record {
                Ok(record) => {
                    let len = record.sequence().len();
                    if len > 0 && len >= self.min_length {
                        return Some(Ok(record.into_sequence()));
                    }
                }
                Err(e) => return Some(Err(e)),
            }
        }

        None
    }
}

/// Opens the amplicon file at given path.
pub fn read_amplicons(
    path: &Path,
    min_length: usize,
) -> std::io::Result<AmpliconSource<Box<dyn BufRead + Send>>> {
    Ok(AmpliconSource::new(open(path)?, min_length))
}
