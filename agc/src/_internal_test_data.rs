use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use lazy_static::lazy_static;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::fasta::FastaRecord;
use crate::matrix::SubstitutionMatrix;
use crate::sequence::Sequence;

pub const SIMPLE_FASTA_STR: &str = ">SEQ_ID
GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT
>OTU_2 occurrence:15
GCTAAAGACAATTACATAACATACACGTCAGCACGAAACTTGTTGGCCCAGTGTGAATCGCTTAAGGGTTAAGTAAGTGT
GATGCATACGCCTTTACTTG
";

lazy_static! {
    pub static ref SIMPLE_FASTA_RECORDS: Vec<FastaRecord> = vec![
        FastaRecord::new(
            "SEQ_ID",
            "GATTTGGGGTTCAAAGCAGTATCGATCAAATAGTAAATCCATTTGTTCAACTCACAGTTT"
        ),
        FastaRecord::new(
            "OTU_2 occurrence:15",
            "GCTAAAGACAATTACATAACATACACGTCAGCACGAAACTTGTTGGCCCA\
             GTGTGAATCGCTTAAGGGTTAAGTAAGTGTGATGCATACGCCTTTACTTG"
        ),
    ];
}

lazy_static! {
    pub static ref MATCH_MATRIX: SubstitutionMatrix = SubstitutionMatrix::nuc_4_4();
}

const ACIDS: [char; 4] = ['A', 'C', 'G', 'T'];

/// Generates `num_reads` reads of `num_variants` random sequences of given
/// length. Variant `i` is drawn about twice as often as variant `i + 1`, so
/// that the reads have a realistic, skewed abundance distribution.
pub fn random_reads(
    num_variants: usize,
    length: usize,
    num_reads: usize,
    seed: u64,
) -> Vec<Sequence> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);

    let variants: Vec<Sequence> = (0..num_variants)
        .map(|_| {
            (0..length)
                .map(|_| ACIDS[rng.gen_range(0..ACIDS.len())])
                .collect::<String>()
                .into()
        })
        .collect();

    let mut reads = Vec::with_capacity(num_reads);
    for _ in 0..num_reads {
        let mut index = 0;
        while index + 1 < num_variants && rng.gen_bool(0.5) {
            index += 1;
        }
        reads.push(variants[index].clone());
    }

    reads
}

/// Compresses given data with gzip.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}
