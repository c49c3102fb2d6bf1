use std::iter;

use agc::_internal_test_data::{gzip, random_reads};
use agc::fasta::reader::FastaReader;
use agc::fasta::writer::FastaWriter;
use agc::source::{decode, AmpliconSource};
use criterion::{criterion_group, criterion_main, Criterion};
use lazy_static::lazy_static;

lazy_static! {
    static ref READS_FASTA: String = random_reads(100, 400, 10_000, 1337)
        .into_iter()
        .enumerate()
        .map(|(i, read)| format!(">read_{}\n{}\n", i, read))
        .collect();
    static ref READS_FASTA_GZ: Vec<u8> = gzip(READS_FASTA.as_bytes());
}

fn read_10k_reads(c: &mut Criterion) {
    c.bench_function("Read 10k reads from FASTA", |b| {
        b.iter(|| {
            let reader = FastaReader::new(READS_FASTA.as_bytes());
            let result: Result<Vec<_>, _> = reader.into_iter().collect();
            assert_eq!(result.unwrap().len(), 10_000);
        })
    });
}

fn read_10k_reads_gz(c: &mut Criterion) {
    c.bench_function("Read 10k reads from gzip-compressed FASTA", |b| {
        b.iter(|| {
            let reader = decode(READS_FASTA_GZ.as_slice()).unwrap();
            let result: Result<Vec<_>, _> = AmpliconSource::new(reader, 400).collect();
            assert_eq!(result.unwrap().len(), 10_000);
        })
    });
}

fn write_1mb(c: &mut Criterion) {
    let sequence: String = iter::repeat("ACGT").take(250_000).collect();

    c.bench_function("Write 1MB FASTA", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            {
                let mut writer = FastaWriter::new(&mut buf);
                writer.write_record("seq", &sequence).unwrap();
            }
            assert_eq!(buf.len(), 1_012_505);
        })
    });
}

criterion_group!(benches, read_10k_reads, read_10k_reads_gz, write_1mb);
criterion_main!(benches);
