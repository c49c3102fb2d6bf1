//! Chimera removal stage, run between dereplication and clustering.
//!
//! Only the pass-through filter is provided; the chunk and k-mer parameters
//! are carried so that a detecting filter can be plugged in without changing
//! the pipeline.

use crate::dereplication::DereplicatedRecord;

pub const DEFAULT_CHUNK_SIZE: usize = 100;
pub const DEFAULT_KMER_SIZE: usize = 8;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChimeraParams {
    pub chunk_size: usize,
    pub kmer_size: usize,
}

impl Default for ChimeraParams {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            kmer_size: DEFAULT_KMER_SIZE,
        }
    }
}

/// Filter removing putative chimeras from dereplicated records. The records
/// returned must keep the abundance order of the input.
pub trait ChimeraFilter {
    fn filter_chimeras(
        &mut self,
        records: Vec<DereplicatedRecord>,
        params: &ChimeraParams,
    ) -> Vec<DereplicatedRecord>;
}

impl<F> ChimeraFilter for F
where
    F: FnMut(Vec<DereplicatedRecord>, &ChimeraParams) -> Vec<DereplicatedRecord>,
{
    fn filter_chimeras(
        &mut self,
        records: Vec<DereplicatedRecord>,
        params: &ChimeraParams,
    ) -> Vec<DereplicatedRecord> {
        self(records, params)
    }
}

/// Filter returning all the records unchanged.
#[derive(Debug, Copy, Clone, Default)]
pub struct NoChimeraFilter;

impl ChimeraFilter for NoChimeraFilter {
    fn filter_chimeras(
        &mut self,
        records: Vec<DereplicatedRecord>,
        _params: &ChimeraParams,
    ) -> Vec<DereplicatedRecord> {
        records
    }
}
