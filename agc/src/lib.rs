pub mod align;
pub mod chimera;
pub mod clustering;
pub mod dereplication;
pub mod fasta;
pub mod identity;
pub mod matrix;
pub mod pipeline;
pub mod progress;
pub mod sequence;
pub mod source;

#[doc(hidden)]
pub mod _internal_test_data;
