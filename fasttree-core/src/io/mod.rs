//! Input/output adapters: FASTA reading and tree export in Newick and
//! JSON.

pub mod fasta;
pub mod newick;
pub mod treejson;
