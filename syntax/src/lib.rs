//! Syntax of `.pf` workflow documents.
//!
//! A document lists the input taxa and data, the options of the root filters,
//! and the analysis steps built on top of them:
//!
//! ```text
//! taxa { A B C D }
//! characters dna {
//!     A ACGTTGCA
//!     ...
//! }
//! filter input_taxa = TaxaFilter [exclude: C]
//! dist = JukesCantor(working)
//! ```

#[macro_use]
mod macros;
mod parse;
pub use parse::{parse, Error};
pub mod ast;
