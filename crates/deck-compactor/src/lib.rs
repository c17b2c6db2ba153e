//! Deck compactor: lossless run-length compression of deck include files.
//!
//! Stages, applied in order:
//! 1. Normalize: split raw lines into one semantic unit per line
//! 2. Locate: find keyword data blocks bounded by header and terminator
//! 3. Run-length encode: rewrite consecutive duplicate tokens as `n*value`
//! 4. Assemble: splice blocks back and keep the result only if it is smaller

pub mod assemble;
pub mod locate;
pub mod normalize;
pub mod pipeline;
pub mod rle;
pub mod tokenize;
pub mod validator;

pub use assemble::GuardDecision;
pub use pipeline::{CompressionResult, DeckCompactor};
pub use validator::{DeckValidator, StructuralValidator};
