//! nomen-score: name ↔ profession scoring
//!
//! Core heuristics:
//! - [`tokenizer`]: name tokens plus character trigrams of the longest word
//! - [`pmi`]: token ↔ label pointwise mutual information learned from labeled rows
//! - [`scorer`]: per-record label prediction with score gap and contributions
//! - [`etymology`]: name roots from a static [`lexicon`] plus heuristics
//! - [`alignment`]: overlap between name roots and profession keywords
//!
//! [`services`] wires these to a record store as single table passes.

pub mod alignment;
pub mod etymology;
pub mod lexicon;
pub mod pmi;
pub mod scorer;
pub mod services;
pub mod tokenizer;

pub use alignment::{Alignment, Tier};
pub use etymology::Etymology;
pub use lexicon::{Lexicon, ProfessionKeywords};
pub use pmi::{LabeledExample, PmiModel};
pub use scorer::Prediction;
pub use tokenizer::TokenSet;
