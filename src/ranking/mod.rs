//! Ranking of completion candidates
//!
//! - [`ngram`]: trigram TF-IDF scoring used for field paths
//! - [`fuzzy`]: weighted edit distance with match highlighting, used for
//!   collection names

pub mod fuzzy;
pub mod ngram;

pub use fuzzy::{FuzzyMatch, FuzzyMatcher, Segment};
pub use ngram::{Candidate, NGramIndex, ScoredCandidate, trigram_frequencies};
