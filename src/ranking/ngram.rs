//! Trigram TF-IDF index for ranking field paths
//!
//! Each candidate carries a list of terms (the lowercase segments of a field
//! path). Terms are cut into overlapping character trigrams; a query is
//! scored against each candidate by summing `query_tf * tf * idf` over the
//! trigrams they share.

use std::collections::HashMap;

/// A rankable string and the terms it is indexed under
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Text returned to the caller
    pub text: String,
    /// Lowercase search terms
    pub terms: Vec<String>,
}

impl Candidate {
    pub fn new(text: impl Into<String>, terms: Vec<String>) -> Self {
        Self {
            text: text.into(),
            terms,
        }
    }

    /// Number of terms, i.e. the nesting depth of a field path
    pub fn depth(&self) -> usize {
        self.terms.len()
    }
}

/// A candidate that passed the score cutoff
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate<'a> {
    pub candidate: &'a Candidate,
    pub score: f64,
}

#[derive(Debug, Default)]
struct Posting {
    idf: f64,
    /// `(candidate index, term frequency)`
    entries: Vec<(usize, f64)>,
}

/// Inverted trigram index over a slice of candidates
#[derive(Debug)]
pub struct NGramIndex<'a> {
    candidates: &'a [Candidate],
    postings: HashMap<String, Posting>,
    max_idf: f64,
}

/// Count the trigrams of every term
///
/// Trigrams are windows of three characters taken from each lowercased term.
/// Terms shorter than three characters contribute nothing.
pub fn trigram_frequencies<S: AsRef<str>>(terms: &[S]) -> HashMap<String, f64> {
    let mut counts = HashMap::new();
    for term in terms {
        let chars: Vec<char> = term.as_ref().to_lowercase().chars().collect();
        for window in chars.windows(3) {
            *counts.entry(window.iter().collect::<String>()).or_insert(0.0) += 1.0;
        }
    }
    counts
}

impl<'a> NGramIndex<'a> {
    /// Build the index
    pub fn build(candidates: &'a [Candidate]) -> Self {
        let mut postings: HashMap<String, Posting> = HashMap::new();
        for (index, candidate) in candidates.iter().enumerate() {
            for (gram, tf) in trigram_frequencies(&candidate.terms) {
                postings.entry(gram).or_default().entries.push((index, tf));
            }
        }

        let n = candidates.len() as f64;
        for posting in postings.values_mut() {
            let df = posting.entries.len() as f64;
            posting.idf = ((1.0 + n) / (1.0 + df)).ln();
        }

        Self {
            candidates,
            postings,
            max_idf: (1.0 + n).ln(),
        }
    }

    /// Score candidates against `query` terms
    ///
    /// A candidate is kept when its score exceeds `cutoff` times the score a
    /// perfect match would reach. Results are in candidate order.
    pub fn search<S: AsRef<str>>(&self, query: &[S], cutoff: f64) -> Vec<ScoredCandidate<'a>> {
        let query = trigram_frequencies(query);
        let mut scores = vec![0.0; self.candidates.len()];
        let mut good_match = 0.0;

        for (gram, query_tf) in &query {
            match self.postings.get(gram) {
                Some(posting) => {
                    good_match += query_tf * posting.idf;
                    for (index, tf) in &posting.entries {
                        scores[*index] += query_tf * tf * posting.idf;
                    }
                }
                None => good_match += query_tf * self.max_idf,
            }
        }

        let threshold = cutoff * good_match;
        let candidates = self.candidates;
        scores
            .into_iter()
            .enumerate()
            .filter(|(_, score)| *score > threshold)
            .map(|(index, score)| ScoredCandidate {
                candidate: &candidates[index],
                score,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(texts: &[&str]) -> Vec<Candidate> {
        texts
            .iter()
            .map(|t| Candidate::new(*t, t.split('.').map(str::to_lowercase).collect()))
            .collect()
    }

    fn texts<'a>(results: &[ScoredCandidate<'a>]) -> Vec<&'a str> {
        results.iter().map(|r| r.candidate.text.as_str()).collect()
    }

    #[test]
    fn test_trigram_frequencies() {
        let grams = trigram_frequencies(&["Apple"]);
        assert_eq!(grams.len(), 3);
        assert_eq!(grams["app"], 1.0);
        assert_eq!(grams["ple"], 1.0);

        let grams = trigram_frequencies(&["aaaa"]);
        assert_eq!(grams["aaa"], 2.0);

        assert!(trigram_frequencies(&["ab"]).is_empty());
    }

    #[test]
    fn test_prefix_query_matches() {
        let index_of = candidates(&["apple", "banana", "cherry"]);
        let index = NGramIndex::build(&index_of);
        assert_eq!(texts(&index.search(&["app"], 0.5)), vec!["apple"]);
    }

    #[test]
    fn test_partial_word_matches() {
        let index_of = candidates(&["address", "addresses", "name", "created_at"]);
        let index = NGramIndex::build(&index_of);
        let found = texts(&index.search(&["addres"], 0.5));
        assert_eq!(found, vec!["address", "addresses"]);
    }

    #[test]
    fn test_nested_terms_share_score() {
        let index_of = candidates(&["address.city", "city", "country"]);
        let index = NGramIndex::build(&index_of);
        let found = texts(&index.search(&["city"], 0.5));
        assert_eq!(found, vec!["address.city", "city"]);
    }

    #[test]
    fn test_short_query_finds_nothing() {
        let index_of = candidates(&["ab", "abc"]);
        let index = NGramIndex::build(&index_of);
        assert!(index.search(&["ab"], 0.5).is_empty());
    }

    #[test]
    fn test_related_words_beat_unrelated() {
        let index_of = candidates(&["apple", "app", "bus"]);
        let index = NGramIndex::build(&index_of);
        let found = index.search(&["app"], 0.5);
        assert_eq!(texts(&found), vec!["apple", "app"]);
        assert!(found.iter().all(|r| r.score > 0.0));
    }

    #[test]
    fn test_repeated_query_trigram_is_weighted() {
        let index_of = candidates(&["aaa", "bbb"]);
        let index = NGramIndex::build(&index_of);
        let found = index.search(&["aaaa"], 0.5);
        assert_eq!(texts(&found), vec!["aaa"]);

        let idf = (3.0f64 / 2.0).ln();
        assert!((found[0].score - 2.0 * idf).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_trigram_in_longer_word() {
        let index_of = candidates(&["banana", "bandana", "cabana"]);
        let index = NGramIndex::build(&index_of);
        let found = texts(&index.search(&["banana"], 0.5));
        assert!(found.contains(&"banana"), "{found:?}");
    }

    #[test]
    fn test_zero_cutoff_keeps_any_overlap() {
        let index_of = candidates(&["apple", "applesauce", "grape"]);
        let index = NGramIndex::build(&index_of);
        let found = index.search(&["apples"], 0.0);
        assert_eq!(found.len(), 2);
        assert!(found[1].score > found[0].score);
    }
}
