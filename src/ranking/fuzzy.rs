//! Weighted edit-distance matcher with highlight extraction
//!
//! Distances favour candidates that contain the query in order: extra
//! candidate characters after the whole query was matched are nearly free,
//! extra characters before it cost a little, and skipping query characters
//! or substituting them is expensive.
//!
//! The distance matrix is kept column per candidate character. Candidates
//! are processed in sorted order so consecutive ones reuse the columns of
//! their common prefix.

use std::cmp::Ordering;

use serde::Serialize;

const SCALE: f64 = 10_000.0;
const DELETE_COST: u64 = 10_000;
const MISMATCH_COST: u64 = 10_000;
const LEADING_INSERT_COST: u64 = 100;
const INNER_INSERT_COST: u64 = 1_000;
const TRAILING_INSERT_COST: u64 = 1;

const MOVE_DELETE: u8 = 1;
const MOVE_INSERT: u8 = 1 << 1;
const MOVE_SUBSTITUTE: u8 = 1 << 2;

/// A contiguous run of a matched candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    /// Whether these characters matched the query
    pub highlighted: bool,
}

/// A candidate that passed the quality threshold
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuzzyMatch {
    pub text: String,
    /// Weighted edit distance, in deletion units
    pub distance: f64,
    /// `1 - distance / max(len)`, in `[0, 1]` for good matches
    pub quality: f64,
    /// Candidate split into alternating plain and highlighted runs
    pub segments: Vec<Segment>,
}

/// Fuzzy matcher over a list of candidate strings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    pub max_results: usize,
    pub min_quality: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            max_results: 7,
            min_quality: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    cost: u64,
    moves: u8,
}

/// Distance matrix stored as one column per candidate character
struct Matrix {
    query: Vec<char>,
    columns: Vec<Vec<Cell>>,
}

impl Matrix {
    fn new(query: &str) -> Self {
        let query: Vec<char> = query.chars().collect();
        let first = (0..=query.len())
            .map(|i| Cell {
                cost: i as u64 * DELETE_COST,
                moves: if i == 0 { 0 } else { MOVE_DELETE },
            })
            .collect();
        Self {
            query,
            columns: vec![first],
        }
    }

    fn insert_cost(&self, row: usize) -> u64 {
        if row == 0 {
            LEADING_INSERT_COST
        } else if row == self.query.len() {
            TRAILING_INSERT_COST
        } else {
            INNER_INSERT_COST
        }
    }

    /// Fill columns for `text`, keeping the first `reuse` character columns
    fn fill(&mut self, text: &[char], reuse: usize) {
        self.columns.truncate(reuse + 1);
        for j in reuse + 1..=text.len() {
            let column = self.next_column(text[j - 1]);
            self.columns.push(column);
        }
    }

    fn next_column(&self, ch: char) -> Vec<Cell> {
        let prev = &self.columns[self.columns.len() - 1];
        let mut column = Vec::with_capacity(self.query.len() + 1);
        column.push(Cell {
            cost: prev[0].cost + self.insert_cost(0),
            moves: MOVE_INSERT,
        });

        for i in 1..=self.query.len() {
            let delete = column[i - 1].cost + DELETE_COST;
            let insert = prev[i].cost + self.insert_cost(i);
            let substitute = prev[i - 1].cost
                + if same_char(self.query[i - 1], ch) {
                    0
                } else {
                    MISMATCH_COST
                };

            let cost = delete.min(insert).min(substitute);
            let mut moves = 0;
            if delete == cost {
                moves |= MOVE_DELETE;
            }
            if insert == cost {
                moves |= MOVE_INSERT;
            }
            if substitute == cost {
                moves |= MOVE_SUBSTITUTE;
            }
            column.push(Cell { cost, moves });
        }
        column
    }

    fn distance(&self, text_len: usize) -> u64 {
        self.columns[text_len][self.query.len()].cost
    }

    /// Candidate positions matched for free along the best optimal path
    fn matched_positions(&self, text: &[char]) -> Vec<usize> {
        let mut path = Vec::new();
        let mut best = self
            .best_path(text, self.query.len(), text.len(), &mut path, None)
            .unwrap_or_default();
        best.sort_unstable();
        best
    }

    /// Walk back through tied moves looking for the path with most matches
    ///
    /// `best` is the best complete path found so far; branches that cannot
    /// beat it even if every remaining step matched are skipped.
    fn best_path(
        &self,
        text: &[char],
        i: usize,
        j: usize,
        path: &mut Vec<usize>,
        best: Option<Vec<usize>>,
    ) -> Option<Vec<usize>> {
        if let Some(found) = &best
            && path.len() + i.min(j) <= found.len()
        {
            return best;
        }
        if i == 0 && j == 0 {
            return Some(path.clone());
        }

        let cell = self.columns[j][i];
        let mut best = best;

        if i > 0 && j > 0 && cell.moves & MOVE_SUBSTITUTE != 0 {
            let matched = same_char(self.query[i - 1], text[j - 1]);
            if matched {
                path.push(j - 1);
            }
            best = self.best_path(text, i - 1, j - 1, path, best);
            if matched {
                path.pop();
            }
        }
        if i > 0 && cell.moves & MOVE_DELETE != 0 {
            best = self.best_path(text, i - 1, j, path, best);
        }
        if j > 0 && cell.moves & MOVE_INSERT != 0 {
            best = self.best_path(text, i, j - 1, path, best);
        }
        best
    }
}

fn same_char(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn common_prefix_len(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// Split `text` into runs of highlighted and plain characters
fn segments(text: &[char], positions: &[usize]) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut next = positions.iter().peekable();
    for (index, ch) in text.iter().enumerate() {
        let highlighted = next.next_if(|p| **p == index).is_some();
        if let Some(last) = segments
            .last_mut()
            .filter(|last| last.highlighted == highlighted)
        {
            last.text.push(*ch);
        } else {
            segments.push(Segment {
                text: ch.to_string(),
                highlighted,
            });
        }
    }
    segments
}

impl FuzzyMatcher {
    pub fn new(max_results: usize, min_quality: f64) -> Self {
        Self {
            max_results,
            min_quality,
        }
    }

    /// Rank `candidates` against `query`
    ///
    /// # Returns
    /// * `Vec<FuzzyMatch>` - At most `max_results` matches with quality of at
    ///   least `min_quality`, best first (ties broken by text). Duplicate
    ///   candidates are kept and scored separately.
    pub fn search<S: AsRef<str>>(&self, candidates: &[S], query: &str) -> Vec<FuzzyMatch> {
        let mut texts: Vec<&str> = candidates.iter().map(|c| c.as_ref()).collect();
        texts.sort_unstable();

        let mut matrix = Matrix::new(query);
        let query_len = matrix.query.len();
        let mut previous: Vec<char> = Vec::new();
        let mut matches = Vec::new();

        for text in texts {
            let chars: Vec<char> = text.chars().collect();
            matrix.fill(&chars, common_prefix_len(&previous, &chars));

            let distance = matrix.distance(chars.len()) as f64 / SCALE;
            let longest = query_len.max(chars.len());
            let quality = if longest == 0 {
                1.0
            } else {
                1.0 - distance / longest as f64
            };

            if quality >= self.min_quality {
                let positions = matrix.matched_positions(&chars);
                matches.push(FuzzyMatch {
                    text: text.to_string(),
                    distance,
                    quality,
                    segments: segments(&chars, &positions),
                });
            }
            previous = chars;
        }

        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.text.cmp(&b.text))
        });
        matches.truncate(self.max_results);
        matches
    }
}
