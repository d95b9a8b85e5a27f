//! Candidate generator for one length

use num_bigint::BigUint;
use rand::seq::SliceRandom;
use rand::Rng;

use super::Charset;

/// Lazy odometer over the Cartesian product of one symbol table per position.
///
/// The rightmost position advances fastest. In shuffled mode every position
/// gets its own permutation of the charset, so the visiting order changes but
/// the set of produced strings does not.
pub struct SequenceGenerator {
    positions: Vec<Vec<char>>,
    cursor: Vec<usize>,
    produced: u64,
    total: BigUint,
    exhausted: bool,
}

impl SequenceGenerator {
    /// Generator in plain lexicographic order
    pub fn ordered(charset: &Charset, length: usize) -> Self {
        let positions = vec![charset.chars().to_vec(); length];
        Self::from_positions(charset, positions)
    }

    /// Generator over an independent permutation of the charset per position
    pub fn shuffled<R: Rng + ?Sized>(charset: &Charset, length: usize, rng: &mut R) -> Self {
        let positions = (0..length)
            .map(|_| {
                let mut table = charset.chars().to_vec();
                table.shuffle(rng);
                table
            })
            .collect();
        Self::from_positions(charset, positions)
    }

    fn from_positions(charset: &Charset, positions: Vec<Vec<char>>) -> Self {
        let exhausted = positions.iter().any(|table| table.is_empty());
        Self {
            cursor: vec![0; positions.len()],
            total: charset.total_combinations(positions.len()),
            positions,
            produced: 0,
            exhausted,
        }
    }

    /// Get total number of combinations
    pub fn total(&self) -> &BigUint {
        &self.total
    }

    /// Number of candidates handed out so far
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Check if generator is exhausted
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    fn current(&self) -> String {
        self.positions
            .iter()
            .zip(&self.cursor)
            .map(|(table, &i)| table[i])
            .collect()
    }

    fn advance(&mut self) {
        for pos in (0..self.cursor.len()).rev() {
            self.cursor[pos] += 1;
            if self.cursor[pos] < self.positions[pos].len() {
                return;
            }
            self.cursor[pos] = 0;
        }
        // every position wrapped around
        self.exhausted = true;
    }
}

impl Iterator for SequenceGenerator {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let candidate = self.current();
        self.advance();
        self.produced += 1;
        Some(candidate)
    }
}
