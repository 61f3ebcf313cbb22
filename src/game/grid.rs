use rand::Rng;

use crate::{
    models::{Cell, Direction, GenerationResult, Grid, WordPlacement},
    utils::letters::{normalize_word, random_letter, ALPHABET},
};

/// Full-grid attempts before settling for the best partial result
pub const DEFAULT_MAX_GRID_ATTEMPTS: usize = 10;
/// Random positions tried for a single word within one attempt
pub const DEFAULT_MAX_WORD_ATTEMPTS: usize = 500;

/// Grid under construction; None marks a cell no word has claimed yet
type Draft = Vec<Vec<Option<char>>>;

#[derive(Debug, Clone)]
pub struct GridGenerator {
    max_grid_attempts: usize,
    max_word_attempts: usize,
    alphabet: Vec<char>,
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self {
            max_grid_attempts: DEFAULT_MAX_GRID_ATTEMPTS,
            max_word_attempts: DEFAULT_MAX_WORD_ATTEMPTS,
            alphabet: ALPHABET.clone(),
        }
    }
}

impl GridGenerator {
    pub fn new(max_grid_attempts: usize, max_word_attempts: usize) -> Self {
        Self {
            max_grid_attempts: max_grid_attempts.max(1),
            max_word_attempts,
            ..Self::default()
        }
    }

    /// Use a different filler letter set. An empty set keeps A-Z.
    pub fn with_alphabet(mut self, alphabet: Vec<char>) -> Self {
        if !alphabet.is_empty() {
            self.alphabet = alphabet;
        }
        self
    }

    /// Hide `words` in a `grid_size` x `grid_size` grid.
    ///
    /// Words are uppercased and de-duplicated first. Words longer than the grid,
    /// or that cannot be fitted after all retries, are left out of the
    /// placements; the call itself never fails. Returns as soon as one attempt
    /// places every word, otherwise the attempt that placed the most.
    pub fn generate<S, R>(&self, words: &[S], grid_size: usize, rng: &mut R) -> GenerationResult
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let mut words: Vec<String> = words
            .iter()
            .filter_map(|w| normalize_word(w.as_ref()))
            .fold(Vec::new(), |mut acc, word| {
                if !acc.contains(&word) {
                    acc.push(word);
                }
                acc
            });

        // Longest first: they have the fewest legal positions
        words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

        let mut best: Option<GenerationResult> = None;

        for attempt in 0..self.max_grid_attempts {
            let result = self.try_generate(&words, grid_size, rng);
            let placed = result.placements().len();

            tracing::debug!(
                "Grid attempt {} placed {}/{} words",
                attempt + 1,
                placed,
                words.len()
            );

            if placed == words.len() {
                tracing::trace!("Generated grid:\n{}", result.grid());
                return result;
            }

            let improved = best
                .as_ref()
                .is_none_or(|b| placed > b.placements().len());
            if improved {
                best = Some(result);
            }
        }

        match best {
            Some(result) => {
                tracing::debug!(
                    "Settled for {}/{} words after {} attempts",
                    result.placements().len(),
                    words.len(),
                    self.max_grid_attempts
                );
                tracing::trace!("Generated grid:\n{}", result.grid());
                result
            }
            None => self.try_generate(&words, grid_size, rng),
        }
    }

    /// One full construction: place every word, then fill the gaps
    fn try_generate<R: Rng + ?Sized>(
        &self,
        words: &[String],
        grid_size: usize,
        rng: &mut R,
    ) -> GenerationResult {
        let mut draft: Draft = vec![vec![None; grid_size]; grid_size];
        let mut placements = Vec::with_capacity(words.len());

        for word in words {
            let letters: Vec<char> = word.chars().collect();
            if letters.len() > grid_size {
                continue;
            }
            match self.place_word(&mut draft, word, &letters, rng) {
                Some(placement) => placements.push(placement),
                None => tracing::trace!("Could not place {}", word),
            }
        }

        let rows: Vec<Vec<char>> = draft
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| cell.unwrap_or_else(|| random_letter(&self.alphabet, rng)))
                    .collect()
            })
            .collect();

        GenerationResult::from_parts(Grid::from_square_rows(rows), placements)
    }

    fn place_word<R: Rng + ?Sized>(
        &self,
        draft: &mut Draft,
        word: &str,
        letters: &[char],
        rng: &mut R,
    ) -> Option<WordPlacement> {
        let grid_size = draft.len();

        for _ in 0..self.max_word_attempts {
            let direction = Direction::ALL[rng.random_range(0..Direction::ALL.len())];

            let Some(start) = random_start(direction, letters.len(), grid_size, rng) else {
                continue;
            };

            if can_place(draft, letters, start, direction) {
                for (i, letter) in letters.iter().enumerate() {
                    if let Some(cell) = direction.cell_at(start, i) {
                        draft[cell.row][cell.col] = Some(*letter);
                    }
                }
                return WordPlacement::new(word, start, direction);
            }
        }

        None
    }
}

/// Random start cell from which a word of `len` letters stays on the grid.
/// None when the word does not fit in that direction.
fn random_start<R: Rng + ?Sized>(
    direction: Direction,
    len: usize,
    grid_size: usize,
    rng: &mut R,
) -> Option<Cell> {
    // Positions along an axis the word runs across
    let span = (grid_size + 1).checked_sub(len).filter(|s| *s > 0)?;

    let cell = match direction {
        Direction::Horizontal => Cell::new(rng.random_range(0..grid_size), rng.random_range(0..span)),
        Direction::Vertical => Cell::new(rng.random_range(0..span), rng.random_range(0..grid_size)),
        Direction::DiagonalDown => Cell::new(rng.random_range(0..span), rng.random_range(0..span)),
        // Rows go up, so the start row comes from the bottom of the grid
        Direction::DiagonalUp => Cell::new(
            len - 1 + rng.random_range(0..span),
            rng.random_range(0..span),
        ),
    };

    Some(cell)
}

/// Every cell must be on the grid and either empty or already holding the same letter
fn can_place(draft: &Draft, letters: &[char], start: Cell, direction: Direction) -> bool {
    letters.iter().enumerate().all(|(i, letter)| {
        direction
            .cell_at(start, i)
            .and_then(|cell| draft.get(cell.row)?.get(cell.col))
            .is_some_and(|existing| existing.is_none_or(|c| c == *letter))
    })
}
