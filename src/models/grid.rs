use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// A grid coordinate, 0-indexed from the top-left corner
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }

    /// Cell reached after `steps` moves of `step`.
    /// Returns None when that would cross the top or left edge.
    pub fn offset(self, step: (isize, isize), steps: usize) -> Option<Cell> {
        let steps = isize::try_from(steps).ok()?;
        let row = isize::try_from(self.row)
            .ok()?
            .checked_add(step.0.checked_mul(steps)?)?;
        let col = isize::try_from(self.col)
            .ok()?
            .checked_add(step.1.checked_mul(steps)?)?;

        Some(Cell {
            row: usize::try_from(row).ok()?,
            col: usize::try_from(col).ok()?,
        })
    }

    /// Unit step leading from this cell toward `other` along one of the
    /// eight straight lines (horizontal, vertical, 45° diagonals).
    /// None if the cells are equal or not aligned.
    pub fn step_toward(self, other: Cell) -> Option<(isize, isize)> {
        let d_row = other.row as isize - self.row as isize;
        let d_col = other.col as isize - self.col as isize;

        if d_row == 0 && d_col == 0 {
            return None;
        }

        if d_row == 0 || d_col == 0 || d_row.abs() == d_col.abs() {
            Some((d_row.signum(), d_col.signum()))
        } else {
            None
        }
    }

    /// Number of unit steps between two aligned cells
    pub fn distance(self, other: Cell) -> usize {
        self.row.abs_diff(other.row).max(self.col.abs_diff(other.col))
    }
}

/// The four directions a word can be written in.
/// Words read backwards are matched by reversing the text, not by extra variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Horizontal,
    Vertical,
    DiagonalDown,
    DiagonalUp,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Horizontal,
        Direction::Vertical,
        Direction::DiagonalDown,
        Direction::DiagonalUp,
    ];

    /// (Δrow, Δcol) unit vector
    pub const fn step(self) -> (isize, isize) {
        match self {
            Direction::Horizontal => (0, 1),
            Direction::Vertical => (1, 0),
            Direction::DiagonalDown => (1, 1),
            Direction::DiagonalUp => (-1, 1),
        }
    }

    /// Position of the `index`-th letter of a word starting at `start`
    pub fn cell_at(self, start: Cell, index: usize) -> Option<Cell> {
        start.offset(self.step(), index)
    }
}

/// Where one word was embedded in the grid
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WordPlacement {
    word: String,
    start: Cell,
    end: Cell,
    direction: Direction,
}

impl WordPlacement {
    /// Build a placement, deriving the end cell from the word length.
    /// Returns None for an empty word or one that would cross the top/left edge.
    pub fn new(word: impl Into<String>, start: Cell, direction: Direction) -> Option<Self> {
        let word = word.into();
        let len = word.chars().count();
        if len == 0 {
            return None;
        }
        let end = direction.cell_at(start, len - 1)?;

        Some(Self {
            word,
            start,
            end,
            direction,
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn start(&self) -> Cell {
        self.start
    }

    pub fn end(&self) -> Cell {
        self.end
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Word length in letters
    pub fn len(&self) -> usize {
        self.word.chars().count()
    }

    /// Cells covered by the word, from start to end
    pub fn cells(&self) -> Vec<Cell> {
        (0..self.len())
            .filter_map(|i| self.direction.cell_at(self.start, i))
            .collect()
    }

    pub(crate) fn matches(&self, candidate: &str) -> bool {
        self.word.to_uppercase() == candidate.to_uppercase()
    }
}

/// Square letter matrix. Read-only once generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<char>>,
}

impl Grid {
    /// Build a grid from rows of letters, rejecting non-square input
    pub fn from_rows(rows: Vec<Vec<char>>) -> Result<Self, GameError> {
        let size = rows.len();
        for (row, letters) in rows.iter().enumerate() {
            if letters.len() != size {
                return Err(GameError::NonSquareGrid {
                    row,
                    len: letters.len(),
                    size,
                });
            }
        }
        Ok(Self { rows })
    }

    /// Parse rows written as strings, e.g. `["CATD", "XXXO"]`
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, GameError> {
        Self::from_rows(rows.iter().map(|r| r.as_ref().chars().collect()).collect())
    }

    pub(crate) fn from_square_rows(rows: Vec<Vec<char>>) -> Self {
        Self { rows }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    pub fn letter(&self, cell: Cell) -> Option<char> {
        self.rows.get(cell.row)?.get(cell.col).copied()
    }

    /// Letters along `cells` in order, or None if any cell is off the grid
    pub fn read(&self, cells: &[Cell]) -> Option<String> {
        cells.iter().map(|cell| self.letter(*cell)).collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            let line: Vec<String> = row.iter().map(char::to_string).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}

/// A generated grid and the words hidden in it.
/// May hold fewer placements than words requested.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationResult {
    grid: Grid,
    placements: Vec<WordPlacement>,
}

impl GenerationResult {
    /// Pair a hand-built grid with its placements, checking that every
    /// placement reads back from the grid letters
    pub fn new(grid: Grid, placements: Vec<WordPlacement>) -> Result<Self, GameError> {
        for placement in &placements {
            let letters = grid.read(&placement.cells());
            if letters.as_deref() != Some(placement.word()) {
                return Err(GameError::InconsistentPlacement(
                    placement.word().to_string(),
                ));
            }
        }
        Ok(Self { grid, placements })
    }

    pub(crate) fn from_parts(grid: Grid, placements: Vec<WordPlacement>) -> Self {
        Self { grid, placements }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn placements(&self) -> &[WordPlacement] {
        &self.placements
    }

    /// Case-insensitive lookup of a placed word
    pub fn placement_for(&self, word: &str) -> Option<&WordPlacement> {
        self.placements.iter().find(|p| p.matches(word))
    }
}

/// A discovered word and the cells it spans, in placement order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FoundWordRecord {
    pub word: String,
    pub cells: Vec<Cell>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_steps() {
        assert_eq!(Direction::Horizontal.step(), (0, 1));
        assert_eq!(Direction::Vertical.step(), (1, 0));
        assert_eq!(Direction::DiagonalDown.step(), (1, 1));
        assert_eq!(Direction::DiagonalUp.step(), (-1, 1));
    }

    #[test]
    fn test_cell_offset_stops_at_top_edge() {
        let cell = Cell::new(1, 0);
        assert_eq!(cell.offset((-1, 1), 1), Some(Cell::new(0, 1)));
        assert_eq!(cell.offset((-1, 1), 2), None);
    }

    #[test]
    fn test_step_toward() {
        let origin = Cell::new(2, 2);
        assert_eq!(origin.step_toward(Cell::new(2, 5)), Some((0, 1)));
        assert_eq!(origin.step_toward(Cell::new(0, 2)), Some((-1, 0)));
        assert_eq!(origin.step_toward(Cell::new(0, 0)), Some((-1, -1)));
        assert_eq!(origin.step_toward(Cell::new(4, 0)), Some((1, -1)));
        // Knight move is not a straight line
        assert_eq!(origin.step_toward(Cell::new(3, 4)), None);
        assert_eq!(origin.step_toward(origin), None);
    }

    #[test]
    fn test_placement_end_cell() {
        let placement = WordPlacement::new("TROUT", Cell::new(4, 0), Direction::DiagonalUp).unwrap();
        assert_eq!(placement.end(), Cell::new(0, 4));
        assert_eq!(placement.cells().len(), 5);
        assert_eq!(placement.cells()[2], Cell::new(2, 2));
    }

    #[test]
    fn test_placement_rejects_empty_and_off_edge() {
        assert!(WordPlacement::new("", Cell::new(0, 0), Direction::Horizontal).is_none());
        assert!(WordPlacement::new("CAT", Cell::new(1, 0), Direction::DiagonalUp).is_none());
    }

    #[test]
    fn test_grid_must_be_square() {
        let err = Grid::parse(&["AB", "C"]).unwrap_err();
        assert_eq!(
            err,
            GameError::NonSquareGrid {
                row: 1,
                len: 1,
                size: 2
            }
        );
    }

    #[test]
    fn test_grid_read() {
        let grid = Grid::parse(&["CAT", "XOX", "XXG"]).unwrap();
        assert_eq!(grid.size(), 3);
        assert_eq!(
            grid.read(&[Cell::new(0, 0), Cell::new(1, 1), Cell::new(2, 2)]),
            Some("COG".to_string())
        );
        assert_eq!(grid.read(&[Cell::new(0, 0), Cell::new(3, 0)]), None);
    }

    #[test]
    fn test_generation_result_checks_placements() {
        let grid = Grid::parse(&["CAT", "XXX", "XXX"]).unwrap();
        let good = WordPlacement::new("CAT", Cell::new(0, 0), Direction::Horizontal).unwrap();
        let bad = WordPlacement::new("DOG", Cell::new(0, 0), Direction::Vertical).unwrap();

        assert!(GenerationResult::new(grid.clone(), vec![good]).is_ok());
        assert_eq!(
            GenerationResult::new(grid, vec![bad]).unwrap_err(),
            GameError::InconsistentPlacement("DOG".to_string())
        );
    }

    #[test]
    fn test_placement_lookup_ignores_case() {
        let grid = Grid::parse(&["CAT", "XXX", "XXX"]).unwrap();
        let placement = WordPlacement::new("CAT", Cell::new(0, 0), Direction::Horizontal).unwrap();
        let result = GenerationResult::new(grid, vec![placement]).unwrap();
        assert!(result.placement_for("cat").is_some());
        assert!(result.placement_for("dog").is_none());
    }

    #[test]
    fn test_grid_display_prints_rows() {
        let grid = Grid::parse(&["CAT", "XYZ", "QRS"]).unwrap();
        assert_eq!(grid.to_string(), "C A T\nX Y Z\nQ R S\n");
    }
}
