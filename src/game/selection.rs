use std::sync::Arc;

use crate::models::{Cell, FoundWordRecord, GenerationResult, Grid, WordPlacement};

/// What a committed selection turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Not a straight line, off the grid, or spells no hidden word
    NoMatch,
    /// A hidden word found for the first time
    Found(FoundWordRecord),
    /// A hidden word that had already been found
    AlreadyFound(String),
}

impl SelectionOutcome {
    /// The canonical word matched, if any
    pub fn word(&self) -> Option<&str> {
        match self {
            SelectionOutcome::NoMatch => None,
            SelectionOutcome::Found(record) => Some(&record.word),
            SelectionOutcome::AlreadyFound(word) => Some(word),
        }
    }
}

/// Checks player selections against the words hidden in one generated grid
/// and keeps the words found so far, in discovery order.
#[derive(Debug, Clone)]
pub struct SelectionEngine {
    result: Arc<GenerationResult>,
    found: Vec<FoundWordRecord>,
}

impl SelectionEngine {
    pub fn new(result: Arc<GenerationResult>) -> Self {
        Self {
            result,
            found: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid {
        self.result.grid()
    }

    pub fn placements(&self) -> &[WordPlacement] {
        self.result.placements()
    }

    /// Returns the canonical word spelled by `cells`, read either way.
    /// Newly found words are recorded; repeats are reported but not recorded twice.
    pub fn try_select(&mut self, cells: &[Cell]) -> Option<String> {
        self.select(cells).word().map(str::to_string)
    }

    pub fn select(&mut self, cells: &[Cell]) -> SelectionOutcome {
        let Some(path) = straight_path(cells, self.grid().size()) else {
            return SelectionOutcome::NoMatch;
        };
        let Some(forward) = self.grid().read(&path) else {
            return SelectionOutcome::NoMatch;
        };
        let backward: String = forward.chars().rev().collect();

        let placement = self
            .placements()
            .iter()
            .find(|p| p.matches(&forward))
            .or_else(|| self.placements().iter().find(|p| p.matches(&backward)))
            .cloned();

        match placement {
            Some(placement) => self.record(&placement),
            None => SelectionOutcome::NoMatch,
        }
    }

    /// Mark a hidden word as found without the player selecting it.
    /// None if the word was never placed or is already found.
    pub fn reveal(&mut self, word: &str) -> Option<FoundWordRecord> {
        let placement = self.result.placement_for(word)?.clone();
        match self.record(&placement) {
            SelectionOutcome::Found(record) => Some(record),
            _ => None,
        }
    }

    /// True once every placed word is found. Words that could not be
    /// placed in the grid never count against completion.
    pub fn is_complete(&self) -> bool {
        self.found.len() == self.placements().len()
    }

    pub fn is_found(&self, word: &str) -> bool {
        let word = word.to_uppercase();
        self.found.iter().any(|r| r.word.to_uppercase() == word)
    }

    /// Found words in discovery order
    pub fn found_words(&self) -> &[FoundWordRecord] {
        &self.found
    }

    /// Placed words still hidden
    pub fn unfound_words(&self) -> Vec<&str> {
        self.placements()
            .iter()
            .map(WordPlacement::word)
            .filter(|w| !self.is_found(w))
            .collect()
    }

    fn record(&mut self, placement: &WordPlacement) -> SelectionOutcome {
        if self.is_found(placement.word()) {
            return SelectionOutcome::AlreadyFound(placement.word().to_string());
        }

        let record = FoundWordRecord {
            word: placement.word().to_string(),
            cells: placement.cells(),
        };
        self.found.push(record.clone());

        tracing::debug!(
            "Found {} ({}/{})",
            record.word,
            self.found.len(),
            self.placements().len()
        );

        SelectionOutcome::Found(record)
    }
}

/// Validate that `cells` walk one straight line on the grid.
///
/// Repeated consecutive cells are collapsed. Every remaining step must equal
/// the unit step set by the first two distinct cells.
fn straight_path(cells: &[Cell], grid_size: usize) -> Option<Vec<Cell>> {
    let mut path: Vec<Cell> = Vec::with_capacity(cells.len());
    for cell in cells {
        if path.last() != Some(cell) {
            path.push(*cell);
        }
    }

    let first = *path.first()?;
    if !path.iter().all(|cell| cell.in_bounds(grid_size)) {
        return None;
    }

    if let Some(second) = path.get(1) {
        let step = first.step_toward(*second)?;
        let straight = path
            .windows(2)
            .all(|pair| pair[0].offset(step, 1) == Some(pair[1]));
        if !straight {
            return None;
        }
    }

    Some(path)
}

/// A selection being dragged across the grid.
///
/// The direction is fixed by the first two distinct cells. Later cells must
/// lie on that ray from the anchor; anything else is refused and the path
/// keeps its previous shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionPath {
    anchor: Cell,
    step: Option<(isize, isize)>,
    cells: Vec<Cell>,
}

impl SelectionPath {
    pub fn begin(anchor: Cell) -> Self {
        Self {
            anchor,
            step: None,
            cells: vec![anchor],
        }
    }

    /// Move the free end of the selection to `cell`.
    /// Returns false if the move is refused.
    pub fn extend(&mut self, cell: Cell) -> bool {
        if cell == self.anchor {
            self.cells.truncate(1);
            return true;
        }

        let Some(step) = self.anchor.step_toward(cell) else {
            return false;
        };

        match self.step {
            None => self.step = Some(step),
            Some(locked) if locked != step => return false,
            Some(_) => {}
        }

        let distance = self.anchor.distance(cell);
        self.cells = (0..=distance)
            .filter_map(|i| self.anchor.offset(step, i))
            .collect();
        true
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::GridGenerator, models::Direction};
    use rand::{rngs::StdRng, SeedableRng};

    fn cells(coords: &[(usize, usize)]) -> Vec<Cell> {
        coords.iter().map(|(r, c)| Cell::new(*r, *c)).collect()
    }

    /// CAT across the top row, DOG down the last column
    fn cat_dog_engine() -> SelectionEngine {
        let grid = Grid::parse(&["CATD", "XYZO", "QRSG", "LMNP"]).unwrap();
        let placements = vec![
            WordPlacement::new("CAT", Cell::new(0, 0), Direction::Horizontal).unwrap(),
            WordPlacement::new("DOG", Cell::new(0, 3), Direction::Vertical).unwrap(),
        ];
        let result = GenerationResult::new(grid, placements).unwrap();
        SelectionEngine::new(Arc::new(result))
    }

    #[test]
    fn test_cat_dog_example() {
        let mut engine = cat_dog_engine();

        assert_eq!(engine.try_select(&cells(&[(0, 0), (0, 1), (0, 2)])), Some("CAT".to_string()));
        assert_eq!(engine.try_select(&cells(&[(0, 3), (1, 3), (2, 3)])), Some("DOG".to_string()));
        assert_eq!(engine.try_select(&cells(&[(3, 0), (3, 1), (3, 2)])), None);
        assert!(engine.is_complete());
    }

    #[test]
    fn test_backward_selection_reports_canonical_word() {
        let mut engine = cat_dog_engine();

        let word = engine.try_select(&cells(&[(2, 3), (1, 3), (0, 3)]));
        assert_eq!(word, Some("DOG".to_string()));
        // Highlight follows the placement, not the drag direction
        assert_eq!(engine.found_words()[0].cells, cells(&[(0, 3), (1, 3), (2, 3)]));
    }

    #[test]
    fn test_reverse_path_matches_same_word() {
        let mut rng = StdRng::seed_from_u64(21);
        let result = GridGenerator::default().generate(&["PLANET", "ORBIT", "COMET", "STAR"], 9, &mut rng);
        let result = Arc::new(result);

        for placement in result.placements() {
            let forward = placement.cells();
            let mut backward = forward.clone();
            backward.reverse();

            let mut engine = SelectionEngine::new(result.clone());
            assert_eq!(engine.try_select(&forward).as_deref(), Some(placement.word()));

            let mut engine = SelectionEngine::new(result.clone());
            assert_eq!(engine.try_select(&backward).as_deref(), Some(placement.word()));
        }
    }

    #[test]
    fn test_repeat_selection_is_idempotent() {
        let mut engine = cat_dog_engine();
        let path = cells(&[(0, 0), (0, 1), (0, 2)]);

        assert!(matches!(engine.select(&path), SelectionOutcome::Found(_)));
        assert_eq!(engine.found_words().len(), 1);

        assert_eq!(
            engine.select(&path),
            SelectionOutcome::AlreadyFound("CAT".to_string())
        );
        assert_eq!(engine.try_select(&path), Some("CAT".to_string()));
        assert_eq!(engine.found_words().len(), 1);
    }

    #[test]
    fn test_bent_path_is_rejected() {
        let grid = Grid::parse(&["CAT", "XAT", "XXT"]).unwrap();
        let placements = vec![WordPlacement::new("CAT", Cell::new(0, 0), Direction::Horizontal).unwrap()];
        let mut engine = SelectionEngine::new(Arc::new(GenerationResult::new(grid, placements).unwrap()));

        // (0,0) C, (1,1) A, (1,2) T spells CAT but bends
        assert_eq!(engine.try_select(&cells(&[(0, 0), (1, 1), (1, 2)])), None);
        assert!(engine.found_words().is_empty());
    }

    #[test]
    fn test_gapped_and_off_grid_paths_are_rejected() {
        let mut engine = cat_dog_engine();
        assert_eq!(engine.try_select(&cells(&[(0, 0), (0, 2)])), None);
        assert_eq!(engine.try_select(&cells(&[(0, 2), (0, 3), (0, 4)])), None);
        assert_eq!(engine.try_select(&[]), None);
    }

    #[test]
    fn test_repeated_cells_are_collapsed() {
        let mut engine = cat_dog_engine();
        let word = engine.try_select(&cells(&[(0, 0), (0, 0), (0, 1), (0, 2), (0, 2)]));
        assert_eq!(word, Some("CAT".to_string()));
    }

    #[test]
    fn test_reveal() {
        let mut engine = cat_dog_engine();

        let record = engine.reveal("dog").unwrap();
        assert_eq!(record.word, "DOG");
        assert_eq!(record.cells, cells(&[(0, 3), (1, 3), (2, 3)]));

        // Already found, and never placed
        assert!(engine.reveal("DOG").is_none());
        assert!(engine.reveal("BIRD").is_none());
        assert_eq!(engine.unfound_words(), vec!["CAT"]);
    }

    #[test]
    fn test_completion_counts_placed_words_only() {
        // Six words were requested but only four made it into the grid
        let grid = Grid::parse(&["ALPHAX", "BRAVOX", "DELTAX", "ECHOXX", "XXXXXX", "XXXXXX"]).unwrap();
        let placements = ["ALPHA", "BRAVO", "DELTA", "ECHO"]
            .iter()
            .enumerate()
            .map(|(row, word)| WordPlacement::new(*word, Cell::new(row, 0), Direction::Horizontal).unwrap())
            .collect();
        let result = Arc::new(GenerationResult::new(grid, placements).unwrap());

        let mut engine = SelectionEngine::new(result.clone());
        for (i, placement) in result.placements().iter().enumerate() {
            assert!(!engine.is_complete());
            if i % 2 == 0 {
                assert!(engine.try_select(&placement.cells()).is_some());
            } else {
                assert!(engine.reveal(placement.word()).is_some());
            }
        }
        assert!(engine.is_complete());
        assert!(engine.reveal("FOXTROT").is_none());
    }

    #[test]
    fn test_selection_path_locks_direction() {
        let mut path = SelectionPath::begin(Cell::new(0, 0));

        assert!(path.extend(Cell::new(1, 1)));
        assert!(path.extend(Cell::new(3, 3)));
        assert_eq!(path.cells(), cells(&[(0, 0), (1, 1), (2, 2), (3, 3)]).as_slice());

        // A different straight line from the anchor is refused once locked
        assert!(!path.extend(Cell::new(0, 3)));
        // Not a straight line at all
        assert!(!path.extend(Cell::new(1, 2)));
        assert_eq!(path.cells().len(), 4);

        // Shrinking along the locked ray is fine
        assert!(path.extend(Cell::new(2, 2)));
        assert_eq!(path.cells().len(), 3);
    }

    #[test]
    fn test_selection_path_back_to_anchor_keeps_lock() {
        let mut path = SelectionPath::begin(Cell::new(2, 2));
        assert!(path.extend(Cell::new(2, 3)));
        assert!(path.extend(Cell::new(2, 2)));
        assert_eq!(path.cells(), &[Cell::new(2, 2)]);
        assert!(!path.extend(Cell::new(3, 2)));
        assert!(path.extend(Cell::new(2, 4)));
    }
}
