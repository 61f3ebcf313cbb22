use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

use crate::{
    error::GameError,
    game::{
        scorer::{FoundBy, Scorer},
        selection::{SelectionEngine, SelectionOutcome, SelectionPath},
    },
    models::{Cell, FoundWordRecord, GenerationResult, Grid, LevelData},
};

/// Hints available at the start of every attempt
pub const DEFAULT_HINTS_PER_LEVEL: u32 = 2;

#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub hints_per_level: u32,
    pub scorer: Scorer,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            hints_per_level: DEFAULT_HINTS_PER_LEVEL,
            scorer: Scorer::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Playing,
    Paused,
    Won,
    TimedOut,
}

/// Final tally of an attempt
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Completion {
    pub won: bool,
    pub score: u32,
    pub time_bonus: u32,
    /// Whole seconds left on the clock
    pub time_remaining: u64,
    pub words_found: usize,
    pub total_words: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    pub outcome: SelectionOutcome,
    pub points: u32,
    /// Set when this selection ended the attempt
    pub completion: Option<Completion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintReport {
    pub record: FoundWordRecord,
    pub hints_remaining: u32,
    pub completion: Option<Completion>,
}

/// One attempt at a level: the generated grid, words found, score, hints
/// and a countdown that stops while paused.
#[derive(Debug)]
pub struct GameSession {
    level: LevelData,
    settings: SessionSettings,
    engine: SelectionEngine,
    score: u32,
    hints_remaining: u32,
    status: SessionStatus,
    selection: Option<SelectionPath>,
    time_limit: Duration,
    /// Clock time used before the current running stretch
    elapsed: Duration,
    running_since: Option<Instant>,
    finished_at: Option<Instant>,
}

impl GameSession {
    pub fn new(
        level: LevelData,
        result: GenerationResult,
        settings: SessionSettings,
        now: Instant,
    ) -> Self {
        Self {
            time_limit: Duration::from_secs(u64::from(level.time_limit)),
            level,
            settings,
            engine: SelectionEngine::new(Arc::new(result)),
            score: 0,
            hints_remaining: settings.hints_per_level,
            status: SessionStatus::Playing,
            selection: None,
            elapsed: Duration::ZERO,
            running_since: Some(now),
            finished_at: None,
        }
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn grid(&self) -> &Grid {
        self.engine.grid()
    }

    /// Words actually hidden in the grid
    pub fn placed_words(&self) -> Vec<String> {
        self.engine
            .placements()
            .iter()
            .map(|p| p.word().to_string())
            .collect()
    }

    pub fn found_words(&self) -> &[FoundWordRecord] {
        self.engine.found_words()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn hints_remaining(&self) -> u32 {
        self.hints_remaining
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, SessionStatus::Won | SessionStatus::TimedOut)
    }

    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    pub fn time_remaining(&self, now: Instant) -> Duration {
        let running = self
            .running_since
            .map_or(Duration::ZERO, |since| now.saturating_duration_since(since));
        self.time_limit.saturating_sub(self.elapsed + running)
    }

    /// Check a complete selection path
    pub fn submit(&mut self, cells: &[Cell], now: Instant) -> Result<SelectionReport, GameError> {
        if let Some(completion) = self.expire_if_due(now) {
            return Ok(SelectionReport {
                outcome: SelectionOutcome::NoMatch,
                points: 0,
                completion: Some(completion),
            });
        }
        self.ensure_playing()?;
        self.selection = None;

        let outcome = self.engine.select(cells);
        let points = match outcome {
            SelectionOutcome::Found(_) => self.settings.scorer.word_points(FoundBy::Selection),
            _ => 0,
        };
        self.score = self.score.saturating_add(points);

        Ok(SelectionReport {
            outcome,
            points,
            completion: self.complete_if_done(now),
        })
    }

    /// Start dragging a selection. Returns the cells now selected.
    pub fn pointer_down(&mut self, cell: Cell) -> Result<Vec<Cell>, GameError> {
        self.ensure_playing()?;

        if !cell.in_bounds(self.grid().size()) {
            self.selection = None;
            return Ok(Vec::new());
        }

        let path = SelectionPath::begin(cell);
        let cells = path.cells().to_vec();
        self.selection = Some(path);
        Ok(cells)
    }

    /// Drag the selection to `cell`.
    /// Returns the new selection, or None when the move is refused.
    pub fn pointer_move(&mut self, cell: Cell) -> Result<Option<Vec<Cell>>, GameError> {
        self.ensure_playing()?;

        let size = self.grid().size();
        let Some(path) = self.selection.as_mut() else {
            return Ok(None);
        };
        if !cell.in_bounds(size) {
            return Ok(None);
        }

        Ok(path.extend(cell).then(|| path.cells().to_vec()))
    }

    /// Release the selection and check it
    pub fn pointer_up(&mut self, now: Instant) -> Result<SelectionReport, GameError> {
        let cells = self
            .selection
            .take()
            .map(SelectionPath::into_cells)
            .unwrap_or_default();
        self.submit(&cells, now)
    }

    /// Reveal a random placed word that has not been found yet
    pub fn use_hint<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        now: Instant,
    ) -> Result<HintReport, GameError> {
        self.ensure_playing()?;
        if self.hints_remaining == 0 {
            return Err(GameError::NoHintsRemaining);
        }

        let unfound: Vec<String> = self
            .engine
            .unfound_words()
            .into_iter()
            .map(str::to_string)
            .collect();
        if unfound.is_empty() {
            return Err(GameError::NothingToReveal);
        }

        let word = &unfound[rng.random_range(0..unfound.len())];
        let record = self
            .engine
            .reveal(word)
            .ok_or(GameError::NothingToReveal)?;

        self.hints_remaining -= 1;
        self.score = self
            .score
            .saturating_add(self.settings.scorer.word_points(FoundBy::Hint));

        Ok(HintReport {
            record,
            hints_remaining: self.hints_remaining,
            completion: self.complete_if_done(now),
        })
    }

    /// Stop the clock. Returns the time left.
    pub fn pause(&mut self, now: Instant) -> Result<Duration, GameError> {
        self.ensure_playing()?;
        self.stop_clock(now);
        self.status = SessionStatus::Paused;
        self.selection = None;
        Ok(self.time_remaining(now))
    }

    pub fn resume(&mut self, now: Instant) -> Result<Duration, GameError> {
        match self.status {
            SessionStatus::Paused => {
                self.status = SessionStatus::Playing;
                self.running_since = Some(now);
            }
            SessionStatus::Playing => {}
            SessionStatus::Won | SessionStatus::TimedOut => return Err(GameError::AttemptFinished),
        }
        Ok(self.time_remaining(now))
    }

    /// End the attempt as lost once the clock has run out
    pub fn expire_if_due(&mut self, now: Instant) -> Option<Completion> {
        if self.status != SessionStatus::Playing || !self.time_remaining(now).is_zero() {
            return None;
        }
        Some(self.finish(false, now))
    }

    /// Start over on a freshly generated grid
    pub fn restart(&mut self, result: GenerationResult, now: Instant) {
        *self = Self::new(self.level.clone(), result, self.settings, now);
    }

    fn ensure_playing(&self) -> Result<(), GameError> {
        match self.status {
            SessionStatus::Playing => Ok(()),
            SessionStatus::Paused => Err(GameError::Paused),
            SessionStatus::Won | SessionStatus::TimedOut => Err(GameError::AttemptFinished),
        }
    }

    /// Win the attempt if every placed word is found.
    /// A grid with nothing placed is complete as soon as it starts.
    pub fn complete_if_done(&mut self, now: Instant) -> Option<Completion> {
        if self.status == SessionStatus::Playing && self.engine.is_complete() {
            Some(self.finish(true, now))
        } else {
            None
        }
    }

    fn stop_clock(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.elapsed += now.saturating_duration_since(since);
        }
    }

    fn finish(&mut self, won: bool, now: Instant) -> Completion {
        let remaining = self.time_remaining(now);
        self.stop_clock(now);

        let time_bonus = if won {
            self.settings.scorer.time_bonus(remaining.as_secs())
        } else {
            0
        };
        self.score = self.score.saturating_add(time_bonus);
        self.status = if won {
            SessionStatus::Won
        } else {
            SessionStatus::TimedOut
        };
        self.selection = None;
        self.finished_at = Some(now);

        tracing::debug!(
            "Level {} finished: won={} score={}",
            self.level.level,
            won,
            self.score
        );

        Completion {
            won,
            score: self.score,
            time_bonus,
            time_remaining: remaining.as_secs(),
            words_found: self.engine.found_words().len(),
            total_words: self.engine.placements().len(),
        }
    }
}
