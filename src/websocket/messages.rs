use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    game::Completion,
    models::{Cell, Difficulty, Grid, PlayerProgress},
};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    StartLevel {
        level: u32,
    },
    /// A finished selection, sent in one go
    SelectCells {
        cells: Vec<Cell>,
    },
    PointerDown {
        cell: Cell,
    },
    PointerMove {
        cell: Cell,
    },
    PointerUp,
    UseHint,
    Pause,
    Resume,
    Restart,
    Quit,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LevelStarted {
        session_id: Uuid,
        level: u32,
        difficulty: Difficulty,
        grid: Grid,
        /// Words hidden in the grid, in placement order
        words: Vec<String>,
        time_limit: u32,
        hints_remaining: u32,
        score: u32,
    },
    SelectionUpdated {
        cells: Vec<Cell>,
    },
    WordFound {
        word: String,
        cells: Vec<Cell>,
        /// 1-based position in the order words were found
        order: usize,
        points: u32,
        score: u32,
        found_count: usize,
        total_words: usize,
    },
    AlreadyFound {
        word: String,
    },
    NoMatch,
    HintRevealed {
        word: String,
        cells: Vec<Cell>,
        hints_remaining: u32,
    },
    TimerTick {
        time_remaining: u64,
    },
    Paused {
        time_remaining: u64,
    },
    Resumed {
        time_remaining: u64,
    },
    LevelComplete {
        won: bool,
        score: u32,
        time_bonus: u32,
        time_remaining: u64,
        words_found: usize,
        total_words: usize,
        /// Progress after a win was saved
        unlocked_level: Option<u32>,
        total_score: Option<u64>,
    },
    LevelQuit,
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// End-of-attempt summary; `progress` is the saved progress after a win
    pub fn level_complete(completion: &Completion, progress: Option<&PlayerProgress>) -> Self {
        ServerMessage::LevelComplete {
            won: completion.won,
            score: completion.score,
            time_bonus: completion.time_bonus,
            time_remaining: completion.time_remaining,
            words_found: completion.words_found,
            total_words: completion.total_words,
            unlocked_level: progress.map(|p| p.unlocked_level),
            total_score: progress.map(|p| p.total_score),
        }
    }
}
