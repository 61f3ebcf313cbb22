pub mod grid;
pub mod level;
pub mod progress;

pub use grid::{Cell, Direction, FoundWordRecord, GenerationResult, Grid, WordPlacement};
pub use level::{Difficulty, LevelData, LevelSummary};
pub use progress::{LevelProgressRow, LevelRecord, PlayerProgress};
