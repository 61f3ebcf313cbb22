pub mod grid;
pub mod scorer;
pub mod selection;
pub mod session;

pub use grid::GridGenerator;
pub use scorer::Scorer;
pub use selection::{SelectionEngine, SelectionOutcome, SelectionPath};
pub use session::{Completion, GameSession, SessionSettings, SessionStatus};
