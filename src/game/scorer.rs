/// Points awarded for a newly found word
pub const DEFAULT_POINTS_PER_WORD: u32 = 10;
/// Bonus points for each second left on the clock when a level is won
pub const DEFAULT_TIME_BONUS_PER_SECOND: u32 = 5;

/// How a found word came to be found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoundBy {
    /// The player traced it on the grid
    Selection,
    /// A hint revealed it
    Hint,
}

#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    points_per_word: u32,
    time_bonus_per_second: u32,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(DEFAULT_POINTS_PER_WORD, DEFAULT_TIME_BONUS_PER_SECOND)
    }
}

impl Scorer {
    pub fn new(points_per_word: u32, time_bonus_per_second: u32) -> Self {
        Self {
            points_per_word,
            time_bonus_per_second,
        }
    }

    /// Points for one found word. Revealed words are free but score nothing.
    pub fn word_points(&self, found_by: FoundBy) -> u32 {
        match found_by {
            FoundBy::Selection => self.points_per_word,
            FoundBy::Hint => 0,
        }
    }

    /// Bonus for finishing with `seconds_remaining` left
    pub fn time_bonus(&self, seconds_remaining: u64) -> u32 {
        let seconds = u32::try_from(seconds_remaining).unwrap_or(u32::MAX);
        seconds.saturating_mul(self.time_bonus_per_second)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_points() {
        let scorer = Scorer::default();
        assert_eq!(scorer.word_points(FoundBy::Selection), 10);
        assert_eq!(scorer.word_points(FoundBy::Hint), 0);
    }

    #[test]
    fn test_time_bonus() {
        let scorer = Scorer::default();
        assert_eq!(scorer.time_bonus(0), 0);
        assert_eq!(scorer.time_bonus(42), 210);
        // 5 minutes left
        assert_eq!(scorer.time_bonus(300), 1500);
    }

    #[test]
    fn test_time_bonus_saturates() {
        let scorer = Scorer::new(10, 1000);
        assert_eq!(scorer.time_bonus(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_custom_points() {
        let scorer = Scorer::new(25, 2);
        assert_eq!(scorer.word_points(FoundBy::Selection), 25);
        assert_eq!(scorer.time_bonus(10), 20);
    }
}
