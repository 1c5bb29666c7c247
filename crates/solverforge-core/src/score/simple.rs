// Single-level score.

level_score! {
    /// A score with one soft level.
    ///
    /// # Examples
    ///
    /// ```
    /// use solverforge_core::{ParseableScore, Score, SimpleScore};
    ///
    /// let score = SimpleScore::of(-5);
    /// assert!(SimpleScore::of(-3) > score);
    /// assert!(!score.is_feasible());
    /// assert_eq!(score.scale(3), SimpleScore::of(-15));
    /// assert_eq!(SimpleScore::parse("-5").unwrap(), score);
    /// ```
    SimpleScore { score: Soft => "" }
}

impl SimpleScore {
    pub const ZERO: SimpleScore = SimpleScore::of(0);

    /// The usual constraint weight.
    pub const ONE: SimpleScore = SimpleScore::of(1);
}

impl From<i64> for SimpleScore {
    fn from(score: i64) -> Self {
        SimpleScore::of(score)
    }
}
