// Two-level score.

level_score! {
    /// A score with a hard and a soft level.
    ///
    /// A negative hard level makes a solution infeasible, whatever its soft
    /// level.
    ///
    /// # Examples
    ///
    /// ```
    /// use solverforge_core::{HardSoftScore, Score};
    ///
    /// let score = HardSoftScore::of(-2, -100);
    /// assert_eq!(score.hard(), -2);
    /// assert_eq!(score.soft(), -100);
    /// assert!(!score.is_feasible());
    /// assert_eq!(score.to_string(), "-2hard/-100soft");
    ///
    /// // Hard wins regardless of soft
    /// assert!(HardSoftScore::of(0, -1000) > HardSoftScore::of(-1, 0));
    /// ```
    HardSoftScore {
        hard: Hard => "hard",
        soft: Soft => "soft",
    }
}

impl HardSoftScore {
    pub const ZERO: HardSoftScore = HardSoftScore::of(0, 0);

    pub const ONE_HARD: HardSoftScore = HardSoftScore::of(1, 0);

    pub const ONE_SOFT: HardSoftScore = HardSoftScore::of(0, 1);

    #[inline]
    pub const fn of_hard(hard: i64) -> Self {
        HardSoftScore::of(hard, 0)
    }

    #[inline]
    pub const fn of_soft(soft: i64) -> Self {
        HardSoftScore::of(0, soft)
    }
}
